use anyhow::{anyhow, Context, Result};
use clap::Parser;
use gesturescene::{demo_scene, GestureSceneConfig, ReplaySource, SceneSession, ShutdownReason};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser, Debug)]
#[command(name = "gesturescene")]
#[command(about = "Hand-gesture control core for interactive 3D scenes")]
#[command(version)]
#[command(long_about = "Replays a recorded hand-landmark session through the gesture \
pipeline: pinch to select, move an open hand to navigate, wave for a blessing. \
Scene events and final statistics are written to the log.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "gesturescene.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Landmark recording to replay (overrides source.recording_path)
    #[arg(short, long, value_name = "FILE", help = "JSON-lines landmark recording to replay")]
    recording: Option<PathBuf>,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE", help = "Append plain-text logs to FILE")]
    log_file: Option<PathBuf>,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Render ticks per second (overrides source.render_fps)
    #[arg(long, value_name = "HZ")]
    render_hz: Option<u32>,

    /// Number of items in the demo catalog (overrides source.catalog_size)
    #[arg(long, value_name = "N")]
    catalog_size: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    let _log_guard = init_logging(&args)?;

    info!("Starting gesturescene v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let mut config = match GestureSceneConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    apply_overrides(&mut config, &args);

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        if args.validate_config {
            eprintln!("✗ Configuration validation failed: {}", e);
            std::process::exit(1);
        }
        return Err(e.into());
    }
    if args.validate_config {
        println!("✓ Configuration is valid");
        return Ok(());
    }

    let recording = config.source.recording_path.clone();
    let scene = demo_scene(config.source.catalog_size);
    let session = SceneSession::new(config);
    session.cancel_on_signals();

    let summary = session
        .run(ReplaySource::new(&recording), &scene)
        .await
        .with_context(|| format!("Failed to replay {}", recording))?;

    info!("Final stats: {}", serde_json::to_string(&summary.stats)?);
    if let ShutdownReason::Error(reason) = &summary.reason {
        return Err(anyhow!("Replay stopped early: {}", reason));
    }
    Ok(())
}

fn apply_overrides(config: &mut GestureSceneConfig, args: &Args) {
    if let Some(recording) = &args.recording {
        config.source.recording_path = recording.display().to_string();
    }
    if let Some(hz) = args.render_hz {
        config.source.render_fps = hz;
    }
    if let Some(size) = args.catalog_size {
        config.source.catalog_size = size;
    }
}

fn init_logging(args: &Args) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gesturescene={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    let (file_layer, guard) = match &args.log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("Invalid log file path: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(file_layer)
        .with(env_filter)
        .init();

    Ok(guard)
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# gesturescene configuration file");
    println!("# This is the default configuration with all available options");
    println!();
    println!("{}", toml::to_string_pretty(&GestureSceneConfig::default())?);
    Ok(())
}
