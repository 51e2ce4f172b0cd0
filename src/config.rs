use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GestureSceneConfig {
    pub classifier: ClassifierConfig,
    pub wave: WaveConfig,
    pub interaction: InteractionConfig,
    pub animation: AnimationConfig,
    pub events: EventsConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Thumb tip to index tip distance below which the hand is pinching
    #[serde(default = "default_pinch_threshold")]
    pub pinch_threshold: f32,

    /// Mean fingertip to wrist distance above which the hand is open
    #[serde(default = "default_open_hand_threshold")]
    pub open_hand_threshold: f32,

    /// Gain applied to frame-to-frame palm displacement
    #[serde(default = "default_motion_gain")]
    pub motion_gain: f32,

    /// Delta magnitude above which the hand counts as moving (indicator only)
    #[serde(default = "default_movement_threshold")]
    pub movement_threshold: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WaveConfig {
    /// Palm history retention in milliseconds
    #[serde(default = "default_wave_window_ms")]
    pub window_ms: u64,

    /// Minimum time between two completed waves in milliseconds
    #[serde(default = "default_wave_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Samples required in the window before reversals are counted
    #[serde(default = "default_wave_min_samples")]
    pub min_samples: usize,

    /// Direction reversals that complete a wave
    #[serde(default = "default_wave_min_reversals")]
    pub min_reversals: usize,

    /// Per-sample x displacement that counts as a direction
    #[serde(default = "default_wave_direction_threshold")]
    pub direction_threshold: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InteractionConfig {
    /// Motion deltas at or below this magnitude are ignored
    #[serde(default = "default_dead_zone")]
    pub dead_zone: f32,

    /// Rotation gained per unit of horizontal delta
    #[serde(default = "default_rotation_gain")]
    pub rotation_gain: f32,

    /// Camera distance gained per unit of vertical delta
    #[serde(default = "default_distance_gain")]
    pub distance_gain: f32,

    /// Camera height lost per unit of vertical delta
    #[serde(default = "default_height_gain")]
    pub height_gain: f32,

    /// Camera distance clamp (min, max)
    #[serde(default = "default_distance_range")]
    pub distance_range: (f32, f32),

    /// Camera height clamp (min, max)
    #[serde(default = "default_height_range")]
    pub height_range: (f32, f32),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AnimationConfig {
    /// Camera distance at startup and the idle resting distance
    #[serde(default = "default_camera_distance")]
    pub default_camera_distance: f32,

    /// Camera height at startup and the idle resting height
    #[serde(default = "default_camera_height")]
    pub default_camera_height: f32,

    #[serde(default = "default_rotation_smoothing")]
    pub rotation_smoothing: f32,

    #[serde(default = "default_camera_smoothing")]
    pub camera_smoothing: f32,

    #[serde(default = "default_intensity_smoothing")]
    pub intensity_smoothing: f32,

    /// Rotation target advance per render tick while no hand is visible
    #[serde(default = "default_idle_rotation_step")]
    pub idle_rotation_step: f32,

    /// Fraction of the gap to the resting camera closed per tick while idle
    #[serde(default = "default_idle_camera_return")]
    pub idle_camera_return: f32,

    /// Effect intensity target in Idle and Interactive
    #[serde(default = "default_active_intensity")]
    pub active_intensity: f32,

    /// Effect intensity target in Closed
    #[serde(default = "default_closed_intensity")]
    pub closed_intensity: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EventsConfig {
    /// Event bus capacity
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,

    /// Log every published event at debug level
    #[serde(default = "default_debug_logging")]
    pub debug_logging: bool,

    /// Messages handed out in rotation on each completed wave
    #[serde(default = "default_blessings")]
    pub blessings: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SourceConfig {
    /// JSON-lines landmark recording replayed by the binary
    #[serde(default = "default_recording_path")]
    pub recording_path: String,

    /// Render ticks per second driven by the binary
    #[serde(default = "default_render_fps")]
    pub render_fps: u32,

    /// Number of items in the demo catalog
    #[serde(default = "default_catalog_size")]
    pub catalog_size: usize,
}

impl GestureSceneConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("gesturescene.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let distance_range = default_distance_range();
        let height_range = default_height_range();

        let settings = Config::builder()
            .set_default("classifier.pinch_threshold", default_pinch_threshold() as f64)?
            .set_default(
                "classifier.open_hand_threshold",
                default_open_hand_threshold() as f64,
            )?
            .set_default("classifier.motion_gain", default_motion_gain() as f64)?
            .set_default(
                "classifier.movement_threshold",
                default_movement_threshold() as f64,
            )?
            .set_default("wave.window_ms", default_wave_window_ms() as i64)?
            .set_default("wave.cooldown_ms", default_wave_cooldown_ms() as i64)?
            .set_default("wave.min_samples", default_wave_min_samples() as i64)?
            .set_default("wave.min_reversals", default_wave_min_reversals() as i64)?
            .set_default(
                "wave.direction_threshold",
                default_wave_direction_threshold() as f64,
            )?
            .set_default("interaction.dead_zone", default_dead_zone() as f64)?
            .set_default("interaction.rotation_gain", default_rotation_gain() as f64)?
            .set_default("interaction.distance_gain", default_distance_gain() as f64)?
            .set_default("interaction.height_gain", default_height_gain() as f64)?
            .set_default(
                "interaction.distance_range",
                vec![distance_range.0 as f64, distance_range.1 as f64],
            )?
            .set_default(
                "interaction.height_range",
                vec![height_range.0 as f64, height_range.1 as f64],
            )?
            .set_default(
                "animation.default_camera_distance",
                default_camera_distance() as f64,
            )?
            .set_default(
                "animation.default_camera_height",
                default_camera_height() as f64,
            )?
            .set_default(
                "animation.rotation_smoothing",
                default_rotation_smoothing() as f64,
            )?
            .set_default(
                "animation.camera_smoothing",
                default_camera_smoothing() as f64,
            )?
            .set_default(
                "animation.intensity_smoothing",
                default_intensity_smoothing() as f64,
            )?
            .set_default(
                "animation.idle_rotation_step",
                default_idle_rotation_step() as f64,
            )?
            .set_default(
                "animation.idle_camera_return",
                default_idle_camera_return() as f64,
            )?
            .set_default(
                "animation.active_intensity",
                default_active_intensity() as f64,
            )?
            .set_default(
                "animation.closed_intensity",
                default_closed_intensity() as f64,
            )?
            .set_default("events.bus_capacity", default_bus_capacity() as i64)?
            .set_default("events.debug_logging", default_debug_logging())?
            .set_default("events.blessings", default_blessings())?
            .set_default("source.recording_path", default_recording_path())?
            .set_default("source.render_fps", default_render_fps() as i64)?
            .set_default("source.catalog_size", default_catalog_size() as i64)?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // GESTURESCENE_WAVE__COOLDOWN_MS=1500 style overrides
            .add_source(
                Environment::with_prefix("GESTURESCENE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: GestureSceneConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.classifier.pinch_threshold > 0.0) {
            return Err(ConfigError::Message(
                "Classifier pinch_threshold must be greater than 0".to_string(),
            ));
        }

        if !(self.classifier.open_hand_threshold > 0.0) {
            return Err(ConfigError::Message(
                "Classifier open_hand_threshold must be greater than 0".to_string(),
            ));
        }

        if !(self.classifier.motion_gain > 0.0) {
            return Err(ConfigError::Message(
                "Classifier motion_gain must be greater than 0".to_string(),
            ));
        }

        if self.wave.window_ms == 0 {
            return Err(ConfigError::Message(
                "Wave window_ms must be greater than 0".to_string(),
            ));
        }

        if self.wave.min_samples < 2 {
            return Err(ConfigError::Message(
                "Wave min_samples must be at least 2".to_string(),
            ));
        }

        if self.wave.min_reversals == 0 {
            return Err(ConfigError::Message(
                "Wave min_reversals must be greater than 0".to_string(),
            ));
        }

        if !(self.interaction.dead_zone >= 0.0) {
            return Err(ConfigError::Message(
                "Interaction dead_zone must not be negative".to_string(),
            ));
        }

        let (min_distance, max_distance) = self.interaction.distance_range;
        if !(min_distance.is_finite() && max_distance.is_finite() && min_distance <= max_distance)
        {
            return Err(ConfigError::Message(format!(
                "Interaction distance_range must be finite and ordered: ({}, {})",
                min_distance, max_distance
            )));
        }

        let (min_height, max_height) = self.interaction.height_range;
        if !(min_height.is_finite() && max_height.is_finite() && min_height <= max_height) {
            return Err(ConfigError::Message(format!(
                "Interaction height_range must be finite and ordered: ({}, {})",
                min_height, max_height
            )));
        }

        for (name, value) in [
            ("classifier.movement_threshold", self.classifier.movement_threshold),
            ("wave.direction_threshold", self.wave.direction_threshold),
            ("interaction.rotation_gain", self.interaction.rotation_gain),
            ("interaction.distance_gain", self.interaction.distance_gain),
            ("interaction.height_gain", self.interaction.height_gain),
            ("animation.default_camera_distance", self.animation.default_camera_distance),
            ("animation.default_camera_height", self.animation.default_camera_height),
            ("animation.idle_rotation_step", self.animation.idle_rotation_step),
            ("animation.active_intensity", self.animation.active_intensity),
            ("animation.closed_intensity", self.animation.closed_intensity),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Message(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
        }

        for (name, factor) in [
            ("rotation_smoothing", self.animation.rotation_smoothing),
            ("camera_smoothing", self.animation.camera_smoothing),
            ("intensity_smoothing", self.animation.intensity_smoothing),
            ("idle_camera_return", self.animation.idle_camera_return),
        ] {
            if !(factor > 0.0 && factor < 1.0) {
                return Err(ConfigError::Message(format!(
                    "Animation {} must be within (0, 1), got {}",
                    name, factor
                )));
            }
        }

        if self.events.bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        if self.events.blessings.is_empty() {
            return Err(ConfigError::Message(
                "At least one blessing message is required".to_string(),
            ));
        }

        if self.source.render_fps == 0 {
            return Err(ConfigError::Message(
                "Source render_fps must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for GestureSceneConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            wave: WaveConfig::default(),
            interaction: InteractionConfig::default(),
            animation: AnimationConfig::default(),
            events: EventsConfig::default(),
            source: SourceConfig::default(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: default_pinch_threshold(),
            open_hand_threshold: default_open_hand_threshold(),
            motion_gain: default_motion_gain(),
            movement_threshold: default_movement_threshold(),
        }
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            window_ms: default_wave_window_ms(),
            cooldown_ms: default_wave_cooldown_ms(),
            min_samples: default_wave_min_samples(),
            min_reversals: default_wave_min_reversals(),
            direction_threshold: default_wave_direction_threshold(),
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            dead_zone: default_dead_zone(),
            rotation_gain: default_rotation_gain(),
            distance_gain: default_distance_gain(),
            height_gain: default_height_gain(),
            distance_range: default_distance_range(),
            height_range: default_height_range(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            default_camera_distance: default_camera_distance(),
            default_camera_height: default_camera_height(),
            rotation_smoothing: default_rotation_smoothing(),
            camera_smoothing: default_camera_smoothing(),
            intensity_smoothing: default_intensity_smoothing(),
            idle_rotation_step: default_idle_rotation_step(),
            idle_camera_return: default_idle_camera_return(),
            active_intensity: default_active_intensity(),
            closed_intensity: default_closed_intensity(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            bus_capacity: default_bus_capacity(),
            debug_logging: default_debug_logging(),
            blessings: default_blessings(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            recording_path: default_recording_path(),
            render_fps: default_render_fps(),
            catalog_size: default_catalog_size(),
        }
    }
}

// Default value functions
fn default_pinch_threshold() -> f32 {
    0.06
}
fn default_open_hand_threshold() -> f32 {
    0.2
}
fn default_motion_gain() -> f32 {
    5.0
}
fn default_movement_threshold() -> f32 {
    0.01
}

fn default_wave_window_ms() -> u64 {
    500
}
fn default_wave_cooldown_ms() -> u64 {
    2000
}
fn default_wave_min_samples() -> usize {
    4
}
fn default_wave_min_reversals() -> usize {
    2
}
fn default_wave_direction_threshold() -> f32 {
    0.01
}

fn default_dead_zone() -> f32 {
    0.008
}
fn default_rotation_gain() -> f32 {
    2.5
}
fn default_distance_gain() -> f32 {
    15.0
}
fn default_height_gain() -> f32 {
    5.0
}
fn default_distance_range() -> (f32, f32) {
    (15.0, 50.0)
}
fn default_height_range() -> (f32, f32) {
    (5.0, 15.0)
}

fn default_camera_distance() -> f32 {
    35.0
}
fn default_camera_height() -> f32 {
    10.0
}
fn default_rotation_smoothing() -> f32 {
    0.05
}
fn default_camera_smoothing() -> f32 {
    0.06
}
fn default_intensity_smoothing() -> f32 {
    0.1
}
fn default_idle_rotation_step() -> f32 {
    0.002
}
fn default_idle_camera_return() -> f32 {
    0.02
}
fn default_active_intensity() -> f32 {
    1.0
}
fn default_closed_intensity() -> f32 {
    0.3
}

fn default_bus_capacity() -> usize {
    100
}
fn default_debug_logging() -> bool {
    false
}
fn default_blessings() -> Vec<String> {
    vec![
        "Merry Christmas!".to_string(),
        "Happy Holidays!".to_string(),
        "Season's Greetings!".to_string(),
        "Happy New Year!".to_string(),
        "Peace & Joy".to_string(),
    ]
}

fn default_recording_path() -> String {
    "./recording.jsonl".to_string()
}
fn default_render_fps() -> u32 {
    60
}
fn default_catalog_size() -> usize {
    12
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = GestureSceneConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.classifier.pinch_threshold, 0.06);
        assert_eq!(config.wave.cooldown_ms, 2000);
        assert_eq!(config.interaction.distance_range, (15.0, 50.0));
        assert_eq!(config.animation.default_camera_distance, 35.0);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let config = GestureSceneConfig::load_from_file(&path).unwrap();
        assert_eq!(config, GestureSceneConfig::default());
    }

    #[test]
    fn test_load_file_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[wave]
cooldown_ms = 1500

[interaction]
height_range = [4.0, 12.0]

[events]
blessings = ["Hello"]
"#
        )
        .unwrap();

        let config = GestureSceneConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.wave.cooldown_ms, 1500);
        assert_eq!(config.wave.window_ms, 500);
        assert_eq!(config.interaction.height_range, (4.0, 12.0));
        assert_eq!(config.events.blessings, vec!["Hello".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = GestureSceneConfig::default();

        // Inverted clamp range
        config.interaction.distance_range = (50.0, 15.0);
        assert!(config.validate().is_err());
        config.interaction.distance_range = (15.0, 50.0);

        // Smoothing factor outside (0, 1)
        config.animation.camera_smoothing = 1.0;
        assert!(config.validate().is_err());
        config.animation.camera_smoothing = 0.06;

        config.events.blessings.clear();
        assert!(config.validate().is_err());
        config.events.blessings.push("Peace".to_string());

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_nan() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[interaction]
distance_range = [nan, 50.0]
"#
        )
        .unwrap();

        let config = GestureSceneConfig::load_from_file(file.path()).unwrap();
        assert!(config.interaction.distance_range.0.is_nan());
        assert!(config.validate().is_err());

        let mut config = GestureSceneConfig::default();
        config.classifier.pinch_threshold = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = GestureSceneConfig::default();
        config.classifier.open_hand_threshold = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = GestureSceneConfig::default();
        config.interaction.dead_zone = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = GestureSceneConfig::default();
        config.interaction.height_range = (2.0, f32::INFINITY);
        assert!(config.validate().is_err());

        let mut config = GestureSceneConfig::default();
        config.animation.idle_rotation_step = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let rendered = toml::to_string_pretty(&GestureSceneConfig::default()).unwrap();
        let parsed: GestureSceneConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, GestureSceneConfig::default());
    }
}
