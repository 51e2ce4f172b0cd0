use super::types::{SessionSummary, ShutdownReason};
use crate::config::GestureSceneConfig;
use crate::error::Result;
use crate::events::patterns::create_logging_handler;
use crate::events::{run_handler, EventBus, EventHandler, SceneEvent};
use crate::pipeline::GesturePipeline;
use crate::selection::SceneAccess;
use crate::source::LandmarkSource;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Drives a [`GesturePipeline`] from a landmark source.
///
/// Frames are applied at their recorded offsets on the session's own task;
/// render ticks and event logging run as background tasks sharing the
/// pipeline.
pub struct SceneSession {
    config: GestureSceneConfig,
    event_bus: Arc<EventBus>,
    pipeline: Arc<Mutex<GesturePipeline>>,
    cancellation_token: CancellationToken,
    log_events: bool,
}

impl SceneSession {
    pub fn new(config: GestureSceneConfig) -> Self {
        let event_bus = Arc::new(if config.events.debug_logging {
            EventBus::with_debug_logging(config.events.bus_capacity)
        } else {
            EventBus::new(config.events.bus_capacity)
        });
        let pipeline = GesturePipeline::new(&config, Arc::clone(&event_bus));

        Self {
            config,
            event_bus,
            pipeline: Arc::new(Mutex::new(pipeline)),
            cancellation_token: CancellationToken::new(),
            log_events: true,
        }
    }

    /// Skip the background event-logging task
    pub fn without_event_logging(mut self) -> Self {
        self.log_events = false;
        self
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn pipeline(&self) -> Arc<Mutex<GesturePipeline>> {
        Arc::clone(&self.pipeline)
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Replay `source` into the pipeline until it runs dry or the session is
    /// cancelled. The pipeline is reset afterwards.
    pub async fn run<S, C>(&self, mut source: S, scene: &C) -> Result<SessionSummary>
    where
        S: LandmarkSource,
        C: SceneAccess + ?Sized,
    {
        if let Err(e) = self.config.validate() {
            error!("Refusing to start session: {}", e);
            return Err(e.into());
        }

        if let Err(e) = source.open() {
            error!("Failed to open landmark source {}: {}", source.name(), e);
            self.publish(SceneEvent::SystemError {
                component: source.name().to_string(),
                error: e.to_string(),
            });
            return Err(e);
        }

        let mut tasks = vec![self.spawn_render_loop()];
        if self.log_events {
            tasks.push(self.spawn_event_logger());
        }
        self.publish(SceneEvent::source_status(source.name(), true));

        let reason = self.replay(&mut source, scene).await;

        self.publish(SceneEvent::source_status(source.name(), false));
        self.cancellation_token.cancel();
        for task in tasks {
            if let Err(e) = task.await {
                warn!("Session task ended abnormally: {}", e);
            }
        }

        let summary = {
            let mut pipeline = self.pipeline.lock();
            let summary = SessionSummary {
                reason,
                final_mode: pipeline.mode(),
                stats: pipeline.stats(),
            };
            pipeline.reset();
            summary
        };

        info!(
            "Session finished ({:?}): {} frames, {} selections, {} waves",
            summary.reason, summary.stats.frames, summary.stats.selections, summary.stats.waves
        );
        Ok(summary)
    }

    async fn replay<S, C>(&self, source: &mut S, scene: &C) -> ShutdownReason
    where
        S: LandmarkSource,
        C: SceneAccess + ?Sized,
    {
        let started = tokio::time::Instant::now();
        // Gesture time follows the recording, not the wall clock
        let epoch = std::time::Instant::now();

        loop {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("Landmark source {} exhausted", source.name());
                    return ShutdownReason::SourceExhausted;
                }
                Err(e) => {
                    error!("Landmark source {} failed: {}", source.name(), e);
                    self.publish(SceneEvent::SystemError {
                        component: source.name().to_string(),
                        error: e.to_string(),
                    });
                    return ShutdownReason::Error(e.to_string());
                }
            };

            let offset = Duration::from_millis(frame.offset_ms);
            tokio::select! {
                _ = self.cancellation_token.cancelled() => {
                    info!("Session cancelled");
                    return ShutdownReason::Cancelled;
                }
                _ = tokio::time::sleep_until(started + offset) => {}
            }

            self.pipeline
                .lock()
                .on_frame(frame.landmarks, epoch + offset, scene);
        }
    }

    fn spawn_render_loop(&self) -> JoinHandle<()> {
        let pipeline = Arc::clone(&self.pipeline);
        let token = self.cancellation_token.clone();
        let fps = self.config.source.render_fps.max(1);
        let period = Duration::from_secs_f64(1.0 / fps as f64);

        tokio::spawn(async move {
            debug!("Render loop started at {} Hz", fps);
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        pipeline.lock().on_render_tick();
                    }
                }
            }
            debug!("Render loop stopped");
        })
    }

    fn spawn_event_logger(&self) -> JoinHandle<()> {
        let token = self.cancellation_token.clone();
        let handler = create_logging_handler("scene".to_string());
        let receiver = self
            .event_bus
            .receiver(handler.event_filter(), handler.handler_name());

        tokio::spawn(async move {
            run_handler(receiver, handler, token).await;
        })
    }

    fn publish(&self, event: SceneEvent) {
        if let Err(e) = self.event_bus.publish(event) {
            debug!("Session event not delivered: {}", e);
        }
    }
}
