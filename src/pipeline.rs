//! Host-facing façade wiring classifier, wave detector, state machine,
//! selection and animation together.
//!
//! Call [`GesturePipeline::on_frame`] on sensor cadence and
//! [`GesturePipeline::on_render_tick`] on display cadence. Neither can fail;
//! notifications go out on the [`EventBus`].

use crate::animation::{AnimationSynchronizer, CameraBounds};
use crate::classifier::{GestureClassifier, GestureSignals};
use crate::config::{EventsConfig, GestureSceneConfig};
use crate::events::{EventBus, SceneEvent};
use crate::interaction::{InteractionMode, InteractionStateMachine, Transition};
use crate::landmarks::LandmarkFrame;
use crate::selection::{self, OverlayLayout, Pointer, SceneAccess, SelectionOutcome};
use crate::snapshot::{RenderSnapshot, SharedSnapshot};
use crate::wave::WaveDetector;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use tracing::{debug, info};

/// Lifetime counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub frames: u64,
    pub hand_frames: u64,
    pub render_ticks: u64,
    pub mode_changes: u64,
    /// Times the selection resolver ran
    pub selection_requests: u64,
    /// Resolver runs that produced an item
    pub selections: u64,
    pub waves: u64,
}

/// What one gesture tick decided
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub signals: GestureSignals,
    pub transition: Transition,
    pub selection: Option<SelectionOutcome>,
}

/// Cycles through the configured blessing messages
#[derive(Debug, Clone)]
struct BlessingRotation {
    messages: Vec<String>,
    next: usize,
}

impl BlessingRotation {
    fn new(messages: &[String]) -> Self {
        let messages = if messages.is_empty() {
            EventsConfig::default().blessings
        } else {
            messages.to_vec()
        };
        Self { messages, next: 0 }
    }

    fn next_message(&mut self) -> String {
        let message = self.messages[self.next % self.messages.len()].clone();
        self.next = (self.next + 1) % self.messages.len();
        message
    }
}

pub struct GesturePipeline {
    classifier: GestureClassifier,
    wave: WaveDetector,
    machine: InteractionStateMachine,
    animation: AnimationSynchronizer,
    event_bus: Arc<EventBus>,
    blessings: BlessingRotation,
    prior: Option<LandmarkFrame>,
    signals: GestureSignals,
    cursor: Option<Pointer>,
    last_selection: Option<SelectionOutcome>,
    shared: SharedSnapshot,
    stats: PipelineStats,
}

impl GesturePipeline {
    pub fn new(config: &GestureSceneConfig, event_bus: Arc<EventBus>) -> Self {
        let animation = AnimationSynchronizer::new(
            config.animation.clone(),
            CameraBounds::from(&config.interaction),
        );
        let shared = SharedSnapshot::new(RenderSnapshot::at_rest(&animation));

        Self {
            classifier: GestureClassifier::new(config.classifier.clone()),
            wave: WaveDetector::new(config.wave.clone()),
            machine: InteractionStateMachine::new(config.interaction.clone()),
            animation,
            event_bus,
            blessings: BlessingRotation::new(&config.events.blessings),
            prior: None,
            signals: GestureSignals::absent(),
            cursor: None,
            last_selection: None,
            shared,
            stats: PipelineStats::default(),
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.machine.mode()
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn last_selection(&self) -> Option<SelectionOutcome> {
        self.last_selection
    }

    pub fn animation(&self) -> &AnimationSynchronizer {
        &self.animation
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Handle for readers on other threads
    pub fn shared_snapshot(&self) -> SharedSnapshot {
        self.shared.clone()
    }

    /// Process one gesture tick. `None` means no hand was detected.
    pub fn on_frame<S>(&mut self, frame: Option<LandmarkFrame>, now: Instant, scene: &S) -> FrameReport
    where
        S: SceneAccess + ?Sized,
    {
        self.stats.frames += 1;

        let signals = self.classifier.classify(frame.as_ref(), self.prior.as_ref());
        if signals.hand_visible {
            self.stats.hand_frames += 1;
        }
        if signals.hand_visible != self.signals.hand_visible {
            debug!("Hand visible: {}", signals.hand_visible);
            self.publish(SceneEvent::HandVisibilityChanged {
                visible: signals.hand_visible,
                timestamp: SystemTime::now(),
            });
        }

        let wave_completed = match signals.palm {
            Some(palm) if signals.hand_open => self.wave.update(palm.x, now),
            _ => {
                self.wave.expire(now);
                false
            }
        };

        let transition = self.machine.update(&signals, wave_completed);

        self.animation.set_hand_visible(signals.hand_visible);
        self.animation.set_mode(transition.mode);
        if let Some(navigation) = transition.navigation {
            self.animation.apply_navigation(&navigation);
        }

        if let Some(palm) = signals.palm {
            self.cursor = Some(Pointer::from_palm(palm));
        }

        if let Some(mode) = transition.entered {
            self.stats.mode_changes += 1;
            self.publish(SceneEvent::mode_entered(mode));
        }

        let selection = if transition.select {
            self.select(scene)
        } else {
            None
        };

        if transition.blessing {
            self.stats.waves += 1;
            let message = self.blessings.next_message();
            self.publish(SceneEvent::blessing(message));
        }

        self.prior = if signals.hand_visible { frame } else { None };
        self.signals = signals;
        self.refresh_snapshot();

        FrameReport {
            signals,
            transition,
            selection,
        }
    }

    fn select<S>(&mut self, scene: &S) -> Option<SelectionOutcome>
    where
        S: SceneAccess + ?Sized,
    {
        self.stats.selection_requests += 1;

        let pointer = self.cursor.unwrap_or_default();
        let pick = |pointer: Pointer| scene.pick(pointer);
        let outcome = selection::resolve(
            pointer,
            &pick,
            scene.items(),
            self.animation.camera_position(),
        )?;

        info!("Selected item {} ({:?})", outcome.index, outcome.source);
        self.stats.selections += 1;
        self.animation.set_selection(outcome.index);
        self.last_selection = Some(outcome);
        self.publish(SceneEvent::SelectionChanged {
            index: outcome.index,
            source: outcome.source,
            layout: OverlayLayout::from_aspect(outcome.aspect_ratio),
            timestamp: SystemTime::now(),
        });

        Some(outcome)
    }

    /// Advance animation by one render tick and return the new snapshot
    pub fn on_render_tick(&mut self) -> RenderSnapshot {
        self.stats.render_ticks += 1;
        self.animation.tick();
        self.refresh_snapshot()
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        let threshold = self.classifier.config().movement_threshold;
        RenderSnapshot {
            cursor: self.cursor,
            hand_visible: self.signals.hand_visible,
            pinching: self.signals.pinching,
            hand_open: self.signals.hand_open,
            moving: self.signals.is_moving(threshold),
            ..RenderSnapshot::at_rest(&self.animation)
        }
    }

    fn refresh_snapshot(&self) -> RenderSnapshot {
        let snapshot = self.snapshot();
        self.shared.store(snapshot);
        snapshot
    }

    /// Drop all gesture history and return the scene to rest. Counters are kept.
    pub fn reset(&mut self) {
        info!("Resetting gesture pipeline");
        self.wave.reset();
        self.machine.reset();
        self.animation.reset();
        self.prior = None;
        self.signals = GestureSignals::absent();
        self.cursor = None;
        self.last_selection = None;
        self.refresh_snapshot();
    }

    fn publish(&self, event: SceneEvent) {
        if let Err(e) = self.event_bus.publish(event) {
            debug!("Scene event not delivered: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventFilter, EventReceiver};
    use crate::landmarks::{HandPoseBuilder, Position3};
    use crate::selection::{never_hits, CatalogItem, PickHit, StaticScene};
    use std::cell::Cell;
    use std::time::Duration;

    fn pipeline() -> (GesturePipeline, EventReceiver) {
        let bus = Arc::new(EventBus::new(100));
        let receiver = bus.receiver(EventFilter::All, "test");
        (GesturePipeline::new(&GestureSceneConfig::default(), bus), receiver)
    }

    fn catalog() -> Vec<CatalogItem> {
        // Camera rests at (0, 10, 35); item 1 is closest
        [10.0, 3.0, 7.0]
            .iter()
            .enumerate()
            .map(|(index, gap)| CatalogItem {
                index,
                position: Position3::new(0.0, 10.0, 35.0 - gap),
                aspect_ratio: Some(0.75),
            })
            .collect()
    }

    fn drain(receiver: &mut EventReceiver) -> Vec<SceneEvent> {
        std::iter::from_fn(|| receiver.try_recv().unwrap()).collect()
    }

    fn count(events: &[SceneEvent], event_type: &str) -> usize {
        events.iter().filter(|e| e.event_type() == event_type).count()
    }

    fn at(t0: Instant, millis: u64) -> Instant {
        t0 + Duration::from_millis(millis)
    }

    #[test]
    fn test_pinch_scenario_selects_once() {
        let (mut pipeline, mut receiver) = pipeline();
        let resolver_calls = Cell::new(0);
        let scene = StaticScene::new(catalog(), |_: Pointer| -> Option<PickHit> {
            resolver_calls.set(resolver_calls.get() + 1);
            None
        });
        let t0 = Instant::now();

        let relaxed = HandPoseBuilder::new().thumb_index_gap(0.10).build();
        let pinched = HandPoseBuilder::new().thumb_index_gap(0.03).build();

        let absent = pipeline.on_frame(None, t0, &scene);
        assert_eq!(absent.transition.mode, InteractionMode::Idle);

        let first = pipeline.on_frame(Some(pinched.clone()), at(t0, 33), &scene);
        assert_eq!(first.transition.mode, InteractionMode::Closed);
        assert!(first.transition.select);
        assert_eq!(resolver_calls.get(), 1);

        for i in 2..=6 {
            let report = pipeline.on_frame(Some(pinched.clone()), at(t0, i * 33), &scene);
            assert_eq!(report.transition.mode, InteractionMode::Closed);
            assert!(report.selection.is_none());
        }
        assert_eq!(resolver_calls.get(), 1);

        let released = pipeline.on_frame(Some(relaxed), at(t0, 231), &scene);
        assert_eq!(released.transition.mode, InteractionMode::Interactive);

        let stats = pipeline.stats();
        assert_eq!(stats.selection_requests, 1);
        assert_eq!(stats.selections, 1);
        assert_eq!(pipeline.animation().targets().selected_item, Some(1));

        let events = drain(&mut receiver);
        assert_eq!(count(&events, "selection_changed"), 1);
        let closed_entries = events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    SceneEvent::ModeEntered {
                        mode: InteractionMode::Closed,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(closed_entries, 1);
    }

    #[test]
    fn test_selection_event_carries_portrait_layout() {
        let (mut pipeline, mut receiver) = pipeline();
        let scene = StaticScene::new(catalog(), never_hits);
        let pinched = HandPoseBuilder::new().thumb_index_gap(0.0).build();

        let report = pipeline.on_frame(Some(pinched), Instant::now(), &scene);
        assert_eq!(report.selection.map(|s| s.index), Some(1));

        let layout = drain(&mut receiver).into_iter().find_map(|e| match e {
            SceneEvent::SelectionChanged { layout, .. } => Some(layout),
            _ => None,
        });
        assert!(matches!(
            layout.map(|l| l.fit),
            Some(crate::selection::OverlayFit::Height { .. })
        ));
    }

    #[test]
    fn test_empty_catalog_keeps_prior_selection() {
        let (mut pipeline, _receiver) = pipeline();
        let full = StaticScene::new(catalog(), never_hits);
        let empty = StaticScene::new(Vec::new(), never_hits);
        let pinched = HandPoseBuilder::new().thumb_index_gap(0.0).build();
        let t0 = Instant::now();

        pipeline.on_frame(Some(pinched.clone()), t0, &full);
        pipeline.on_frame(None, at(t0, 33), &full);
        let report = pipeline.on_frame(Some(pinched), at(t0, 66), &empty);

        assert!(report.transition.select);
        assert!(report.selection.is_none());
        assert_eq!(pipeline.stats().selection_requests, 2);
        assert_eq!(pipeline.stats().selections, 1);
        assert_eq!(pipeline.animation().targets().selected_item, Some(1));
    }

    #[test]
    fn test_wave_scenario_blesses_once() {
        let (mut pipeline, mut receiver) = pipeline();
        let scene = StaticScene::new(catalog(), never_hits);
        let t0 = Instant::now();

        // Raw x alternates so the mirrored palm swings 0.3 / 0.5
        let mut blessed_at = Vec::new();
        for (i, raw_x) in [0.7, 0.5, 0.7, 0.5, 0.7, 0.5].iter().enumerate() {
            let frame = HandPoseBuilder::new().open().palm_at(*raw_x, 0.5).build();
            let report = pipeline.on_frame(Some(frame), at(t0, i as u64 * 80), &scene);
            assert!(report.signals.hand_open);
            if report.transition.blessing {
                blessed_at.push(i);
            }
        }
        assert_eq!(blessed_at, vec![3]);
        assert_eq!(pipeline.stats().waves, 1);

        let events = drain(&mut receiver);
        let messages: Vec<String> = events
            .into_iter()
            .filter_map(|e| match e {
                SceneEvent::BlessingTriggered { message, .. } => Some(message),
                _ => None,
            })
            .collect();
        assert_eq!(messages, vec![EventsConfig::default().blessings[0].clone()]);
    }

    #[test]
    fn test_blessings_rotate() {
        let mut rotation = BlessingRotation::new(&["a".to_string(), "b".to_string()]);
        let seen: Vec<String> = (0..5).map(|_| rotation.next_message()).collect();
        assert_eq!(seen, vec!["a", "b", "a", "b", "a"]);

        let mut fallback = BlessingRotation::new(&[]);
        assert!(!fallback.next_message().is_empty());
    }

    #[test]
    fn test_hand_loss_goes_idle_and_resets_motion() {
        let (mut pipeline, mut receiver) = pipeline();
        let scene = StaticScene::new(catalog(), never_hits);
        let t0 = Instant::now();

        let left = HandPoseBuilder::new().palm_at(0.6, 0.5).build();
        let right = HandPoseBuilder::new().palm_at(0.4, 0.5).build();

        pipeline.on_frame(Some(left), t0, &scene);
        let moved = pipeline.on_frame(Some(right.clone()), at(t0, 33), &scene);
        assert!(moved.signals.delta_x > 0.0);
        assert!(moved.transition.navigation.is_some());

        let lost = pipeline.on_frame(None, at(t0, 66), &scene);
        assert_eq!(lost.transition.entered, Some(InteractionMode::Idle));

        // Reappearing somewhere else is not motion
        let back = pipeline.on_frame(Some(right), at(t0, 99), &scene);
        assert_eq!(back.signals.delta_x, 0.0);
        assert!(back.transition.navigation.is_none());

        let events = drain(&mut receiver);
        assert_eq!(count(&events, "hand_visibility_changed"), 3);
    }

    #[test]
    fn test_navigation_moves_rendered_camera() {
        let (mut pipeline, _receiver) = pipeline();
        let scene = StaticScene::new(catalog(), never_hits);
        let t0 = Instant::now();

        // Hand rising: image y decreases
        for i in 0..10u64 {
            let y = 0.7 - i as f32 * 0.02;
            let frame = HandPoseBuilder::new().palm_at(0.5, y).build();
            pipeline.on_frame(Some(frame), at(t0, i * 33), &scene);
        }
        let targets = *pipeline.animation().targets();
        assert!(targets.camera_distance < 35.0);
        assert!(targets.camera_height > 10.0);
        assert!(targets.camera_distance >= 15.0);
        assert!(targets.camera_height <= 15.0);

        let before = pipeline.snapshot().state.camera_distance;
        let snapshot = pipeline.on_render_tick();
        assert!(snapshot.state.camera_distance < before);
        assert_eq!(pipeline.shared_snapshot().load(), snapshot);
        assert!(snapshot.hand_visible);
        assert!(snapshot.cursor.is_some());
    }

    #[test]
    fn test_reset_returns_to_rest() {
        let (mut pipeline, _receiver) = pipeline();
        let scene = StaticScene::new(catalog(), never_hits);
        let pinched = HandPoseBuilder::new().thumb_index_gap(0.0).build();

        pipeline.on_frame(Some(pinched), Instant::now(), &scene);
        assert_eq!(pipeline.mode(), InteractionMode::Closed);

        pipeline.reset();
        assert_eq!(pipeline.mode(), InteractionMode::Idle);
        assert!(pipeline.last_selection().is_none());
        let snapshot = pipeline.shared_snapshot().load();
        assert_eq!(snapshot, RenderSnapshot::default());
        assert_eq!(pipeline.stats().frames, 1);
    }

    #[test]
    fn test_runs_without_subscribers() {
        let bus = Arc::new(EventBus::new(10));
        let mut pipeline = GesturePipeline::new(&GestureSceneConfig::default(), bus);
        let scene = StaticScene::new(catalog(), never_hits);
        let hand = HandPoseBuilder::new().build();

        let report = pipeline.on_frame(Some(hand), Instant::now(), &scene);
        assert_eq!(report.transition.mode, InteractionMode::Interactive);
    }
}
