//! Read-only views of the scene state for renderers.

use crate::animation::{AnimationState, AnimationSynchronizer, AnimationTargets, EffectAppearance};
use crate::interaction::InteractionMode;
use crate::selection::Pointer;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub mode: InteractionMode,
    pub targets: AnimationTargets,
    pub state: AnimationState,
    pub appearance: EffectAppearance,
    /// Last known hand position in device coordinates
    pub cursor: Option<Pointer>,
    pub hand_visible: bool,
    pub pinching: bool,
    pub hand_open: bool,
    pub moving: bool,
}

impl RenderSnapshot {
    /// Snapshot of the synchronizer with no hand information
    pub fn at_rest(animation: &AnimationSynchronizer) -> Self {
        Self {
            mode: animation.mode(),
            targets: *animation.targets(),
            state: *animation.state(),
            appearance: animation.appearance(),
            cursor: None,
            hand_visible: false,
            pinching: false,
            hand_open: false,
            moving: false,
        }
    }
}

impl Default for RenderSnapshot {
    fn default() -> Self {
        Self::at_rest(&AnimationSynchronizer::default())
    }
}

/// Single-writer, multi-reader handle to the latest snapshot
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<RwLock<RenderSnapshot>>,
}

impl SharedSnapshot {
    pub fn new(snapshot: RenderSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Copy of the latest snapshot
    pub fn load(&self) -> RenderSnapshot {
        *self.inner.read()
    }

    pub fn store(&self, snapshot: RenderSnapshot) {
        *self.inner.write() = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_default_snapshot_is_at_rest() {
        let snapshot = RenderSnapshot::default();
        assert_eq!(snapshot.mode, InteractionMode::Idle);
        assert_eq!(snapshot.targets.camera_distance, 35.0);
        assert!(snapshot.cursor.is_none());
        assert!(!snapshot.hand_visible);
    }

    #[test]
    fn test_readers_see_stores_across_threads() {
        let shared = SharedSnapshot::default();
        let reader = shared.clone();

        let mut snapshot = shared.load();
        snapshot.mode = InteractionMode::Closed;
        snapshot.cursor = Some(Pointer::new(0.25, -0.5));
        shared.store(snapshot);

        let seen = thread::spawn(move || reader.load()).join().unwrap();
        assert_eq!(seen.mode, InteractionMode::Closed);
        assert_eq!(seen.cursor, Some(Pointer::new(0.25, -0.5)));
    }
}
