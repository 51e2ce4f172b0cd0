pub mod animation;
pub mod app;
pub mod classifier;
pub mod config;
pub mod error;
pub mod events;
pub mod interaction;
pub mod landmarks;
pub mod pipeline;
pub mod selection;
pub mod snapshot;
pub mod source;
pub mod wave;

pub use animation::{
    AnimationState, AnimationSynchronizer, AnimationTargets, CameraBounds, EffectAppearance,
};
pub use app::{demo_scene, SceneSession, SessionSummary, ShutdownReason};
pub use classifier::{GestureClassifier, GestureSignals};
pub use config::GestureSceneConfig;
pub use error::{GestureSceneError, Result};
pub use events::{EventBus, EventFilter, EventHandler, EventMetrics, EventReceiver, SceneEvent};
pub use interaction::{InteractionMode, InteractionStateMachine, Navigation, Transition};
pub use landmarks::{LandmarkFrame, Point2, Position3};
pub use pipeline::{FrameReport, GesturePipeline, PipelineStats};
pub use selection::{
    CatalogItem, OverlayLayout, PickHit, PickTest, Pointer, SceneAccess, SelectableItem,
    SelectionOutcome, SelectionSource, StaticScene,
};
pub use snapshot::{RenderSnapshot, SharedSnapshot};
pub use source::{LandmarkSource, ReplaySource, ScriptedSource, SourceFrame};
pub use wave::{WaveDetector, WaveWindow};
