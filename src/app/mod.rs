mod runtime;
mod scene;
mod session;
mod types;


pub use scene::{demo_scene, ring_catalog, RingPick};
pub use session::SceneSession;
pub use types::{SessionSummary, ShutdownReason};
