mod mock;
mod replay;
mod types;


pub use mock::ScriptedSource;
pub use replay::ReplaySource;
pub use types::{LandmarkSource, SourceFrame};
