mod machine;
mod types;


pub use machine::{step, InteractionStateMachine, MachineState};
pub use types::{InteractionMode, Navigation, Transition};
