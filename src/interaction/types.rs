use serde::{Deserialize, Serialize};

/// Interaction mode exposed to presenters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// No hand visible
    #[default]
    Idle,
    /// Hand visible and navigating
    Interactive,
    /// Pinching; the selected item is being inspected
    Closed,
}

impl InteractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Interactive => "interactive",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gain-scaled camera/rotation adjustments requested for one tick.
/// Clamping happens where the targets live.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Navigation {
    pub rotation: f32,
    pub distance: f32,
    pub height: f32,
}

/// Everything one state machine step decided
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub previous: InteractionMode,
    pub mode: InteractionMode,
    /// Set when the mode changed this tick
    pub entered: Option<InteractionMode>,
    /// Rising edge of a pinch: resolve a selection now
    pub select: bool,
    pub navigation: Option<Navigation>,
    /// A wave completed this tick
    pub blessing: bool,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.entered.is_some()
    }
}
