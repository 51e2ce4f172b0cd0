use crate::interaction::InteractionMode;
use crate::pipeline::PipelineStats;
use serde::Serialize;

/// Why a session stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownReason {
    /// The landmark source ran out of frames
    SourceExhausted,
    /// Cancelled by a signal or the host
    Cancelled,
    Error(String),
}

/// Final state of a finished session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub reason: ShutdownReason,
    pub final_mode: InteractionMode,
    pub stats: PipelineStats,
}
