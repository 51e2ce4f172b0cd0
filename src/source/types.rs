use crate::error::Result;
use crate::landmarks::LandmarkFrame;
use serde::{Deserialize, Serialize};

/// One gesture tick as delivered by a source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFrame {
    /// Milliseconds since the start of the session
    pub offset_ms: u64,
    /// `None` when no hand was detected
    pub landmarks: Option<LandmarkFrame>,
}

impl SourceFrame {
    pub fn new(offset_ms: u64, landmarks: Option<LandmarkFrame>) -> Self {
        Self {
            offset_ms,
            landmarks,
        }
    }

    pub fn absent(offset_ms: u64) -> Self {
        Self::new(offset_ms, None)
    }
}

/// Producer of per-tick hand observations.
///
/// Only bringing the source up can fail. Once open, bad input degrades to
/// absent frames.
pub trait LandmarkSource: Send {
    fn name(&self) -> &str;

    fn open(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Next frame, or `Ok(None)` once the source has run dry
    fn next_frame(&mut self) -> Result<Option<SourceFrame>>;
}
