use super::types::{LandmarkSource, SourceFrame};
use crate::error::{Result, SourceError};
use crate::landmarks::LandmarkFrame;
use std::collections::VecDeque;
use tracing::debug;

/// In-memory source for tests and demos
pub struct ScriptedSource {
    name: String,
    frames: VecDeque<SourceFrame>,
    open: bool,
    available: bool,
}

impl ScriptedSource {
    pub fn new(frames: Vec<SourceFrame>) -> Self {
        Self {
            name: "scripted".to_string(),
            frames: frames.into(),
            open: false,
            available: true,
        }
    }

    /// Frames spaced `interval_ms` apart, starting at zero
    pub fn from_landmarks<I>(landmarks: I, interval_ms: u64) -> Self
    where
        I: IntoIterator<Item = Option<LandmarkFrame>>,
    {
        let frames = landmarks
            .into_iter()
            .enumerate()
            .map(|(i, frame)| SourceFrame::new(i as u64 * interval_ms, frame))
            .collect();
        Self::new(frames)
    }

    /// A source whose `open` always fails
    pub fn unavailable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: VecDeque::new(),
            open: false,
            available: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl LandmarkSource for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self) -> Result<()> {
        if !self.available {
            return Err(SourceError::Open {
                source_name: self.name.clone(),
                details: "scripted source marked unavailable".to_string(),
            }
            .into());
        }
        debug!("Scripted source '{}' opened with {} frames", self.name, self.frames.len());
        self.open = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn next_frame(&mut self) -> Result<Option<SourceFrame>> {
        if !self.open {
            return Err(SourceError::NotOpen(self.name.clone()).into());
        }
        Ok(self.frames.pop_front())
    }
}
