use super::types::{LandmarkSource, SourceFrame};
use crate::error::{Result, SourceError};
use crate::landmarks::{LandmarkFrame, Point2};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A recorded line before landmark validation
#[derive(Debug, Deserialize)]
struct RecordedLine {
    offset_ms: u64,
    #[serde(default)]
    landmarks: Option<Vec<Point2>>,
}

/// Replays a JSON-lines recording, one frame per line.
///
/// Lines that fail to parse, or whose landmarks are invalid, become absent
/// frames. Blank lines are skipped.
pub struct ReplaySource {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    line_number: usize,
    last_offset_ms: u64,
    malformed: usize,
}

impl ReplaySource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines: None,
            line_number: 0,
            last_offset_ms: 0,
            malformed: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines downgraded to absent frames so far
    pub fn malformed_lines(&self) -> usize {
        self.malformed
    }

    fn parse_line(&mut self, line: &str) -> SourceFrame {
        let recorded: RecordedLine = match serde_json::from_str(line) {
            Ok(recorded) => recorded,
            Err(e) => {
                warn!(
                    "{}:{}: unreadable frame, treating as no hand: {}",
                    self.path.display(),
                    self.line_number,
                    e
                );
                self.malformed += 1;
                return SourceFrame::absent(self.last_offset_ms);
            }
        };

        let offset_ms = recorded.offset_ms.max(self.last_offset_ms);
        if offset_ms != recorded.offset_ms {
            debug!(
                "{}:{}: offset went backwards, clamped to {}ms",
                self.path.display(),
                self.line_number,
                offset_ms
            );
        }
        self.last_offset_ms = offset_ms;

        let landmarks = match recorded.landmarks {
            Some(points) => match LandmarkFrame::from_points(&points) {
                Ok(frame) => Some(frame),
                Err(e) => {
                    warn!(
                        "{}:{}: invalid landmarks, treating as no hand: {}",
                        self.path.display(),
                        self.line_number,
                        e
                    );
                    self.malformed += 1;
                    None
                }
            },
            None => None,
        };

        SourceFrame::new(offset_ms, landmarks)
    }
}

impl LandmarkSource for ReplaySource {
    fn name(&self) -> &str {
        "replay"
    }

    fn open(&mut self) -> Result<()> {
        let file = File::open(&self.path).map_err(|e| SourceError::Open {
            source_name: self.path.display().to_string(),
            details: e.to_string(),
        })?;

        self.lines = Some(BufReader::new(file).lines());
        self.line_number = 0;
        self.last_offset_ms = 0;
        self.malformed = 0;
        info!("Replaying landmarks from {}", self.path.display());
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.lines.is_some()
    }

    fn next_frame(&mut self) -> Result<Option<SourceFrame>> {
        loop {
            let lines = self
                .lines
                .as_mut()
                .ok_or_else(|| SourceError::NotOpen(self.path.display().to_string()))?;

            let line = match lines.next() {
                Some(line) => line?,
                None => return Ok(None),
            };
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Ok(Some(self.parse_line(trimmed)));
        }
    }
}
