//! Wave detection over a short window of palm x-positions.

use crate::config::WaveConfig;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSample {
    pub palm_x: f32,
    pub at: Instant,
}

/// Time-windowed palm history. Timestamps are non-decreasing.
#[derive(Debug, Clone, Default)]
pub struct WaveWindow {
    samples: VecDeque<WaveSample>,
}

impl WaveWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = &WaveSample> {
        self.samples.iter()
    }

    /// Append a sample, ignoring it if it is older than the newest one
    pub fn push(&mut self, palm_x: f32, at: Instant) -> bool {
        if let Some(last) = self.samples.back() {
            if at < last.at {
                debug!("Dropping out-of-order wave sample");
                return false;
            }
        }
        self.samples.push_back(WaveSample { palm_x, at });
        true
    }

    /// Drop every sample at least `window` old relative to `now`
    pub fn expire(&mut self, now: Instant, window: Duration) {
        while let Some(front) = self.samples.front() {
            if now.saturating_duration_since(front.at) >= window {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Count direction reversals between consecutive non-zero directions.
    ///
    /// Steps with |dx| <= `threshold` carry no direction and neither break
    /// nor create a reversal.
    pub fn direction_reversals(&self, threshold: f32) -> usize {
        let mut reversals = 0;
        let mut last_direction = 0i8;

        let mut iter = self.samples.iter();
        let mut previous = match iter.next() {
            Some(sample) => sample.palm_x,
            None => return 0,
        };

        for sample in iter {
            let dx = sample.palm_x - previous;
            previous = sample.palm_x;

            let direction = if dx > threshold {
                1
            } else if dx < -threshold {
                -1
            } else {
                0
            };

            if direction == 0 {
                continue;
            }
            if last_direction != 0 && direction != last_direction {
                reversals += 1;
            }
            last_direction = direction;
        }

        reversals
    }
}

/// Append `palm_x` at `now` and report whether a wave just completed.
///
/// `last_wave` holds the time of the previous completed wave and is updated
/// when this call reports one.
pub fn detect_wave(
    config: &WaveConfig,
    palm_x: f32,
    now: Instant,
    window: &mut WaveWindow,
    last_wave: &mut Option<Instant>,
) -> bool {
    let span = Duration::from_millis(config.window_ms);
    window.push(palm_x, now);
    window.expire(now, span);

    if window.len() < config.min_samples {
        return false;
    }

    let reversals = window.direction_reversals(config.direction_threshold);
    if reversals < config.min_reversals {
        return false;
    }

    let cooled_down = match last_wave {
        Some(at) => now.saturating_duration_since(*at) >= Duration::from_millis(config.cooldown_ms),
        None => true,
    };
    if !cooled_down {
        debug!("Wave suppressed by cooldown ({} reversals)", reversals);
        return false;
    }

    *last_wave = Some(now);
    true
}

/// Owns the wave window and cooldown clock for one hand
#[derive(Debug, Clone)]
pub struct WaveDetector {
    config: WaveConfig,
    window: WaveWindow,
    last_wave: Option<Instant>,
}

impl Default for WaveDetector {
    fn default() -> Self {
        Self::new(WaveConfig::default())
    }
}

impl WaveDetector {
    pub fn new(config: WaveConfig) -> Self {
        Self {
            config,
            window: WaveWindow::new(),
            last_wave: None,
        }
    }

    /// Feed one open-hand palm sample; true exactly when a wave completes
    pub fn update(&mut self, palm_x: f32, now: Instant) -> bool {
        let fired = detect_wave(
            &self.config,
            palm_x,
            now,
            &mut self.window,
            &mut self.last_wave,
        );
        if fired {
            info!("Wave completed ({} samples in window)", self.window.len());
        }
        fired
    }

    /// Trim the window without adding a sample
    pub fn expire(&mut self, now: Instant) {
        self.window
            .expire(now, Duration::from_millis(self.config.window_ms));
    }

    pub fn window(&self) -> &WaveWindow {
        &self.window
    }

    pub fn last_wave(&self) -> Option<Instant> {
        self.last_wave
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.last_wave = None;
    }
}
