//! Per-frame gesture classification.
//!
//! Turns one landmark frame (plus the immediately preceding one) into the
//! instantaneous signals the rest of the pipeline consumes. Pure: no state is
//! kept between calls.

use crate::config::ClassifierConfig;
use crate::landmarks::{LandmarkFrame, Point2};
use serde::{Deserialize, Serialize};

/// Instantaneous gesture signals for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GestureSignals {
    pub hand_visible: bool,
    /// Thumb and index tips closer than the pinch threshold
    pub pinching: bool,
    /// Fingers spread and not pinching
    pub hand_open: bool,
    /// Mirrored palm position; `None` when no hand is visible
    pub palm: Option<Point2>,
    /// Gain-scaled horizontal palm displacement since the prior frame
    pub delta_x: f32,
    /// Gain-scaled vertical palm displacement since the prior frame
    pub delta_y: f32,
}

impl GestureSignals {
    /// Signals for a tick without a visible hand
    pub fn absent() -> Self {
        Self::default()
    }

    /// Whether the hand moved noticeably this tick
    pub fn is_moving(&self, threshold: f32) -> bool {
        self.hand_visible && (self.delta_x.abs() > threshold || self.delta_y.abs() > threshold)
    }
}

#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config: ClassifierConfig,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify the current frame against the prior one.
    ///
    /// Motion deltas are zero whenever there is no prior frame, i.e. on the
    /// first frame after the hand (re)appears.
    pub fn classify(
        &self,
        frame: Option<&LandmarkFrame>,
        prior: Option<&LandmarkFrame>,
    ) -> GestureSignals {
        let frame = match frame {
            Some(frame) => frame,
            None => return GestureSignals::absent(),
        };

        let pinching = frame.pinch_distance() < self.config.pinch_threshold;
        let hand_open =
            !pinching && frame.mean_fingertip_spread() > self.config.open_hand_threshold;

        let palm = frame.mirrored_palm();
        let (delta_x, delta_y) = match prior {
            Some(prior) => {
                let prior_palm = prior.mirrored_palm();
                (
                    (palm.x - prior_palm.x) * self.config.motion_gain,
                    (palm.y - prior_palm.y) * self.config.motion_gain,
                )
            }
            None => (0.0, 0.0),
        };

        GestureSignals {
            hand_visible: true,
            pinching,
            hand_open,
            palm: Some(palm),
            delta_x,
            delta_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{HandPoseBuilder, PINKY_TIP};

    #[test]
    fn test_no_hand() {
        let classifier = GestureClassifier::default();
        let prior = HandPoseBuilder::new().build();

        let signals = classifier.classify(None, Some(&prior));
        assert_eq!(signals, GestureSignals::absent());
        assert!(!signals.hand_visible);
        assert!(signals.palm.is_none());
        assert_eq!(signals.delta_x, 0.0);
    }

    #[test]
    fn test_pinch_threshold_independent_of_other_fingers() {
        let classifier = GestureClassifier::default();

        for gap in [0.0_f32, 0.02, 0.05, 0.059, 0.061, 0.08, 0.15] {
            for open in [false, true] {
                let mut builder = HandPoseBuilder::new();
                if open {
                    builder = builder.open();
                }
                let frame = builder.thumb_index_gap(gap).build();
                let signals = classifier.classify(Some(&frame), None);
                assert_eq!(
                    signals.pinching,
                    frame.pinch_distance() < 0.06,
                    "gap {} open {}",
                    gap,
                    open
                );
            }
        }
    }

    #[test]
    fn test_open_hand_excludes_pinch() {
        let classifier = GestureClassifier::default();

        let open = HandPoseBuilder::new().open().build();
        let signals = classifier.classify(Some(&open), None);
        assert!(signals.hand_open);
        assert!(!signals.pinching);

        // Fingers spread but thumb on index: pinch wins
        let open_pinch = HandPoseBuilder::new().open().thumb_index_gap(0.02).build();
        let signals = classifier.classify(Some(&open_pinch), None);
        assert!(signals.pinching);
        assert!(!signals.hand_open);
    }

    #[test]
    fn test_open_hand_uses_mean_spread() {
        let classifier = GestureClassifier::default();
        let curled = HandPoseBuilder::new().build();
        assert!(!classifier.classify(Some(&curled), None).hand_open);

        // One far fingertip can lift the mean over the threshold on its own
        let pinky = HandPoseBuilder::new()
            .with_point(PINKY_TIP, Point2::new(0.9, 0.1))
            .build();
        assert!(pinky.mean_fingertip_spread() > 0.2);
        assert!(classifier.classify(Some(&pinky), None).hand_open);
    }

    #[test]
    fn test_motion_delta() {
        let classifier = GestureClassifier::default();
        let prior = HandPoseBuilder::new().palm_at(0.50, 0.50).build();
        let frame = HandPoseBuilder::new().palm_at(0.48, 0.53).build();

        let signals = classifier.classify(Some(&frame), Some(&prior));
        // Mirrored x: moving left in the image moves right on screen
        assert!((signals.delta_x - 0.1).abs() < 1e-4);
        assert!((signals.delta_y - 0.15).abs() < 1e-4);
        assert!(signals.is_moving(0.01));

        let first = classifier.classify(Some(&frame), None);
        assert_eq!(first.delta_x, 0.0);
        assert_eq!(first.delta_y, 0.0);
        assert!(!first.is_moving(0.01));
    }

    #[test]
    fn test_palm_is_mirrored() {
        let classifier = GestureClassifier::default();
        let frame = HandPoseBuilder::new().palm_at(0.25, 0.4).build();
        let palm = classifier.classify(Some(&frame), None).palm.unwrap();
        assert!((palm.x - 0.75).abs() < 1e-6);
        assert!((palm.y - 0.4).abs() < 1e-6);
    }
}
