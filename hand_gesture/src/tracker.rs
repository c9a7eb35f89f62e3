//! Per-detector-frame processing: classify, smooth, and hold the hand pose.

use tracing::debug;

use crate::classifier::{ClassifierConfig, GestureClassifier, GestureLabel, HandPose};
use crate::landmark::LandmarkFrame;
use crate::smoother::GestureSmoother;

/// Result of processing one detector frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerStep {
    /// Unsmoothed label for this frame.
    pub raw:    GestureLabel,
    /// Set only when the smoothed gesture changed on this frame.
    pub change: Option<GestureLabel>,
    /// Latest hand pose; held across frames without a hand.
    pub pose:   Option<HandPose>,
    /// Whether this frame contained a hand.
    pub hand_visible: bool,
}

/// Classifier + smoother + last known pose.  One per detector.
#[derive(Clone, Debug, Default)]
pub struct HandTracker {
    classifier: GestureClassifier,
    smoother:   GestureSmoother,
    pose:       Option<HandPose>,
}

impl HandTracker {
    pub fn new(config: ClassifierConfig) -> Self {
        HandTracker {
            classifier: GestureClassifier::new(config),
            smoother:   GestureSmoother::new(),
            pose:       None,
        }
    }

    pub fn process(&mut self, frame: Option<&LandmarkFrame>) -> TrackerStep {
        let raw = self.classifier.classify(frame);
        if let Some(f) = frame {
            self.pose = Some(HandPose::from_frame(f));
        }
        let change = self.smoother.push(raw);
        if let Some(label) = change {
            debug!(%label, %raw, "smoothed gesture changed");
        }
        TrackerStep { raw, change, pose: self.pose, hand_visible: frame.is_some() }
    }

    /// Current smoothed gesture.
    pub fn gesture(&self) -> GestureLabel { self.smoother.current() }

    pub fn pose(&self) -> Option<HandPose> { self.pose }

    /// Drop history and pose (tracking lost).
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.pose = None;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
