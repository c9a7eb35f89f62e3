//! Per-frame gesture classification.
//!
//! A pure function of one [`LandmarkFrame`]: count extended fingers, check
//! the OK pinch first, then the fist / open thresholds.  Anything in
//! between is [`GestureLabel::None`].
//!
//! ## Handedness
//!
//! The thumb test compares tip.x against the IP joint's x, which only holds
//! for one hand on a mirrored camera feed.  The opposite hand (or an
//! unmirrored feed) reads its thumb inverted.  This is a known limitation of
//! the heuristic and is kept as-is.

use std::fmt;

use crate::landmark::{
    Landmark, LandmarkFrame, INDEX_PIP, INDEX_TIP, MIDDLE_BASE, MIDDLE_PIP, MIDDLE_TIP,
    PINKY_PIP, PINKY_TIP, RING_PIP, RING_TIP, THUMB_IP, THUMB_TIP, WRIST,
};

// ════════════════════════════════════════════════════════════════════════════
// GestureLabel
// ════════════════════════════════════════════════════════════════════════════

/// Discrete hand shape recognised in one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GestureLabel {
    /// No hand, or an ambiguous shape (2–3 fingers, not OK).
    #[default]
    None,
    /// At most one finger extended.
    Fist,
    /// Four or five fingers extended.
    Open,
    /// Thumb and index tips touching, the other three extended.
    Ok,
}

impl GestureLabel {
    pub const ALL: [GestureLabel; 4] =
        [GestureLabel::None, GestureLabel::Fist, GestureLabel::Open, GestureLabel::Ok];

    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::None => "none",
            GestureLabel::Fist => "fist",
            GestureLabel::Open => "open",
            GestureLabel::Ok   => "ok",
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerFlags
// ════════════════════════════════════════════════════════════════════════════

/// Extended/curled state of each finger for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerFlags {
    pub thumb:  bool,
    pub index:  bool,
    pub middle: bool,
    pub ring:   bool,
    pub pinky:  bool,
}

impl FingerFlags {
    pub fn from_frame(frame: &LandmarkFrame) -> Self {
        let p = |i| frame.point(i);
        // Image y grows downward: a raised tip has the smaller y.
        let above = |tip: usize, pip: usize| p(tip).y < p(pip).y;
        FingerFlags {
            thumb:  p(THUMB_TIP).x < p(THUMB_IP).x,
            index:  above(INDEX_TIP,  INDEX_PIP),
            middle: above(MIDDLE_TIP, MIDDLE_PIP),
            ring:   above(RING_TIP,   RING_PIP),
            pinky:  above(PINKY_TIP,  PINKY_PIP),
        }
    }

    pub fn count(&self) -> usize {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|&&f| f)
            .count()
    }

    /// Middle, ring and pinky all extended, the second half of the OK sign.
    pub fn last_three(&self) -> bool {
        self.middle && self.ring && self.pinky
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ClassifierConfig
// ════════════════════════════════════════════════════════════════════════════

/// Thresholds for [`GestureClassifier`].
///
/// `fist_max_extended` must stay below `open_min_extended` so the two
/// outcomes can never overlap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassifierConfig {
    /// Thumb-tip to index-tip distance (normalized units) that counts as a pinch.
    pub ok_distance:       f32,
    pub fist_max_extended: usize,
    pub open_min_extended: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            ok_distance:       0.08,
            fist_max_extended: 1,
            open_min_extended: 4,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct GestureClassifier {
    config: ClassifierConfig,
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        debug_assert!(config.fist_max_extended < config.open_min_extended);
        GestureClassifier { config }
    }

    pub fn config(&self) -> &ClassifierConfig { &self.config }

    /// Classify one frame; `None` (no hand this tick) is always
    /// [`GestureLabel::None`].
    pub fn classify(&self, frame: Option<&LandmarkFrame>) -> GestureLabel {
        let Some(frame) = frame else { return GestureLabel::None };
        let fingers = FingerFlags::from_frame(frame);

        let pinch = frame.point(THUMB_TIP).distance(frame.point(INDEX_TIP));
        if pinch < self.config.ok_distance && fingers.last_three() {
            return GestureLabel::Ok;
        }

        let extended = fingers.count();
        if extended <= self.config.fist_max_extended {
            GestureLabel::Fist
        } else if extended >= self.config.open_min_extended {
            GestureLabel::Open
        } else {
            GestureLabel::None
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandPose: auxiliary values derived from the same frame
// ════════════════════════════════════════════════════════════════════════════

/// Wrist-to-middle-base orientation and hand centre, independent of gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HandPose {
    /// `atan2(dx, dy)` of the wrist → middle-finger-base vector, radians.
    pub rotation: f32,
    /// Midpoint of wrist and middle-finger base, normalized image units.
    pub position: Landmark,
}

impl HandPose {
    pub fn from_frame(frame: &LandmarkFrame) -> Self {
        let wrist = frame.point(WRIST);
        let base  = frame.point(MIDDLE_BASE);
        HandPose {
            rotation: (base.x - wrist.x).atan2(base.y - wrist.y),
            position: wrist.midpoint(base),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::LANDMARK_COUNT;
    use crate::poses;
    use proptest::prelude::*;

    fn classify(frame: &LandmarkFrame) -> GestureLabel {
        GestureClassifier::default().classify(Some(frame))
    }

    #[test]
    fn missing_hand_is_none() {
        assert_eq!(GestureClassifier::default().classify(None), GestureLabel::None);
    }

    #[test]
    fn canned_poses() {
        assert_eq!(classify(&poses::fist()),        GestureLabel::Fist);
        assert_eq!(classify(&poses::open_hand()),   GestureLabel::Open);
        assert_eq!(classify(&poses::ok_sign()),     GestureLabel::Ok);
        assert_eq!(classify(&poses::two_fingers()), GestureLabel::None);
    }

    #[test]
    fn ok_wins_over_open() {
        // OK sign with the index also counted as extended still reads OK.
        let frame = poses::with_fingers([true, true, true, true, true], true);
        assert_eq!(classify(&frame), GestureLabel::Ok);
    }

    #[test]
    fn pinch_without_last_three_is_not_ok() {
        let frame = poses::with_fingers([false, false, true, false, true], true);
        assert_eq!(classify(&frame), GestureLabel::None);
    }

    #[test]
    fn hand_pose_upright_hand() {
        // Middle base straight above the wrist → dy < 0, dx = 0 → rotation π.
        let mut pts = [Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        pts[WRIST]       = Landmark::new(0.5, 0.9);
        pts[MIDDLE_BASE] = Landmark::new(0.5, 0.5);
        let pose = HandPose::from_frame(&LandmarkFrame::new(pts));
        assert!((pose.rotation.abs() - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(pose.position, Landmark::new(0.5, 0.7));
    }

    #[test]
    fn labels_display() {
        assert_eq!(GestureLabel::Ok.to_string(), "ok");
        assert_eq!(GestureLabel::default(), GestureLabel::None);
    }

    fn finger_mask() -> impl Strategy<Value = [bool; 5]> {
        proptest::array::uniform5(any::<bool>())
    }

    /// All fingers set to `on` except the one at `odd` (5 means none).
    fn all_but(odd: usize, on: bool) -> [bool; 5] {
        let mut mask = [on; 5];
        if let Some(f) = mask.get_mut(odd) { *f = !on; }
        mask
    }

    proptest! {
        #[test]
        fn few_fingers_without_ok_is_fist(raised in 0usize..=5, pinch in any::<bool>()) {
            // At most one finger up, so the OK sign is impossible.
            let frame = poses::with_fingers(all_but(raised, false), pinch);
            prop_assert!(FingerFlags::from_frame(&frame).count() <= 1);
            prop_assert_eq!(classify(&frame), GestureLabel::Fist);
        }

        #[test]
        fn many_fingers_without_ok_is_open(curled in 0usize..=5, pinch in any::<bool>()) {
            let mask = all_but(curled, true);
            // A pinch only stays non-OK when one of the last three is curled.
            let pinch = pinch && (2..=4).contains(&curled);
            let frame = poses::with_fingers(mask, pinch);
            let flags = FingerFlags::from_frame(&frame);
            prop_assert!(flags.count() >= 4);
            prop_assert!(!(pinch && flags.last_three()));
            prop_assert_eq!(classify(&frame), GestureLabel::Open);
        }

        #[test]
        fn pinch_with_last_three_is_ok(thumb in any::<bool>(), index in any::<bool>()) {
            let frame = poses::with_fingers([thumb, index, true, true, true], true);
            prop_assert_eq!(classify(&frame), GestureLabel::Ok);
        }

        #[test]
        fn fist_and_open_never_both(mask in finger_mask()) {
            let frame = poses::with_fingers(mask, false);
            let n = FingerFlags::from_frame(&frame).count();
            let label = classify(&frame);
            match n {
                0 | 1 => prop_assert_eq!(label, GestureLabel::Fist),
                2 | 3 => prop_assert_eq!(label, GestureLabel::None),
                _     => prop_assert_eq!(label, GestureLabel::Open),
            }
        }
    }
}
