//! Landmark frames: the detector input contract.
//!
//! A frame is exactly 21 normalized image-space points (x, y in 0.0–1.0,
//! y growing downward) in the usual hand-skeleton ordering.  Only the
//! indices the classifier reads are named here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:       usize = 0;
pub const THUMB_IP:    usize = 3;
pub const THUMB_TIP:   usize = 4;
pub const INDEX_PIP:   usize = 6;
pub const INDEX_TIP:   usize = 8;
pub const MIDDLE_BASE: usize = 9;
pub const MIDDLE_PIP:  usize = 10;
pub const MIDDLE_TIP:  usize = 12;
pub const RING_PIP:    usize = 14;
pub const RING_TIP:    usize = 16;
pub const PINKY_PIP:   usize = 18;
pub const PINKY_TIP:   usize = 20;

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One tracked hand-skeleton point.  Extra fields sent by the detector
/// (depth, visibility) are ignored on deserialization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Landmark { x, y }
    }

    pub fn distance(self, other: Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(self, other: Landmark) -> Landmark {
        Landmark::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkFrame
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LandmarkError {
    #[error("expected 21 landmarks, got {0}")]
    WrongCount(usize),
    #[error("landmark {index} is not finite ({x}, {y})")]
    NotFinite { index: usize, x: f32, y: f32 },
}

/// The 21 landmarks of one hand for one camera frame.  Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct LandmarkFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        LandmarkFrame { points }
    }

    /// Build a frame from a detector-provided slice, rejecting wrong
    /// lengths and NaN/infinite coordinates.
    pub fn from_slice(points: &[Landmark]) -> Result<Self, LandmarkError> {
        if points.len() != LANDMARK_COUNT {
            return Err(LandmarkError::WrongCount(points.len()));
        }
        let mut out = [Landmark::default(); LANDMARK_COUNT];
        for (index, (slot, p)) in out.iter_mut().zip(points).enumerate() {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(LandmarkError::NotFinite { index, x: p.x, y: p.y });
            }
            *slot = *p;
        }
        Ok(LandmarkFrame { points: out })
    }

    #[inline]
    pub fn point(&self, index: usize) -> Landmark {
        self.points[index]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    /// Copy of this frame with every point shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f32, dy: f32) -> LandmarkFrame {
        let mut points = self.points;
        for p in &mut points {
            p.x += dx;
            p.y += dy;
        }
        LandmarkFrame { points }
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkFrame {
    type Error = LandmarkError;

    fn try_from(v: Vec<Landmark>) -> Result<Self, Self::Error> {
        LandmarkFrame::from_slice(&v)
    }
}

impl From<LandmarkFrame> for Vec<Landmark> {
    fn from(frame: LandmarkFrame) -> Self {
        frame.points.to_vec()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DetectorSample: one line of detector output
// ════════════════════════════════════════════════════════════════════════════

/// What the external detector reports for one camera frame.
///
/// Wire format (one JSON object per line):
///
/// ```text
/// {"tracking": true, "landmarks": [{"x":0.51,"y":0.80}, … 21 points]}
/// {"tracking": true, "landmarks": null}
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorSample {
    #[serde(default = "default_tracking")]
    pub tracking:  bool,
    #[serde(default)]
    pub landmarks: Option<LandmarkFrame>,
}

fn default_tracking() -> bool { true }

/// Same as an empty JSON object: tracking, no hand.
impl Default for DetectorSample {
    fn default() -> Self {
        DetectorSample::no_hand()
    }
}

impl DetectorSample {
    pub fn hand(frame: LandmarkFrame) -> Self {
        DetectorSample { tracking: true, landmarks: Some(frame) }
    }

    pub fn no_hand() -> Self {
        DetectorSample { tracking: true, landmarks: None }
    }

    /// Parse one line of detector output.
    pub fn parse_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn line_of(n: usize) -> String {
        let pts: Vec<String> = (0..n)
            .map(|i| format!("{{\"x\":{},\"y\":0.5,\"z\":-0.1}}", i as f32 / 40.0))
            .collect();
        format!("{{\"tracking\":true,\"landmarks\":[{}]}}", pts.join(","))
    }

    #[test]
    fn parses_full_frame_ignoring_depth() {
        let s = DetectorSample::parse_line(&line_of(21)).unwrap();
        assert!(s.tracking);
        let frame = s.landmarks.unwrap();
        assert_eq!(frame.point(20), Landmark::new(0.5, 0.5));
    }

    #[test]
    fn rejects_short_frame() {
        assert!(DetectorSample::parse_line(&line_of(20)).is_err());
    }

    #[test]
    fn null_landmarks_is_no_hand() {
        let s = DetectorSample::parse_line(r#"{"tracking":false,"landmarks":null}"#).unwrap();
        assert!(!s.tracking);
        assert!(s.landmarks.is_none());
    }

    #[test]
    fn tracking_defaults_to_true() {
        let s = DetectorSample::parse_line("{}").unwrap();
        assert!(s.tracking);
        assert!(s.landmarks.is_none());
        assert_eq!(s, DetectorSample::default());
    }

    #[test]
    fn from_slice_rejects_nan() {
        let mut pts = vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        pts[7].y = f32::NAN;
        assert!(matches!(
            LandmarkFrame::from_slice(&pts),
            Err(LandmarkError::NotFinite { index: 7, .. })
        ));
    }

    #[test]
    fn midpoint_and_distance() {
        let a = Landmark::new(0.0, 0.0);
        let b = Landmark::new(0.6, 0.8);
        assert!((a.distance(b) - 1.0).abs() < 1e-6);
        assert_eq!(a.midpoint(b), Landmark::new(0.3, 0.4));
    }
}
