//! # hand_gesture
//!
//! Single-hand gesture recognition from the 21 normalized 2-D landmarks an
//! external hand detector produces per camera frame.
//!
//! ## Pipeline
//!
//! ```text
//! DetectorSample ──► GestureClassifier ──► GestureSmoother ──► change event
//!   (21 points)        (fist/open/ok)       (5-frame vote)
//! ```
//!
//! | Gesture | Rule |
//! |---|---|
//! | `ok`   | thumb tip ↔ index tip < 0.08 and middle, ring, pinky extended (checked first) |
//! | `fist` | at most one finger extended |
//! | `open` | four or more fingers extended |
//! | `none` | no hand, or 2–3 fingers extended |
//!
//! ## Quick start
//!
//! ```rust
//! use hand_gesture::{HandTracker, GestureLabel, poses};
//!
//! let mut tracker = HandTracker::default();
//! let fist = poses::fist();
//! let step = tracker.process(Some(&fist));
//! assert_eq!(step.change, Some(GestureLabel::Fist));
//! ```

pub mod landmark;
pub mod classifier;
pub mod smoother;
pub mod tracker;
pub mod poses;

pub use classifier::{ClassifierConfig, FingerFlags, GestureClassifier, GestureLabel, HandPose};
pub use landmark::{DetectorSample, Landmark, LandmarkError, LandmarkFrame, LANDMARK_COUNT};
pub use smoother::{GestureHistory, GestureSmoother, HISTORY_CAPACITY};
pub use tracker::{HandTracker, TrackerStep};
