//! Ease curve and small interpolation helpers.

use std::f32::consts::{PI, TAU};

/// Cubic ease-in-out: `4t³` below ½, `1 − (−2t + 2)³ / 2` above.
///
/// Input is clamped to 0.0–1.0.  Symmetric: `ease(1 − t) == 1 − ease(t)`.
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

/// One step of a first-order low-pass toward `target`.
#[inline]
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// `angle` shifted by whole turns to lie within ±π of `reference`.
pub fn nearest_turn(angle: f32, reference: f32) -> f32 {
    let delta = (angle - reference + PI).rem_euclid(TAU) - PI;
    reference + delta
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
