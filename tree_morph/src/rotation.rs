//! Smoothed tree rotation about the vertical axis.

use std::f32::consts::PI;

use hand_gesture::HandPose;

use crate::config::TreeConfig;
use crate::ease::approach;
use crate::state::DisplayState;

/// `rotation` chases `target` with a fixed per-tick factor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationState {
    rotation: f32,
    target:   f32,
}

impl RotationState {
    pub fn rotation(&self) -> f32 { self.rotation }

    pub fn target(&self) -> f32 { self.target }

    /// Point the target at an absolute angle (keyboard selection).
    pub fn face(&mut self, angle: f32) {
        self.target = angle;
    }

    /// One tick.  A tracked hand steers the target; otherwise the tree
    /// auto-rotates, but only in the tree state.
    pub fn update(
        &mut self,
        hand: Option<&HandPose>,
        tracking: bool,
        state: DisplayState,
        cfg: &TreeConfig,
    ) {
        match hand {
            // Mirrored feed: hand moving right turns the tree right.
            Some(pose) if tracking => self.target = (0.5 - pose.position.x) * PI,
            _ if cfg.auto_rotate && state == DisplayState::Tree => {
                self.target += cfg.auto_rotate_speed;
            }
            _ => {}
        }
        self.rotation = approach(self.rotation, self.target, cfg.rotation_speed);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
