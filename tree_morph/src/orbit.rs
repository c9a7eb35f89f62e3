//! The image ring shown around the exploded tree.
//!
//! Slots sit at evenly spaced base angles on a flat ring that spins with the
//! tree.  The ring grows from a small hidden radius to the visible radius as
//! the tree explodes; images fade in past the halfway point.  While exploded
//! the slot nearest the camera (largest z) is the selected one.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;

use crate::config::OrbitConfig;
use crate::ease::{approach, ease_in_out_cubic, nearest_turn};
use crate::state::{DisplayState, SlotVisibility};

/// Scale multiplier of the selected slot.
pub const SELECTED_BOOST: f32 = 1.5;
/// Explode progress below which images stay invisible.
pub const VISIBLE_FROM: f32 = 0.5;

// ════════════════════════════════════════════════════════════════════════════
// OrbitSlot
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct OrbitSlot {
    /// Fixed at setup: `index / count · 2π`.
    pub base_angle:  f32,
    pub radius:      f32,
    pub position:    Vec3,
    pub opacity:     f32,
    pub scale:       f32,
    pub is_selected: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// OrbitSelector
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct OrbitSelector {
    slots: Vec<OrbitSlot>,
    cfg:   OrbitConfig,
}

impl OrbitSelector {
    pub fn new(count: usize, cfg: OrbitConfig) -> Self {
        let slots = (0..count)
            .map(|i| {
                let base_angle = i as f32 / count as f32 * TAU;
                let radius = cfg.hidden_radius;
                OrbitSlot {
                    base_angle,
                    radius,
                    position: ring_point(base_angle, radius, cfg.height),
                    opacity: 0.0,
                    scale: cfg.image_scale * 0.5,
                    is_selected: false,
                }
            })
            .collect();
        OrbitSelector { slots, cfg }
    }

    pub fn slots(&self) -> &[OrbitSlot] { &self.slots }

    pub fn len(&self) -> usize { self.slots.len() }

    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    /// Per-tick update.  Returns the camera-facing slot while `Exploded`,
    /// which the caller records as the selected image; `None` otherwise or
    /// when there are no slots.
    pub fn update(
        &mut self,
        state: DisplayState,
        morph_progress: f32,
        tree_rotation: f32,
    ) -> Option<usize> {
        let explode = 1.0 - morph_progress.clamp(0.0, 1.0);
        let radius = self.cfg.hidden_radius
            + (self.cfg.visible_radius - self.cfg.hidden_radius) * ease_in_out_cubic(explode);

        for slot in &mut self.slots {
            slot.radius = radius;
            slot.position = ring_point(slot.base_angle + tree_rotation, radius, self.cfg.height);
        }

        let front = if state == DisplayState::Exploded { self.front_slot() } else { None };

        let target_opacity = if explode > VISIBLE_FROM { explode } else { 0.0 };
        let base_scale = self.cfg.image_scale * (0.5 + 0.5 * explode);
        let k = self.cfg.smoothing;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.is_selected = front == Some(i);
            let target_scale = if slot.is_selected { base_scale * SELECTED_BOOST } else { base_scale };
            slot.opacity = approach(slot.opacity, target_opacity, k);
            slot.scale = approach(slot.scale, target_scale, k);
        }

        front
    }

    /// Slot with the largest depth coordinate, i.e. facing the camera.
    pub fn front_slot(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, slot) in self.slots.iter().enumerate() {
            if best.map_or(true, |(_, z)| slot.position.z > z) {
                best = Some((i, slot.position.z));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Tree rotation (nearest to `current`) that brings slot `index` to the
    /// front of the ring.
    pub fn facing_rotation(&self, index: usize, current: f32) -> Option<f32> {
        let slot = self.slots.get(index)?;
        Some(nearest_turn(FRAC_PI_2 - slot.base_angle, current))
    }
}

impl SlotVisibility for OrbitSelector {
    fn slot_count(&self) -> usize { self.slots.len() }

    fn front_slot(&self) -> Option<usize> { OrbitSelector::front_slot(self) }

    fn slot_opacity(&self, index: usize) -> Option<f32> {
        self.slots.get(index).map(|s| s.opacity)
    }
}

fn ring_point(angle: f32, radius: f32, height: f32) -> Vec3 {
    Vec3::new(radius * angle.cos(), height, radius * angle.sin())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
