//! Morphable records and the one-time scene layout.
//!
//! Every particle, ornament, light and the star owns two fixed endpoints:
//! where it sits on the converged tree and where it flies to when the tree
//! explodes.  Both are chosen here, once, and never change afterwards.
//! Records live in flat `Vec`s and are addressed by index.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::config::{Rgb, TreeConfig};
use crate::ease::ease_in_out_cubic;

/// Golden angle, for evenly scattered ornaments.
const GOLDEN_ANGLE: f32 = 2.399_963;
/// Turns the light string makes from base to apex.
const LIGHT_TURNS: f32 = 7.0;

/// Rotate `v` about the vertical axis; a point at angle `a` on the xz-plane
/// (x = r cos a, z = r sin a) ends up at `a + angle`.
#[inline]
pub fn spin_y(v: Vec3, angle: f32) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(v.x * c - v.z * s, v.y, v.x * s + v.z * c)
}

// ════════════════════════════════════════════════════════════════════════════
// MorphablePoint
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MorphablePoint {
    pub tree:     Vec3,
    pub exploded: Vec3,
}

impl MorphablePoint {
    pub fn new(tree: Vec3, exploded: Vec3) -> Self {
        MorphablePoint { tree, exploded }
    }

    /// Particle convention: rest pole is the exploded cloud,
    /// `lerp(exploded, tree, ease(progress))`.
    #[inline]
    pub fn converged(&self, progress: f32) -> Vec3 {
        self.exploded.lerp(self.tree, ease_in_out_cubic(progress))
    }

    /// Decoration convention: rest pole is the (spun) tree position,
    /// `lerp(spin(tree), exploded, ease(1 − progress))`.
    #[inline]
    pub fn exploding(&self, progress: f32, rotation: f32) -> Vec3 {
        spin_y(self.tree, rotation).lerp(self.exploded, ease_in_out_cubic(1.0 - progress))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Records
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct Particle {
    pub point: MorphablePoint,
    pub color: Rgb,
    pub size:  f32,
}

#[derive(Clone, Debug)]
pub struct Ornament {
    pub point: MorphablePoint,
    pub color: Rgb,
    pub scale: f32,
}

#[derive(Clone, Debug)]
pub struct Light {
    pub point: MorphablePoint,
    pub color: Rgb,
    /// Fixed twinkle phase, radians.
    pub phase: f32,
}

impl Light {
    /// `0.5 + 0.5 sin(time·5 + phase)`, independent of the morph.
    #[inline]
    pub fn twinkle(&self, time: f32) -> f32 {
        0.5 + 0.5 * (time * 5.0 + self.phase).sin()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TreeShape: the cone everything converges onto
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
pub struct TreeShape {
    pub height: f32,
    pub radius: f32,
}

impl TreeShape {
    /// The tree is centred vertically on the origin.
    pub fn base_y(&self) -> f32 { -self.height / 2.0 }

    pub fn apex_y(&self) -> f32 { self.height / 2.0 }

    /// Cone radius at height fraction `t` (0 = base, 1 = apex).
    pub fn radius_at(&self, t: f32) -> f32 {
        self.radius * (1.0 - t.clamp(0.0, 1.0))
    }

    fn surface(&self, t: f32, angle: f32, inset: f32) -> Vec3 {
        let r = self.radius_at(t) * inset;
        Vec3::new(r * angle.cos(), self.base_y() + t * self.height, r * angle.sin())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SceneLayout: built once at setup
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct SceneLayout {
    pub shape:     TreeShape,
    pub particles: Vec<Particle>,
    pub ornaments: Vec<Ornament>,
    pub lights:    Vec<Light>,
    pub star:      MorphablePoint,
}

impl SceneLayout {
    pub fn build<R: Rng + ?Sized>(cfg: &TreeConfig, rng: &mut R) -> Self {
        let shape = TreeShape { height: cfg.tree_height, radius: cfg.tree_radius };
        let pick = |rng: &mut R| cfg.palette[rng.gen_range(0..cfg.palette.len())].color;
        let light_color = cfg.color("gold").unwrap_or(Rgb::WHITE);

        let particles = (0..cfg.particle_count)
            .map(|_| {
                let t = rng.gen::<f32>();
                let angle = rng.gen::<f32>() * TAU;
                // sqrt fills the cross-section evenly instead of bunching at the axis
                let inset = rng.gen::<f32>().sqrt();
                Particle {
                    point: MorphablePoint::new(
                        shape.surface(t, angle, inset),
                        in_sphere(rng, 0.0, cfg.explode_radius),
                    ),
                    color: pick(rng),
                    size:  rng.gen_range(0.04..0.12),
                }
            })
            .collect();

        let ornaments = (0..cfg.ornament_count)
            .map(|i| {
                let t = 0.05 + 0.85 * (i as f32 + 0.5) / cfg.ornament_count as f32;
                let angle = i as f32 * GOLDEN_ANGLE;
                Ornament {
                    point: MorphablePoint::new(
                        shape.surface(t, angle, 0.95),
                        in_sphere(rng, 0.6 * cfg.explode_radius, cfg.explode_radius),
                    ),
                    color: pick(rng),
                    scale: rng.gen_range(0.15..0.3),
                }
            })
            .collect();

        let lights = (0..cfg.light_count)
            .map(|i| {
                let t = (i as f32 + 0.5) / cfg.light_count as f32;
                let angle = t * LIGHT_TURNS * TAU;
                Light {
                    point: MorphablePoint::new(
                        shape.surface(t * 0.95, angle, 1.02),
                        in_sphere(rng, 0.4 * cfg.explode_radius, cfg.explode_radius),
                    ),
                    color: light_color,
                    phase: rng.gen::<f32>() * TAU,
                }
            })
            .collect();

        let star = MorphablePoint::new(
            Vec3::new(0.0, shape.apex_y() + 0.3, 0.0),
            Vec3::new(0.0, shape.apex_y() + 0.5 * cfg.explode_radius, 0.0),
        );

        SceneLayout { shape, particles, ornaments, lights, star }
    }
}

/// Uniform sample of the spherical shell `min_r..=max_r` around the origin.
fn in_sphere<R: Rng + ?Sized>(rng: &mut R, min_r: f32, max_r: f32) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let theta = rng.gen::<f32>() * TAU;
    let ring = (1.0 - z * z).max(0.0).sqrt();
    let dir = Vec3::new(ring * theta.cos(), z, ring * theta.sin());
    // cube root keeps the density uniform by volume
    let lo = (min_r / max_r).powi(3);
    let u: f32 = rng.gen_range(lo..=1.0);
    dir * (u.cbrt() * max_r)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
