//! Morph progress and the flat per-tick output buffers.
//!
//! `progress` runs from 0.0 (exploded cloud) to 1.0 (tree).  Each tick it
//! steps toward the pole of the current display state and is frozen while
//! zoomed, so the morph can reverse at any point mid-transition.

use glam::Vec3;

use crate::config::Rgb;
use crate::points::SceneLayout;
use crate::state::DisplayState;

const LIGHT_SIZE: f32 = 0.08;
const STAR_SIZE:  f32 = 0.6;

/// Rendered placement of a decoration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub opacity:  f32,
    pub scale:    f32,
}

impl Pose {
    const HIDDEN: Pose = Pose { position: Vec3::ZERO, opacity: 0.0, scale: 0.0 };
}

// ════════════════════════════════════════════════════════════════════════════
// MorphEngine
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct MorphEngine {
    progress: f32,
    step:     f32,

    // Particle field, xyz / rgb interleaved.  Sized once in `new`.
    particle_positions: Vec<f32>,
    particle_colors:    Vec<f32>,
    particle_sizes:     Vec<f32>,
    particle_rotation:  f32,

    ornaments:       Vec<Pose>,
    ornament_colors: Vec<Rgb>,
    lights:          Vec<Pose>,
    light_colors:    Vec<Rgb>,
    star:            Pose,
}

impl MorphEngine {
    /// Starts converged (`progress = 1.0`).
    pub fn new(layout: &SceneLayout, transition_speed: f32) -> Self {
        let n = layout.particles.len();
        let mut particle_colors = Vec::with_capacity(n * 3);
        let mut particle_sizes = Vec::with_capacity(n);
        for p in &layout.particles {
            particle_colors.extend_from_slice(&p.color.to_array());
            particle_sizes.push(p.size);
        }

        let mut engine = MorphEngine {
            progress: 1.0,
            step: transition_speed,
            particle_positions: vec![0.0; n * 3],
            particle_colors,
            particle_sizes,
            particle_rotation: 0.0,
            ornaments: vec![Pose::HIDDEN; layout.ornaments.len()],
            ornament_colors: layout.ornaments.iter().map(|o| o.color).collect(),
            lights: vec![Pose::HIDDEN; layout.lights.len()],
            light_colors: layout.lights.iter().map(|l| l.color).collect(),
            star: Pose::HIDDEN,
        };
        engine.write(layout, 0.0, 0.0);
        engine
    }

    pub fn progress(&self) -> f32 { self.progress }

    /// `1 − progress`; drives the orbit.
    pub fn explode(&self) -> f32 { 1.0 - self.progress }

    /// Step progress toward the pole of `state`.  Returns the new value.
    pub fn advance(&mut self, state: DisplayState) -> f32 {
        let delta = match state {
            DisplayState::Tree     => self.step,
            DisplayState::Exploded => -self.step,
            DisplayState::Zoomed   => 0.0,
        };
        self.progress = (self.progress + delta).clamp(0.0, 1.0);
        self.progress
    }

    /// Recompute every output buffer for the current progress.
    pub fn write(&mut self, layout: &SceneLayout, rotation: f32, time: f32) {
        let p = self.progress;

        for (out, particle) in self.particle_positions.chunks_exact_mut(3).zip(&layout.particles) {
            out.copy_from_slice(&particle.point.converged(p).to_array());
        }
        self.particle_rotation = rotation;

        for (pose, orn) in self.ornaments.iter_mut().zip(&layout.ornaments) {
            *pose = Pose {
                position: orn.point.exploding(p, rotation),
                opacity:  1.0,
                scale:    orn.scale,
            };
        }
        for (pose, light) in self.lights.iter_mut().zip(&layout.lights) {
            *pose = Pose {
                position: light.point.exploding(p, rotation),
                opacity:  light.twinkle(time),
                scale:    LIGHT_SIZE,
            };
        }
        self.star = Pose {
            position: layout.star.exploding(p, rotation),
            opacity:  1.0,
            scale:    STAR_SIZE,
        };
    }

    pub fn particle_positions(&self) -> &[f32] { &self.particle_positions }
    pub fn particle_colors(&self) -> &[f32] { &self.particle_colors }
    pub fn particle_sizes(&self) -> &[f32] { &self.particle_sizes }
    pub fn particle_rotation(&self) -> f32 { self.particle_rotation }
    pub fn ornaments(&self) -> &[Pose] { &self.ornaments }
    pub fn ornament_colors(&self) -> &[Rgb] { &self.ornament_colors }
    pub fn lights(&self) -> &[Pose] { &self.lights }
    pub fn light_colors(&self) -> &[Rgb] { &self.light_colors }
    pub fn star(&self) -> Pose { self.star }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeConfig;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> (SceneLayout, MorphEngine) {
        let cfg = TreeConfig { particle_count: 40, ..TreeConfig::default() };
        let layout = SceneLayout::build(&cfg, &mut StdRng::seed_from_u64(11));
        let engine = MorphEngine::new(&layout, cfg.transition_speed);
        (layout, engine)
    }

    #[test]
    fn buffers_sized_once() {
        let (layout, e) = setup();
        assert_eq!(e.particle_positions().len(), layout.particles.len() * 3);
        assert_eq!(e.particle_colors().len(), layout.particles.len() * 3);
        assert_eq!(e.particle_sizes().len(), layout.particles.len());
        assert_eq!(e.ornaments().len(), layout.ornaments.len());
        assert_eq!(e.lights().len(), layout.lights.len());
    }

    #[test]
    fn starts_on_tree() {
        let (layout, e) = setup();
        assert_eq!(e.progress(), 1.0);
        let first = Vec3::from_slice(&e.particle_positions()[0..3]);
        assert!((first - layout.particles[0].point.tree).length() < 1e-4);
    }

    #[test]
    fn explode_decreases_progress_each_tick() {
        let (_, mut e) = setup();
        let mut last = e.progress();
        for _ in 0..10 {
            let now = e.advance(DisplayState::Exploded);
            assert!(now < last);
            last = now;
        }
        assert!((last - 0.8).abs() < 1e-4);
    }

    #[test]
    fn zoomed_freezes_progress() {
        let (_, mut e) = setup();
        for _ in 0..20 { e.advance(DisplayState::Exploded); }
        let held = e.progress();
        for _ in 0..50 {
            assert_eq!(e.advance(DisplayState::Zoomed), held);
        }
    }

    #[test]
    fn reverses_mid_transition() {
        let (_, mut e) = setup();
        for _ in 0..10 { e.advance(DisplayState::Exploded); }
        let mid = e.progress();
        e.advance(DisplayState::Tree);
        assert!(e.progress() > mid);
    }

    #[test]
    fn fully_exploded_particles_reach_cloud() {
        let (layout, mut e) = setup();
        for _ in 0..200 { e.advance(DisplayState::Exploded); }
        e.write(&layout, 0.7, 0.0);
        assert_eq!(e.progress(), 0.0);
        let p = Vec3::from_slice(&e.particle_positions()[3..6]);
        assert!((p - layout.particles[1].point.exploded).length() < 1e-4);
        assert!((e.ornaments()[0].position - layout.ornaments[0].point.exploded).length() < 1e-4);
    }

    #[test]
    fn light_opacity_is_twinkle() {
        let (layout, mut e) = setup();
        e.write(&layout, 0.0, 2.5);
        for (pose, light) in e.lights().iter().zip(&layout.lights) {
            assert!((pose.opacity - light.twinkle(2.5)).abs() < 1e-6);
        }
    }

    #[test]
    fn rotation_spins_decorations_not_particles() {
        let (layout, mut e) = setup();
        e.write(&layout, 1.0, 0.0);
        assert_eq!(e.particle_rotation(), 1.0);
        let spun = crate::points::spin_y(layout.ornaments[3].point.tree, 1.0);
        assert!((e.ornaments()[3].position - spun).length() < 1e-4);
        let first = Vec3::from_slice(&e.particle_positions()[0..3]);
        assert!((first - layout.particles[0].point.tree).length() < 1e-4);
    }

    fn any_state() -> impl Strategy<Value = DisplayState> {
        prop_oneof![
            Just(DisplayState::Tree),
            Just(DisplayState::Exploded),
            Just(DisplayState::Zoomed),
        ]
    }

    proptest! {
        #[test]
        fn progress_stays_clamped(states in prop::collection::vec(any_state(), 0..400)) {
            let (_, mut e) = setup();
            for s in states {
                let p = e.advance(s);
                prop_assert!((0.0..=1.0).contains(&p));
            }
        }
    }
}
