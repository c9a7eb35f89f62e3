//! The owned scene context: everything the render loop mutates per tick.

use hand_gesture::HandPose;
use rand::Rng;
use tracing::info;

use crate::config::{ConfigError, Rgb, TreeConfig};
use crate::morph::{MorphEngine, Pose};
use crate::orbit::{OrbitSelector, OrbitSlot};
use crate::points::SceneLayout;
use crate::rotation::RotationState;
use crate::state::{DisplayState, SceneEvent, SceneStateMachine, Transition};

// ════════════════════════════════════════════════════════════════════════════
// SceneFrame: what a renderer reads after each tick
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
pub struct SceneFrame<'a> {
    pub state:    DisplayState,
    pub progress: f32,
    pub time:     f32,

    /// xyz interleaved, unrotated; spin the field by `particle_rotation`.
    pub particle_positions: &'a [f32],
    /// rgb interleaved.
    pub particle_colors:    &'a [f32],
    pub particle_sizes:     &'a [f32],
    pub particle_rotation:  f32,

    pub ornaments:       &'a [Pose],
    pub ornament_colors: &'a [Rgb],
    pub lights:          &'a [Pose],
    pub light_colors:    &'a [Rgb],
    pub star:            Pose,

    pub images:      &'a [OrbitSlot],
    pub image_names: &'a [String],
    pub selected:    usize,
    /// Image shown in the zoom overlay.
    pub zoomed:      Option<usize>,
}

impl SceneFrame<'_> {
    pub fn particle_count(&self) -> usize {
        self.particle_sizes.len()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Scene
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct Scene {
    cfg:      TreeConfig,
    layout:   SceneLayout,
    machine:  SceneStateMachine,
    rotation: RotationState,
    morph:    MorphEngine,
    orbit:    OrbitSelector,
    hand:     Option<HandPose>,
    tracking: bool,
    time:     f32,
}

impl Scene {
    /// Build the scene from a validated copy of `cfg`.
    pub fn new<R: Rng + ?Sized>(cfg: &TreeConfig, rng: &mut R) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let layout = SceneLayout::build(cfg, rng);
        let morph = MorphEngine::new(&layout, cfg.transition_speed);
        let orbit = OrbitSelector::new(cfg.images.len(), cfg.orbit.clone());
        info!(
            particles = layout.particles.len(),
            ornaments = layout.ornaments.len(),
            lights = layout.lights.len(),
            images = orbit.len(),
            "scene built"
        );
        Ok(Scene {
            cfg: cfg.clone(),
            layout,
            machine: SceneStateMachine::new(),
            rotation: RotationState::default(),
            morph,
            orbit,
            hand: None,
            tracking: false,
            time: 0.0,
        })
    }

    pub fn config(&self) -> &TreeConfig { &self.cfg }

    pub fn state(&self) -> DisplayState { self.machine.state() }

    pub fn machine(&self) -> &SceneStateMachine { &self.machine }

    pub fn progress(&self) -> f32 { self.morph.progress() }

    pub fn rotation(&self) -> &RotationState { &self.rotation }

    pub fn orbit(&self) -> &OrbitSelector { &self.orbit }

    pub fn layout(&self) -> &SceneLayout { &self.layout }

    /// Feed one event to the state machine.  A keyboard selection also
    /// swings the chosen image to the front, measured from where the tree
    /// is already heading so repeated presses keep stepping.
    pub fn apply(&mut self, event: SceneEvent) -> Transition {
        let t = self.machine.apply(event, &self.orbit);
        if let Transition::SelectionMoved(i) = t {
            if let Some(angle) = self.orbit.facing_rotation(i, self.rotation.target()) {
                self.rotation.face(angle);
            }
        }
        t
    }

    /// Latest hand pose and detector tracking flag; held until replaced.
    pub fn set_hand(&mut self, hand: Option<HandPose>, tracking: bool) {
        self.hand = hand;
        self.tracking = tracking;
    }

    /// Advance one frame: clock, rotation, morph, orbit.
    pub fn tick(&mut self, dt: f32) {
        self.time += dt;
        let state = self.machine.state();

        if self.tracking && self.hand.is_some() {
            self.machine.cancel_pending();
        }
        self.rotation.update(self.hand.as_ref(), self.tracking, state, &self.cfg);
        let rotation = self.rotation.rotation();

        self.morph.advance(state);
        self.morph.write(&self.layout, rotation, self.time);

        if let Some(front) = self.orbit.update(state, self.morph.progress(), rotation) {
            self.machine.record_front(front);
        }
    }

    pub fn frame(&self) -> SceneFrame<'_> {
        SceneFrame {
            state:    self.machine.state(),
            progress: self.morph.progress(),
            time:     self.time,
            particle_positions: self.morph.particle_positions(),
            particle_colors:    self.morph.particle_colors(),
            particle_sizes:     self.morph.particle_sizes(),
            particle_rotation:  self.morph.particle_rotation(),
            ornaments:       self.morph.ornaments(),
            ornament_colors: self.morph.ornament_colors(),
            lights:          self.morph.lights(),
            light_colors:    self.morph.light_colors(),
            star:            self.morph.star(),
            images:      self.orbit.slots(),
            image_names: &self.cfg.images,
            selected:    self.machine.selected_image(),
            zoomed:      self.machine.zoomed_image(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::{GestureLabel, Landmark};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    fn scene() -> Scene {
        let cfg = TreeConfig { particle_count: 64, ..TreeConfig::default() };
        Scene::new(&cfg, &mut StdRng::seed_from_u64(1)).unwrap()
    }

    fn run(s: &mut Scene, ticks: usize) {
        for _ in 0..ticks { s.tick(DT); }
    }

    #[test]
    fn open_hand_explodes_gradually() {
        let mut s = scene();
        s.apply(GestureLabel::Open.into());
        let mut last = s.progress();
        for _ in 0..20 {
            s.tick(DT);
            assert!(s.progress() < last);
            last = s.progress();
        }
    }

    #[test]
    fn explode_then_zoom_then_release() {
        let mut s = scene();
        s.apply(SceneEvent::Explode);
        run(&mut s, 200);
        let selected = s.machine().selected_image();
        assert!(s.orbit().slots()[selected].is_selected);
        assert!(s.orbit().slots()[selected].opacity > 0.3);

        let t = s.apply(GestureLabel::Ok.into());
        assert_eq!(t, Transition::Changed { from: DisplayState::Exploded, to: DisplayState::Zoomed });
        let held = s.progress();
        run(&mut s, 30);
        assert_eq!(s.progress(), held);
        assert_eq!(s.frame().zoomed, Some(selected));

        s.apply(GestureLabel::None.into());
        assert_eq!(s.state(), DisplayState::Exploded);
        assert_eq!(s.frame().zoomed, None);
    }

    #[test]
    fn zoom_before_images_fade_in_is_ignored() {
        let mut s = scene();
        s.apply(SceneEvent::Explode);
        s.tick(DT);
        assert_eq!(s.apply(SceneEvent::Zoom), Transition::Unchanged);
        assert_eq!(s.state(), DisplayState::Exploded);
    }

    #[test]
    fn no_slot_selected_outside_exploded() {
        let mut s = scene();
        run(&mut s, 50);
        assert!(s.frame().images.iter().all(|i| !i.is_selected));
    }

    #[test]
    fn select_next_swings_rotation() {
        let cfg = TreeConfig { particle_count: 8, auto_rotate: false, ..TreeConfig::default() };
        let mut s = Scene::new(&cfg, &mut StdRng::seed_from_u64(2)).unwrap();
        s.apply(SceneEvent::Explode);
        run(&mut s, 200);
        let start = s.machine().selected_image();
        let t = s.apply(SceneEvent::SelectNext);
        assert_eq!(t, Transition::SelectionMoved(start + 1));
        run(&mut s, 400);
        assert_eq!(s.machine().selected_image(), start + 1);
    }

    #[test]
    fn quick_double_select_moves_two_slots() {
        let cfg = TreeConfig { particle_count: 8, auto_rotate: false, ..TreeConfig::default() };
        let mut s = Scene::new(&cfg, &mut StdRng::seed_from_u64(2)).unwrap();
        s.apply(SceneEvent::Explode);
        run(&mut s, 200);
        let start = s.machine().selected_image();
        assert!(start + 2 < s.orbit().len());

        s.apply(SceneEvent::SelectNext);
        s.tick(DT);
        assert_eq!(s.frame().selected, start + 1);
        assert_eq!(s.apply(SceneEvent::SelectNext), Transition::SelectionMoved(start + 2));
        run(&mut s, 400);
        assert_eq!(s.machine().selected_image(), start + 2);
        assert_eq!(s.machine().pending_selection(), None);
        assert!(s.orbit().slots()[start + 2].is_selected);
    }

    #[test]
    fn tracked_hand_drives_rotation() {
        let mut s = scene();
        let pose = HandPose { rotation: 0.0, position: Landmark::new(0.0, 0.5) };
        s.set_hand(Some(pose), true);
        run(&mut s, 400);
        assert!((s.rotation().rotation() - std::f32::consts::FRAC_PI_2).abs() < 1e-2);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        let flat = TreeConfig { explode_radius: 0.0, ..TreeConfig::default() };
        assert!(matches!(
            Scene::new(&flat, &mut rng),
            Err(ConfigError::Invalid { field: "explode_radius", .. })
        ));
        let bare = TreeConfig { palette: Vec::new(), ..TreeConfig::default() };
        assert!(Scene::new(&bare, &mut rng).is_err());
    }

    #[test]
    fn frame_exposes_all_buffers() {
        let s = scene();
        let f = s.frame();
        assert_eq!(f.particle_count(), 64);
        assert_eq!(f.particle_positions.len(), 64 * 3);
        assert_eq!(f.images.len(), s.config().images.len());
        assert_eq!(f.image_names.len(), f.images.len());
        assert_eq!(f.ornament_colors.len(), f.ornaments.len());
    }
}
