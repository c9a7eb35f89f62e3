//! Top-level application state and render loop.
//!
//! `AppState` owns the `Scene` and the status line.  It turns tracker events
//! and window controls into `SceneEvent`s and drives the visualizer each
//! frame.

use std::sync::mpsc::TryRecvError;
use std::time::Instant;

use hand_gesture::{ClassifierConfig, GestureLabel};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};
use tree_morph::{ConfigError, Scene, SceneEvent, Transition, TreeConfig};

use crate::detector::{
    spawn_tracking, JsonLinesDetector, ScriptedDetector, TrackerEvent, TrackingHandle,
};
use crate::visualizer::{Visualizer, ViewerError};

/// Cap on the per-frame time step after a stall.
const MAX_DT: f32 = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where hand landmarks come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DetectorKind {
    /// Keyboard and mouse only.
    None,
    /// JSON lines on stdin, one per camera frame.
    #[default]
    Stdin,
    /// Built-in scripted hand loop.
    Demo,
}

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub tree:       TreeConfig,
    pub classifier: ClassifierConfig,
    pub detector:   DetectorKind,
    /// Fixed seed for the scene layout; random when unset.
    pub seed:       Option<u64>,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    scene:    Scene,
    gesture:  GestureLabel,
    tracking: bool,
    /// Set once the detector-unavailable notice has been shown.
    notified: bool,
    pub status: String,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Result<Self, ConfigError> {
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(AppState {
            scene:    Scene::new(&cfg.tree, &mut rng)?,
            gesture:  GestureLabel::None,
            tracking: false,
            notified: false,
            status:   "Ready: show an open hand to explode the tree".to_string(),
        })
    }

    pub fn scene(&self) -> &Scene { &self.scene }

    /// Latest smoothed gesture reported by the detector.
    pub fn gesture(&self) -> GestureLabel { self.gesture }

    pub fn is_tracking(&self) -> bool { self.tracking }

    // ── process one TrackerEvent ─────────────────────────────────────────

    pub fn handle_tracker_event(&mut self, event: TrackerEvent) {
        match event {
            TrackerEvent::Started { source } => {
                self.status = format!("Detector {} running", source);
            }

            TrackerEvent::Gesture(label) => {
                self.gesture = label;
                self.apply(SceneEvent::from(label), label.as_str());
            }

            // The held pose keeps steering through frames that drop the hand.
            TrackerEvent::Frame { pose, tracking, .. } => {
                self.tracking = tracking;
                self.scene.set_hand(pose, tracking);
            }

            TrackerEvent::Stopped { reason } => {
                self.tracking = false;
                self.scene.set_hand(None, false);
                if self.gesture != GestureLabel::None {
                    self.gesture = GestureLabel::None;
                    self.apply(SceneEvent::Release, "detector stopped");
                }
                self.detector_unavailable(&reason);
            }
        }
    }

    /// Keyboard or mouse control from the window.
    pub fn handle_control(&mut self, event: SceneEvent) {
        self.apply(event, "key");
    }

    /// Show the keyboard-fallback notice, once per run.
    pub fn detector_unavailable(&mut self, reason: &str) {
        if self.notified { return; }
        self.notified = true;
        warn!(%reason, "hand detector unavailable, keyboard control only");
        self.status = format!("No hand detector ({}), keyboard only", reason);
    }

    fn apply(&mut self, event: SceneEvent, origin: &str) {
        match self.scene.apply(event) {
            Transition::Unchanged => debug!(?event, origin, "event had no effect"),
            Transition::Changed { from, to } => {
                info!(%from, %to, origin, "display state");
                self.status = format!("{} -> {}  ({})", from, to, origin);
            }
            Transition::SelectionMoved(i) => {
                self.status = format!("Image {} of {}", i + 1, self.scene.orbit().len());
            }
            Transition::Rezoomed(i) => {
                self.status = format!("Zoomed image {}", i + 1);
            }
        }
    }

    /// Apply every pending tracker event.  Returns false once the tracking
    /// thread is gone.
    pub fn drain(&mut self, tracking: &TrackingHandle) -> bool {
        loop {
            match tracking.try_recv() {
                Ok(event) => self.handle_tracker_event(event),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => {
                    self.detector_unavailable("disconnected");
                    return false;
                }
            }
        }
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, dt: f32) {
        self.scene.tick(dt);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// This is the entry point called from `main.rs`.  It starts the chosen
/// detector on its own thread, opens the visualizer, and drives the
/// event/render loop at ~60 fps.
pub fn run(cfg: AppConfig) -> Result<(), ViewerError> {
    let mut app = AppState::new(&cfg)?;

    // ── Detector thread ───────────────────────────────────────────────────
    let mut tracking = match cfg.detector {
        DetectorKind::None => {
            app.detector_unavailable("disabled");
            None
        }
        DetectorKind::Stdin => Some(spawn_tracking(JsonLinesDetector::stdin(), cfg.classifier)),
        DetectorKind::Demo  => Some(spawn_tracking(ScriptedDetector::demo(), cfg.classifier)),
    };

    let mut vis = Visualizer::new()?;
    let mut controls = Vec::new();
    let mut last = Instant::now();

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        // 1. Window input
        controls.clear();
        if !vis.poll_input(&mut controls) { break; }

        // 2. Detector events, before the tick that reads them
        if let Some(handle) = &tracking {
            if !app.drain(handle) {
                tracking = None;
            }
        }
        for &event in &controls {
            app.handle_control(event);
        }

        // 3. Per-frame logic
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32().min(MAX_DT);
        last = now;
        app.tick(dt);

        // 4. Render
        vis.render(&app.scene().frame(), &app.status)?;
    }

    if let Some(handle) = tracking {
        handle.stop();
    }
    info!("window closed");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::{poses, DetectorSample, HandPose, Landmark};
    use std::time::Duration;
    use tree_morph::DisplayState;

    const DT: f32 = 1.0 / 60.0;

    fn make_app() -> AppState {
        let cfg = AppConfig {
            tree: TreeConfig { particle_count: 50, ..TreeConfig::default() },
            seed: Some(9),
            ..AppConfig::default()
        };
        AppState::new(&cfg).unwrap()
    }

    fn run_ticks(app: &mut AppState, n: usize) {
        for _ in 0..n { app.tick(DT); }
    }

    /// Drain until the detector thread reports it stopped.
    fn drain_all(app: &mut AppState, handle: &TrackingHandle) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            match handle.receiver().recv_timeout(Duration::from_millis(50)) {
                Ok(e) => {
                    let done = matches!(e, TrackerEvent::Stopped { .. });
                    app.handle_tracker_event(e);
                    if done { return; }
                }
                Err(_) => continue,
            }
        }
    }

    #[test]
    fn open_gesture_explodes() {
        let mut app = make_app();
        app.handle_tracker_event(TrackerEvent::Gesture(GestureLabel::Open));
        run_ticks(&mut app, 5);
        assert_eq!(app.scene().state(), DisplayState::Exploded);
        assert!(app.scene().progress() < 1.0);
        assert!(app.status.contains("exploded"));
    }

    #[test]
    fn keyboard_controls_match_gestures() {
        let mut app = make_app();
        app.handle_control(SceneEvent::Explode);
        run_ticks(&mut app, 200);
        app.handle_control(SceneEvent::Zoom);
        assert_eq!(app.scene().state(), DisplayState::Zoomed);
        app.handle_control(SceneEvent::CloseOverlay);
        assert_eq!(app.scene().state(), DisplayState::Exploded);
        app.handle_control(SceneEvent::Converge);
        assert_eq!(app.scene().state(), DisplayState::Tree);
    }

    #[test]
    fn frame_event_feeds_hand_rotation() {
        let mut app = make_app();
        let pose = HandPose { rotation: 0.0, position: Landmark::new(1.0, 0.5) };
        app.handle_tracker_event(TrackerEvent::Frame {
            raw: GestureLabel::None,
            pose: Some(pose),
            hand_visible: true,
            tracking: true,
        });
        assert!(app.is_tracking());
        run_ticks(&mut app, 10);
        assert!(app.scene().rotation().target() < 0.0);
    }

    #[test]
    fn dropped_hand_frame_keeps_hand_target() {
        let mut app = make_app();
        let pose = HandPose { rotation: 0.0, position: Landmark::new(1.0, 0.5) };
        for hand_visible in [true, false, false] {
            app.handle_tracker_event(TrackerEvent::Frame {
                raw: GestureLabel::None,
                pose: Some(pose),
                hand_visible,
                tracking: true,
            });
            run_ticks(&mut app, 1);
        }
        // Still the hand's angle, not drifting with auto-rotate.
        let expected = -std::f32::consts::FRAC_PI_2;
        assert!((app.scene().rotation().target() - expected).abs() < 1e-6);
    }

    #[test]
    fn stop_releases_zoom_and_notifies_once() {
        let mut app = make_app();
        app.handle_tracker_event(TrackerEvent::Gesture(GestureLabel::Open));
        run_ticks(&mut app, 200);
        app.handle_tracker_event(TrackerEvent::Gesture(GestureLabel::Ok));
        assert_eq!(app.scene().state(), DisplayState::Zoomed);

        app.handle_tracker_event(TrackerEvent::Stopped { reason: "end of stream".into() });
        assert_eq!(app.scene().state(), DisplayState::Exploded);
        assert!(app.status.contains("end of stream"));

        app.status = "later".into();
        app.detector_unavailable("again");
        assert_eq!(app.status, "later");
    }

    #[test]
    fn scripted_detector_drives_scene() {
        let mut app = make_app();
        let script = ScriptedDetector::default()
            .hold(DetectorSample::hand(poses::open_hand()), 8);
        let handle = spawn_tracking(script, ClassifierConfig::default());
        drain_all(&mut app, &handle);
        run_ticks(&mut app, 3);
        assert_eq!(app.scene().state(), DisplayState::Exploded);
        // End of script releases the held gesture but keeps the state.
        assert_eq!(app.gesture(), GestureLabel::None);
        assert!(app.status.contains("end of stream"));
    }

    #[test]
    fn drain_reports_disconnect() {
        let mut app = make_app();
        let handle = spawn_tracking(ScriptedDetector::default(), ClassifierConfig::default());
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut alive = true;
        while alive && Instant::now() < deadline {
            alive = app.drain(&handle);
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!alive);
        assert!(app.status.contains("No hand detector"));
    }
}
