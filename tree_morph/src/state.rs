//! Display state machine: tree / exploded / zoomed.
//!
//! Events arrive from gestures, keys or clicks but are all expressed as one
//! closed [`SceneEvent`] set, so the machine never knows their origin.
//!
//! | Event | Effect |
//! |---|---|
//! | `Converge` (fist) | unzoom if zoomed, then → `Tree` |
//! | `Explode` (open) | unzoom if zoomed, then → `Exploded`; previous = `Exploded` |
//! | `Zoom` (ok) | if state or previous is `Exploded` and the front image is visible: previous = state, → `Zoomed` |
//! | `Release` (none) / `CloseOverlay` | if zoomed, → previous |
//! | `SelectPrevious` / `SelectNext` | exploded only; index clamped to the image range |

use std::fmt;

use hand_gesture::GestureLabel;
use tracing::debug;

/// Minimum opacity an image needs before it can be zoomed.
pub const ZOOM_MIN_OPACITY: f32 = 0.3;

// ════════════════════════════════════════════════════════════════════════════
// DisplayState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DisplayState {
    #[default]
    Tree,
    Exploded,
    Zoomed,
}

impl DisplayState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayState::Tree     => "tree",
            DisplayState::Exploded => "exploded",
            DisplayState::Zoomed   => "zoomed",
        }
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SceneEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    /// Fist, or the converge key.
    Converge,
    /// Open hand, or the explode key.
    Explode,
    /// OK sign, or the zoom key going down.
    Zoom,
    /// No gesture, or the zoom key coming up.
    Release,
    SelectPrevious,
    SelectNext,
    /// Click on the zoom overlay.
    CloseOverlay,
}

impl From<GestureLabel> for SceneEvent {
    fn from(label: GestureLabel) -> Self {
        match label {
            GestureLabel::Fist => SceneEvent::Converge,
            GestureLabel::Open => SceneEvent::Explode,
            GestureLabel::Ok   => SceneEvent::Zoom,
            GestureLabel::None => SceneEvent::Release,
        }
    }
}

/// What applying an event did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Changed { from: DisplayState, to: DisplayState },
    /// Selected image moved (exploded only).
    SelectionMoved(usize),
    /// Already zoomed; the overlay switched to another image.
    Rezoomed(usize),
}

// ════════════════════════════════════════════════════════════════════════════
// SlotVisibility: what the machine needs to know about the image orbit
// ════════════════════════════════════════════════════════════════════════════

pub trait SlotVisibility {
    fn slot_count(&self) -> usize;
    /// Slot currently facing the camera, if any.
    fn front_slot(&self) -> Option<usize>;
    fn slot_opacity(&self, index: usize) -> Option<f32>;
}

// ════════════════════════════════════════════════════════════════════════════
// SceneStateMachine
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct SceneStateMachine {
    state:    DisplayState,
    previous: DisplayState,
    selected: usize,
    /// Keyboard choice still swinging to the front.
    pending:  Option<usize>,
    zoomed:   Option<usize>,
}

impl SceneStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DisplayState { self.state }

    /// State to restore after zooming; only meaningful while zoomed.
    pub fn previous(&self) -> DisplayState { self.previous }

    pub fn selected_image(&self) -> usize { self.selected }

    /// Image shown in the zoom overlay.
    pub fn zoomed_image(&self) -> Option<usize> { self.zoomed }

    /// Record the camera-facing slot found by the orbit while exploded.
    /// A pending keyboard choice holds until its slot reaches the front.
    pub fn record_front(&mut self, index: usize) {
        match self.pending {
            Some(p) if p != index => return,
            Some(_) => self.pending = None,
            None => {}
        }
        self.selected = index;
    }

    /// Keyboard choice not yet at the front, if any.
    pub fn pending_selection(&self) -> Option<usize> { self.pending }

    /// Let the front slot drive the selection again (rotation taken over).
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    pub fn apply(&mut self, event: SceneEvent, slots: &impl SlotVisibility) -> Transition {
        let from = self.state;
        match event {
            SceneEvent::Converge => {
                self.pending = None;
                self.unzoom();
                self.state = DisplayState::Tree;
            }
            SceneEvent::Explode => {
                self.pending = None;
                self.unzoom();
                self.state = DisplayState::Exploded;
                self.previous = DisplayState::Exploded;
            }
            SceneEvent::Zoom => return self.zoom(slots),
            SceneEvent::Release | SceneEvent::CloseOverlay => {
                if self.state == DisplayState::Zoomed {
                    self.unzoom();
                    self.state = self.previous;
                }
            }
            SceneEvent::SelectPrevious | SceneEvent::SelectNext => {
                let count = slots.slot_count();
                if self.state != DisplayState::Exploded || count == 0 {
                    return Transition::Unchanged;
                }
                let next = match event {
                    SceneEvent::SelectPrevious => self.selected.saturating_sub(1),
                    _ => self.selected.saturating_add(1),
                }
                .min(count - 1);
                if next == self.selected {
                    return Transition::Unchanged;
                }
                self.selected = next;
                self.pending = Some(next);
                return Transition::SelectionMoved(next);
            }
        }

        if from == self.state {
            Transition::Unchanged
        } else {
            debug!(%from, to = %self.state, ?event, "display state changed");
            Transition::Changed { from, to: self.state }
        }
    }

    fn zoom(&mut self, slots: &impl SlotVisibility) -> Transition {
        let eligible = self.state == DisplayState::Exploded
            || self.previous == DisplayState::Exploded;
        if !eligible {
            return Transition::Unchanged;
        }

        let target = slots.front_slot().unwrap_or(self.selected);
        let opacity = slots.slot_opacity(target).unwrap_or(0.0);
        if opacity <= ZOOM_MIN_OPACITY {
            debug!(target, opacity, "zoom ignored: image not visible");
            return Transition::Unchanged;
        }

        if self.state == DisplayState::Zoomed {
            if self.zoomed == Some(target) {
                return Transition::Unchanged;
            }
            self.zoomed = Some(target);
            return Transition::Rezoomed(target);
        }

        let from = self.state;
        self.previous = from;
        self.pending = None;
        self.state = DisplayState::Zoomed;
        self.zoomed = Some(target);
        debug!(%from, image = target, "zoomed");
        Transition::Changed { from, to: DisplayState::Zoomed }
    }

    fn unzoom(&mut self) {
        if self.zoomed.take().is_some() {
            debug!("zoom overlay cleared");
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed orbit stand-in.
    struct Slots {
        opacity: Vec<f32>,
        front:   Option<usize>,
    }

    impl SlotVisibility for Slots {
        fn slot_count(&self) -> usize { self.opacity.len() }
        fn front_slot(&self) -> Option<usize> { self.front }
        fn slot_opacity(&self, i: usize) -> Option<f32> { self.opacity.get(i).copied() }
    }

    fn visible() -> Slots {
        Slots { opacity: vec![0.8; 4], front: Some(2) }
    }

    fn exploded() -> SceneStateMachine {
        let mut m = SceneStateMachine::new();
        m.apply(SceneEvent::Explode, &visible());
        m
    }

    #[test]
    fn starts_as_tree() {
        let m = SceneStateMachine::new();
        assert_eq!(m.state(), DisplayState::Tree);
        assert_eq!(m.zoomed_image(), None);
    }

    #[test]
    fn open_explodes_and_records_previous() {
        let mut m = SceneStateMachine::new();
        let t = m.apply(SceneEvent::Explode, &visible());
        assert_eq!(t, Transition::Changed { from: DisplayState::Tree, to: DisplayState::Exploded });
        assert_eq!(m.previous(), DisplayState::Exploded);
    }

    #[test]
    fn ok_zooms_front_image() {
        let mut m = exploded();
        let t = m.apply(SceneEvent::Zoom, &visible());
        assert_eq!(t, Transition::Changed { from: DisplayState::Exploded, to: DisplayState::Zoomed });
        assert_eq!(m.previous(), DisplayState::Exploded);
        assert_eq!(m.zoomed_image(), Some(2));
    }

    #[test]
    fn ok_on_faint_image_is_ignored() {
        let mut m = exploded();
        let faint = Slots { opacity: vec![0.3; 4], front: Some(0) };
        assert_eq!(m.apply(SceneEvent::Zoom, &faint), Transition::Unchanged);
        assert_eq!(m.state(), DisplayState::Exploded);
    }

    #[test]
    fn ok_falls_back_to_selected_image() {
        let mut m = exploded();
        m.record_front(3);
        let no_front = Slots { opacity: vec![0.0, 0.0, 0.0, 0.9], front: None };
        m.apply(SceneEvent::Zoom, &no_front);
        assert_eq!(m.zoomed_image(), Some(3));
    }

    #[test]
    fn ok_from_fresh_tree_is_ignored() {
        let mut m = SceneStateMachine::new();
        assert_eq!(m.apply(SceneEvent::Zoom, &visible()), Transition::Unchanged);
        assert_eq!(m.state(), DisplayState::Tree);
    }

    #[test]
    fn none_restores_previous() {
        let mut m = exploded();
        m.apply(SceneEvent::Zoom, &visible());
        let t = m.apply(SceneEvent::Release, &visible());
        assert_eq!(t, Transition::Changed { from: DisplayState::Zoomed, to: DisplayState::Exploded });
        assert_eq!(m.zoomed_image(), None);
    }

    #[test]
    fn none_when_not_zoomed_is_idle() {
        let mut m = exploded();
        assert_eq!(m.apply(SceneEvent::Release, &visible()), Transition::Unchanged);
        assert_eq!(m.state(), DisplayState::Exploded);
    }

    #[test]
    fn fist_while_zoomed_clears_overlay_then_tree() {
        let mut m = exploded();
        m.apply(SceneEvent::Zoom, &visible());
        m.apply(SceneEvent::Converge, &visible());
        assert_eq!(m.state(), DisplayState::Tree);
        assert_eq!(m.zoomed_image(), None);
    }

    #[test]
    fn open_while_zoomed_stays_exploded() {
        let mut m = exploded();
        m.apply(SceneEvent::Zoom, &visible());
        m.apply(SceneEvent::Explode, &visible());
        assert_eq!(m.state(), DisplayState::Exploded);
        assert_eq!(m.zoomed_image(), None);
    }

    #[test]
    fn close_overlay_acts_like_release() {
        let mut m = exploded();
        m.apply(SceneEvent::Zoom, &visible());
        m.apply(SceneEvent::CloseOverlay, &visible());
        assert_eq!(m.state(), DisplayState::Exploded);
    }

    #[test]
    fn zoom_again_switches_image() {
        let mut m = exploded();
        m.apply(SceneEvent::Zoom, &visible());
        let other = Slots { opacity: vec![0.8; 4], front: Some(1) };
        assert_eq!(m.apply(SceneEvent::Zoom, &other), Transition::Rezoomed(1));
        assert_eq!(m.previous(), DisplayState::Exploded);
        assert_eq!(m.apply(SceneEvent::Zoom, &other), Transition::Unchanged);
    }

    #[test]
    fn select_previous_clamps_at_zero() {
        let mut m = exploded();
        assert_eq!(m.apply(SceneEvent::SelectPrevious, &visible()), Transition::Unchanged);
        assert_eq!(m.selected_image(), 0);
    }

    #[test]
    fn select_next_clamps_at_last() {
        let mut m = exploded();
        for _ in 0..10 { m.apply(SceneEvent::SelectNext, &visible()); }
        assert_eq!(m.selected_image(), 3);
    }

    #[test]
    fn keyboard_selection_holds_until_front() {
        let mut m = exploded();
        m.record_front(1);
        m.apply(SceneEvent::SelectNext, &visible());
        // Slot 1 is still in front while the tree turns.
        m.record_front(1);
        assert_eq!(m.selected_image(), 2);
        m.apply(SceneEvent::SelectNext, &visible());
        assert_eq!(m.selected_image(), 3);
        assert_eq!(m.pending_selection(), Some(3));

        m.record_front(3);
        assert_eq!(m.pending_selection(), None);
        m.record_front(0);
        assert_eq!(m.selected_image(), 0);
    }

    #[test]
    fn cancelled_selection_follows_front() {
        let mut m = exploded();
        m.apply(SceneEvent::SelectNext, &visible());
        m.cancel_pending();
        m.record_front(2);
        assert_eq!(m.selected_image(), 2);
    }

    #[test]
    fn select_ignored_outside_exploded() {
        let mut m = SceneStateMachine::new();
        assert_eq!(m.apply(SceneEvent::SelectNext, &visible()), Transition::Unchanged);
        assert_eq!(m.selected_image(), 0);
    }

    #[test]
    fn select_with_no_images() {
        let mut m = exploded();
        let none = Slots { opacity: vec![], front: None };
        assert_eq!(m.apply(SceneEvent::SelectNext, &none), Transition::Unchanged);
    }

    #[test]
    fn gesture_mapping() {
        assert_eq!(SceneEvent::from(GestureLabel::Fist), SceneEvent::Converge);
        assert_eq!(SceneEvent::from(GestureLabel::Open), SceneEvent::Explode);
        assert_eq!(SceneEvent::from(GestureLabel::Ok),   SceneEvent::Zoom);
        assert_eq!(SceneEvent::from(GestureLabel::None), SceneEvent::Release);
    }
}
