//! Majority-vote smoothing of per-frame gesture labels.
//!
//! Raw labels flicker on noisy landmark data.  [`GestureSmoother`] keeps the
//! last [`HISTORY_CAPACITY`] labels and only reports a change when the
//! majority label changes.  At 30 fps that is well under 200 ms of lag.
//!
//! ## Tie-break
//!
//! Counts are tallied in chronological order (oldest surviving entry
//! first) and a later label must have a *strictly* higher count to take
//! the lead.  On a tie the label whose first occurrence in the window is
//! earliest wins.

use crate::classifier::GestureLabel;

pub const HISTORY_CAPACITY: usize = 5;

// ════════════════════════════════════════════════════════════════════════════
// GestureHistory: fixed-capacity ring buffer
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct GestureHistory {
    slots:       [GestureLabel; HISTORY_CAPACITY],
    /// Next slot to write.
    write_index: usize,
    len:         usize,
}

impl GestureHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a label, evicting the oldest once full.
    pub fn push(&mut self, label: GestureLabel) {
        self.slots[self.write_index] = label;
        self.write_index = (self.write_index + 1) % HISTORY_CAPACITY;
        self.len = (self.len + 1).min(HISTORY_CAPACITY);
    }

    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Labels from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = GestureLabel> + '_ {
        let start = (self.write_index + HISTORY_CAPACITY - self.len) % HISTORY_CAPACITY;
        (0..self.len).map(move |i| self.slots[(start + i) % HISTORY_CAPACITY])
    }

    /// The most frequent label, earliest first occurrence winning ties.
    /// `None` only while the history is empty.
    pub fn majority(&self) -> Option<GestureLabel> {
        // At most four distinct labels; a tiny ordered tally beats a map.
        let mut tally: Vec<(GestureLabel, usize)> = Vec::with_capacity(GestureLabel::ALL.len());
        for label in self.iter() {
            match tally.iter_mut().find(|(l, _)| *l == label) {
                Some((_, n)) => *n += 1,
                None => tally.push((label, 1)),
            }
        }

        let mut best: Option<(GestureLabel, usize)> = None;
        for (label, n) in tally {
            if best.map_or(true, |(_, m)| n > m) {
                best = Some((label, n));
            }
        }
        best.map(|(label, _)| label)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSmoother
// ════════════════════════════════════════════════════════════════════════════

/// Debounces raw labels into gesture-change events.
#[derive(Clone, Debug, Default)]
pub struct GestureSmoother {
    history: GestureHistory,
    emitted: GestureLabel,
}

impl GestureSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw label.  Returns `Some(label)` only when the majority
    /// label differs from the last one reported.
    pub fn push(&mut self, raw: GestureLabel) -> Option<GestureLabel> {
        self.history.push(raw);
        let smoothed = self.history.majority()?;
        if smoothed == self.emitted {
            return None;
        }
        self.emitted = smoothed;
        Some(smoothed)
    }

    /// Last label reported by [`push`](Self::push) (initially `None`).
    pub fn current(&self) -> GestureLabel { self.emitted }

    pub fn history(&self) -> &GestureHistory { &self.history }

    /// Forget everything, e.g. after the detector stops tracking.
    pub fn reset(&mut self) {
        self.history.clear();
        self.emitted = GestureLabel::None;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use GestureLabel::{Fist, Open};
    const NONE: GestureLabel = GestureLabel::None;
    const OK: GestureLabel = GestureLabel::Ok;

    fn feed(s: &mut GestureSmoother, labels: &[GestureLabel]) -> Vec<GestureLabel> {
        labels.iter().filter_map(|&l| s.push(l)).collect()
    }

    #[test]
    fn history_capacity() {
        let mut h = GestureHistory::new();
        for _ in 0..12 { h.push(Fist); }
        assert_eq!(h.len(), HISTORY_CAPACITY);
    }

    #[test]
    fn history_iterates_oldest_first() {
        let mut h = GestureHistory::new();
        for l in [NONE, Fist, Open, OK, Fist, Open, Open] { h.push(l); }
        let seen: Vec<_> = h.iter().collect();
        assert_eq!(seen, vec![Open, OK, Fist, Open, Open]);
    }

    #[test]
    fn majority_of_five() {
        let mut s = GestureSmoother::new();
        let events = feed(&mut s, &[Fist, Fist, Open, Fist, Fist]);
        assert_eq!(events, vec![Fist]);
        assert_eq!(s.current(), Fist);
    }

    #[test]
    fn single_glitch_is_absorbed() {
        let mut s = GestureSmoother::new();
        feed(&mut s, &[Open, Open, Open, Open, Open]);
        assert!(feed(&mut s, &[Fist, Open, Open]).is_empty());
        assert_eq!(s.current(), Open);
    }

    #[test]
    fn tie_goes_to_earliest_first_occurrence() {
        let mut h = GestureHistory::new();
        for l in [Open, Fist, Fist, Open] { h.push(l); }
        assert_eq!(h.majority(), Some(Open));

        let mut h = GestureHistory::new();
        for l in [Fist, Open, Open, Fist, OK] { h.push(l); }
        assert_eq!(h.majority(), Some(Fist));
    }

    #[test]
    fn first_fist_emits_immediately() {
        let mut s = GestureSmoother::new();
        assert_eq!(s.push(Fist), Some(Fist));
    }

    #[test]
    fn reset_forgets() {
        let mut s = GestureSmoother::new();
        feed(&mut s, &[OK, OK, OK]);
        s.reset();
        assert!(s.history().is_empty());
        assert_eq!(s.current(), NONE);
    }

    fn label() -> impl Strategy<Value = GestureLabel> {
        prop_oneof![Just(NONE), Just(Fist), Just(Open), Just(OK)]
    }

    proptest! {
        #[test]
        fn never_reemits_same_label(labels in proptest::collection::vec(label(), 1..60)) {
            let mut s = GestureSmoother::new();
            let mut last = GestureLabel::None;
            for l in labels {
                if let Some(ev) = s.push(l) {
                    prop_assert_ne!(ev, last);
                    last = ev;
                }
            }
        }

        #[test]
        fn smoothed_label_is_in_window(labels in proptest::collection::vec(label(), 1..60)) {
            let mut s = GestureSmoother::new();
            for l in labels {
                s.push(l);
                let window: Vec<_> = s.history().iter().collect();
                prop_assert!(window.contains(&s.current()));
            }
        }
    }
}
