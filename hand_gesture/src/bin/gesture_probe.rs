//! gesture_probe: print raw and smoothed gestures for detector output.
//!
//! Pipe a landmark detector into stdin (one JSON object per line, see
//! [`hand_gesture::DetectorSample`]) to check the thresholds against a live
//! hand without opening the viewer.

use std::io::{self, BufRead};

use hand_gesture::{DetectorSample, FingerFlags, HandTracker};
use tracing::warn;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hand_gesture=info".into()),
        )
        .init();

    println!("frame  hand  T I M R P  raw   smoothed");
    let mut tracker = HandTracker::default();

    for (n, line) in io::stdin().lock().lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() { continue; }

        let sample = match DetectorSample::parse_line(&line) {
            Ok(s) => s,
            Err(e) => {
                warn!(frame = n, error = %e, "malformed detector line");
                DetectorSample::no_hand()
            }
        };

        let frame = sample.landmarks.as_ref().filter(|_| sample.tracking);
        let flags = frame.map(FingerFlags::from_frame).unwrap_or_default();
        let step = tracker.process(frame);
        let bit = |b: bool| if b { '1' } else { '.' };

        println!(
            "{:>5}  {:<4}  {} {} {} {} {}  {:<5} {}",
            n,
            if step.hand_visible { "yes" } else { "no" },
            bit(flags.thumb), bit(flags.index), bit(flags.middle),
            bit(flags.ring), bit(flags.pinky),
            step.raw,
            match step.change {
                Some(label) => format!("→ {}", label),
                None        => tracker.gesture().to_string(),
            },
        );
    }
}
