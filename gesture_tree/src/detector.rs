//! Hand detectors and the tracking thread.
//!
//! The public interface is [`TrackerEvent`] delivered over a `mpsc` channel.
//! The render loop doesn't need to know whether landmarks came from a camera
//! pipeline on stdin or from the scripted demo; classification and smoothing
//! both happen on the tracking thread before the event is sent.

use std::io::{self, BufRead, BufReader, Stdin};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hand_gesture::{poses, ClassifierConfig, DetectorSample, GestureLabel, HandPose, HandTracker};
use thiserror::Error;
use tracing::{debug, info, warn};

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("detector unavailable: {0}")]
    Unavailable(String),
    #[error("detector read failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed detector line {line}: {source}")]
    Json {
        line:   usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("detector line {line} is not UTF-8: {source}")]
    Encoding {
        line:   usize,
        #[source]
        source: std::str::Utf8Error,
    },
}

// ════════════════════════════════════════════════════════════════════════════
// TrackerEvent
// ════════════════════════════════════════════════════════════════════════════

/// What the tracking thread tells the render loop.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackerEvent {
    /// The source opened and frames are about to flow.
    Started { source: &'static str },
    /// The smoothed gesture changed.
    Gesture(GestureLabel),
    /// Sent once per detector frame.  `pose` is the last known hand pose,
    /// held across frames without a hand until tracking is lost.
    Frame {
        raw:          GestureLabel,
        pose:         Option<HandPose>,
        hand_visible: bool,
        tracking:     bool,
    },
    /// The source failed to open, errored or ran out of frames.
    Stopped { reason: String },
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait: unified interface for stdin and scripted input
// ════════════════════════════════════════════════════════════════════════════

/// Anything that produces one [`DetectorSample`] per camera frame.
pub trait LandmarkSource: Send + 'static {
    fn name(&self) -> &'static str;

    fn open(&mut self) -> Result<(), DetectorError> {
        Ok(())
    }

    /// Blocks until the next frame.  `Ok(None)` means end of stream.
    fn next_sample(&mut self) -> Result<Option<DetectorSample>, DetectorError>;
}

// ════════════════════════════════════════════════════════════════════════════
// JsonLinesDetector: one JSON object per line
// ════════════════════════════════════════════════════════════════════════════

/// Reads the line-oriented wire format from any buffered reader.
///
/// Blank lines are skipped.  A line that fails to parse is logged and
/// counted as a frame without a hand.
pub struct JsonLinesDetector<R> {
    reader: R,
    line:   usize,
    buf:    Vec<u8>,
}

impl<R: BufRead + Send + 'static> JsonLinesDetector<R> {
    pub fn new(reader: R) -> Self {
        JsonLinesDetector { reader, line: 0, buf: Vec::new() }
    }

    fn parse(&self, text: &str) -> Result<DetectorSample, DetectorError> {
        DetectorSample::parse_line(text)
            .map_err(|source| DetectorError::Json { line: self.line, source })
    }

    /// Decode and parse the line in `buf`.  `Ok(None)` for a blank line.
    fn decode(&self) -> Result<Option<DetectorSample>, DetectorError> {
        let text = std::str::from_utf8(&self.buf)
            .map_err(|source| DetectorError::Encoding { line: self.line, source })?
            .trim();
        if text.is_empty() {
            return Ok(None);
        }
        self.parse(text).map(Some)
    }
}

impl JsonLinesDetector<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }
}

impl<R: BufRead + Send + 'static> LandmarkSource for JsonLinesDetector<R> {
    fn name(&self) -> &'static str { "json-lines" }

    fn next_sample(&mut self) -> Result<Option<DetectorSample>, DetectorError> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            return match self.decode() {
                Ok(None) => continue,
                Ok(Some(sample)) => Ok(Some(sample)),
                Err(e) => {
                    warn!(error = %e, "treating malformed detector line as no hand");
                    Ok(Some(DetectorSample::no_hand()))
                }
            };
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedDetector: canned frames (demo mode and tests)
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct ScriptedDetector {
    frames:   Vec<DetectorSample>,
    cursor:   usize,
    interval: Duration,
    looping:  bool,
}

impl ScriptedDetector {
    pub fn new(frames: Vec<DetectorSample>) -> Self {
        ScriptedDetector { frames, ..Self::default() }
    }

    /// Append `sample` repeated `count` times.
    pub fn hold(mut self, sample: DetectorSample, count: usize) -> Self {
        self.frames.extend(std::iter::repeat(sample).take(count));
        self
    }

    /// Sleep between frames, roughly a camera's frame period.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Restart from the first frame instead of ending.
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn len(&self) -> usize { self.frames.len() }

    pub fn is_empty(&self) -> bool { self.frames.is_empty() }

    /// A 30 fps loop: open hand sweeping left to right, OK sign, release,
    /// then a fist held while the tree reassembles.
    pub fn demo() -> Self {
        let mut script = ScriptedDetector::new(Vec::new())
            .with_interval(Duration::from_millis(33))
            .looping()
            .hold(DetectorSample::no_hand(), 45);

        let open = poses::open_hand();
        for step in 0..120 {
            let dx = (step as f32 / 119.0 - 0.5) * 0.4;
            script = script.hold(DetectorSample::hand(open.translated(dx, 0.0)), 1);
        }
        script
            .hold(DetectorSample::hand(poses::ok_sign()), 75)
            .hold(DetectorSample::no_hand(), 30)
            .hold(DetectorSample::hand(poses::fist()), 120)
            .hold(DetectorSample { tracking: false, landmarks: None }, 45)
    }
}

impl LandmarkSource for ScriptedDetector {
    fn name(&self) -> &'static str { "scripted" }

    fn open(&mut self) -> Result<(), DetectorError> {
        if self.frames.is_empty() {
            return Err(DetectorError::Unavailable("empty script".into()));
        }
        Ok(())
    }

    fn next_sample(&mut self) -> Result<Option<DetectorSample>, DetectorError> {
        if self.cursor == self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return Ok(None);
            }
            self.cursor = 0;
        }
        if !self.interval.is_zero() {
            thread::sleep(self.interval);
        }
        let sample = self.frames[self.cursor].clone();
        self.cursor += 1;
        Ok(Some(sample))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tracking thread
// ════════════════════════════════════════════════════════════════════════════

/// Receiving end of a tracking thread.  Dropping it asks the thread to stop.
pub struct TrackingHandle {
    rx:   Receiver<TrackerEvent>,
    stop: Arc<AtomicBool>,
}

impl TrackingHandle {
    pub fn try_recv(&self) -> Result<TrackerEvent, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn receiver(&self) -> &Receiver<TrackerEvent> { &self.rx }

    /// Ask the thread to exit before its next frame.  Never joins: a source
    /// blocked on input is simply abandoned.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for TrackingHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawn `source` on its own thread with a fresh [`HandTracker`].
pub fn spawn_tracking<S: LandmarkSource>(source: S, config: ClassifierConfig) -> TrackingHandle {
    let (tx, rx) = mpsc::channel();
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    thread::spawn(move || run_source(source, HandTracker::new(config), &tx, &flag));
    TrackingHandle { rx, stop }
}

fn run_source<S: LandmarkSource>(
    mut source: S,
    mut tracker: HandTracker,
    tx: &Sender<TrackerEvent>,
    stop: &AtomicBool,
) {
    let name = source.name();
    if let Err(e) = source.open() {
        warn!(source = name, error = %e, "detector failed to start");
        let _ = tx.send(TrackerEvent::Stopped { reason: e.to_string() });
        return;
    }
    info!(source = name, "detector started");
    if tx.send(TrackerEvent::Started { source: name }).is_err() {
        return;
    }

    let reason = loop {
        if stop.load(Ordering::Relaxed) {
            debug!(source = name, "detector stop requested");
            return;
        }
        let sample = match source.next_sample() {
            Ok(Some(s)) => s,
            Ok(None) => break "end of stream".to_string(),
            Err(e) => {
                warn!(source = name, error = %e, "detector failed");
                break e.to_string();
            }
        };
        if !forward(&mut tracker, &sample, tx) {
            return;
        }
    };

    info!(source = name, %reason, "detector stopped");
    let _ = tx.send(TrackerEvent::Stopped { reason });
}

/// Classify one sample and send the resulting events.  Returns false once
/// the receiver is gone.
fn forward(tracker: &mut HandTracker, sample: &DetectorSample, tx: &Sender<TrackerEvent>) -> bool {
    let mut events = Vec::with_capacity(2);

    if sample.tracking {
        let step = tracker.process(sample.landmarks.as_ref());
        if let Some(label) = step.change {
            events.push(TrackerEvent::Gesture(label));
        }
        events.push(TrackerEvent::Frame {
            raw:          step.raw,
            pose:         step.pose,
            hand_visible: step.hand_visible,
            tracking:     true,
        });
    } else {
        // Lost tracking: forget the window and release any held gesture.
        let held = tracker.gesture();
        tracker.reset();
        if held != GestureLabel::None {
            events.push(TrackerEvent::Gesture(GestureLabel::None));
        }
        events.push(TrackerEvent::Frame {
            raw:          GestureLabel::None,
            pose:         None,
            hand_visible: false,
            tracking:     false,
        });
    }

    events.into_iter().all(|e| tx.send(e).is_ok())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
