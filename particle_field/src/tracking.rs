//! Hand-tracking lifecycle: acquisition, handshake, per-frame submission, and
//! cancellation.
//!
//! # Lifecycle
//!
//! ```text
//!  set_active(true)
//!      │  status = linking
//!      ▼
//!  CaptureDevice::acquire      ── Err ──► status = error(msg), inactive
//!      │  (stale token? release stream, exit quietly)
//!      ▼  status = handshaking
//!  HandTracker::handshake      ── Err ──► status = error(msg), inactive
//!      │  (stale token? release stream, exit quietly)
//!      ▼  status = searching
//!  loop while token is current:
//!      read_frame → detect → publish pointer → GestureRecognizer::observe
//!      │
//!      ▼
//!  FrameStream::release
//! ```
//!
//! Every activation runs on its own worker thread carrying a generation
//! token.  `set_active(false)` bumps the generation, which stops the loop
//! after the current frame and turns any acquisition still in flight into a
//! zombie that is released the moment it completes.  Status and pointer writes
//! are committed only while the writer's token is current, so nothing a
//! cancelled worker does can surface after deactivation.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::gesture::GestureRecognizer;
use crate::pointer::{PointerMode, PointerSample, SharedPointer};
use crate::portal::{PortalTicket, PortalTickets};

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

/// The capture device could not be opened.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera access denied")]
    PermissionDenied,

    #[error("capture device unavailable: {0}")]
    Unavailable(String),
}

/// The hand tracker failed to start or to process a frame.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("hand model handshake failed: {0}")]
    Handshake(String),

    #[error("frame submission failed: {0}")]
    Submission(String),
}

pub type Result<T, E = TrackingError> = std::result::Result<T, E>;

// ════════════════════════════════════════════════════════════════════════════
// Landmarks
// ════════════════════════════════════════════════════════════════════════════

/// A normalized (`0.0..=1.0`) image-space point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

/// One detected hand in the tracker's fixed landmark schema.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandLandmarks {
    pub points: Vec<Landmark>,
}

impl HandLandmarks {
    /// Landmarks per hand.
    pub const COUNT:     usize = 21;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_TIP: usize = 8;

    /// A full schema with only the thumb and index tips placed.
    pub fn from_tips(index_tip: Landmark, thumb_tip: Landmark) -> Self {
        let mut points = vec![Landmark::default(); Self::COUNT];
        points[Self::THUMB_TIP] = thumb_tip;
        points[Self::INDEX_TIP] = index_tip;
        HandLandmarks { points }
    }

    pub fn index_tip(&self) -> Option<Landmark> { self.points.get(Self::INDEX_TIP).copied() }
    pub fn thumb_tip(&self) -> Option<Landmark> { self.points.get(Self::THUMB_TIP).copied() }

    /// Project onto a `width × height` surface.  `mirror` flips x, which is
    /// what a front-facing camera needs for the pointer to follow the hand.
    ///
    /// Returns `None` when the landmark set is too short to hold both tips.
    pub fn to_pointer(&self, width: f32, height: f32, mirror: bool) -> Option<PointerSample> {
        let project = |lm: Landmark| {
            let nx = if mirror { 1.0 - lm.x } else { lm.x };
            (nx * width, lm.y * height)
        };
        let tip   = project(self.index_tip()?);
        let thumb = project(self.thumb_tip()?);
        Some(PointerSample::at(tip.0, tip.1, PointerMode::from_tips(tip, thumb)))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Collaborators
// ════════════════════════════════════════════════════════════════════════════

/// A live source of frames obtained from a [`CaptureDevice`].
pub trait FrameStream {
    type Frame;

    /// The next frame, or `None` if none is ready yet.
    fn read_frame(&mut self) -> Option<Self::Frame>;

    /// Stop the stream and give the device back.
    fn release(self);
}

/// Opens a frame stream.  `acquire` may block for a long time (permission
/// prompts, device warm-up); it runs on the worker thread, never the frame loop.
pub trait CaptureDevice: Clone + Send + 'static {
    type Frame;
    type Stream: FrameStream<Frame = Self::Frame>;

    fn acquire(&mut self) -> Result<Self::Stream, CaptureError>;
}

/// Turns frames into at most one hand.
pub trait HandTracker<F>: Clone + Send + 'static {
    /// Load the model.  May block.
    fn handshake(&mut self) -> Result<()>;

    fn detect(&mut self, frame: &F) -> Result<Option<HandLandmarks>>;
}

// ════════════════════════════════════════════════════════════════════════════
// Status
// ════════════════════════════════════════════════════════════════════════════

/// Human-readable lifecycle state shown by the UI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Linking,
    Handshaking,
    Searching,
    TrackingOpen,
    TrackingPinch,
    PortalOpening,
    Error(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle          => f.write_str("idle"),
            Status::Linking       => f.write_str("linking"),
            Status::Handshaking   => f.write_str("handshaking"),
            Status::Searching     => f.write_str("searching"),
            Status::TrackingOpen  => f.write_str("tracking-open"),
            Status::TrackingPinch => f.write_str("tracking-pinch"),
            Status::PortalOpening => f.write_str("portal-opening"),
            Status::Error(msg)    => write!(f, "error: {}", msg),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Shared state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
pub struct TrackingOptions {
    /// Flip landmark x (front-facing camera).
    pub mirror:        bool,
    /// Target spacing between two frame submissions.
    pub poll_interval: Duration,
    /// Surface size landmarks are projected into until the first
    /// `set_bounds`.
    pub bounds:        (f32, f32),
}

impl Default for TrackingOptions {
    fn default() -> Self {
        TrackingOptions {
            mirror:        true,
            poll_interval: Duration::from_millis(16),
            bounds:        (1000.0, 700.0),
        }
    }
}

struct Shared {
    pointer:    SharedPointer,
    status:     RwLock<Status>,
    tickets:    Mutex<PortalTickets>,
    generation: AtomicU64,
    active:     AtomicBool,
    epoch:      Instant,
}

impl Shared {
    fn new(bounds: (f32, f32)) -> Self {
        let pointer = SharedPointer::new();
        pointer.set_bounds(bounds.0, bounds.1);
        Shared {
            pointer,
            status:     RwLock::new(Status::Idle),
            tickets:    Mutex::new(PortalTickets::new()),
            generation: AtomicU64::new(0),
            active:     AtomicBool::new(false),
            epoch:      Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 { self.epoch.elapsed().as_millis() as u64 }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    /// Apply `f` to the status only if `generation` is still current.
    /// Deactivation bumps the generation under the same lock, so a stale
    /// worker can never overwrite what it set.
    fn commit(&self, generation: u64, f: impl FnOnce(&mut Status)) -> bool {
        let mut status = self.status.write();
        if !self.is_current(generation) {
            return false;
        }
        f(&mut status);
        true
    }

    fn fail(&self, generation: u64, message: String) {
        let committed = self.commit(generation, |status| {
            *status = Status::Error(message.clone());
            self.pointer.clear_active();
            self.active.store(false, Ordering::Release);
        });
        if committed {
            warn!(%message, "hand tracking stopped");
        }
    }

    /// Publish one tracker result and feed the recognizer.
    fn on_hand(
        &self,
        generation: u64,
        hand:       Option<HandLandmarks>,
        recognizer: &mut GestureRecognizer,
        options:    &TrackingOptions,
    ) {
        let now = self.now_ms();
        let (w, h) = self.pointer.bounds();
        let sample = hand.and_then(|hand| hand.to_pointer(w, h, options.mirror));
        let detected = match sample {
            Some(s) => recognizer.observe(s.y, now),
            None    => false,
        };

        self.commit(generation, |status| {
            match sample {
                Some(s) => self.pointer.publish(s),
                None    => self.pointer.clear_active(),
            }

            let mut tickets = self.tickets.lock();
            tickets.prune(now);
            if detected {
                let ticket = tickets.open(now);
                info!(ticket = ticket.id, "oscillation detected, portal opening");
            }

            *status = if tickets.any_alive(now) {
                Status::PortalOpening
            } else {
                match sample {
                    Some(s) if s.mode.is_pinch() => Status::TrackingPinch,
                    Some(_)                      => Status::TrackingOpen,
                    None                         => Status::Searching,
                }
            };
        });
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TrackingController
// ════════════════════════════════════════════════════════════════════════════

/// Owns the tracking lifecycle and exposes its outputs to the frame loop.
pub struct TrackingController<C, T> {
    device:  C,
    tracker: T,
    options: TrackingOptions,
    shared:  Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl<C, T> TrackingController<C, T>
where
    C: CaptureDevice,
    T: HandTracker<C::Frame>,
{
    pub fn new(device: C, tracker: T, options: TrackingOptions) -> Self {
        TrackingController {
            device,
            tracker,
            options,
            shared: Arc::new(Shared::new(options.bounds)),
            workers: Vec::new(),
        }
    }

    /// Start or stop the whole subsystem.
    ///
    /// Starting is a full restart from acquisition.  Stopping never blocks:
    /// the worker notices on its own and releases whatever it holds.
    pub fn set_active(&mut self, on: bool) {
        self.workers.retain(|w| !w.is_finished());
        if on { self.activate() } else { self.deactivate() }
    }

    fn activate(&mut self) {
        if self.shared.active.swap(true, Ordering::AcqRel) {
            debug!("tracking already active");
            return;
        }

        let generation = {
            let mut status = self.shared.status.write();
            let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
            *status = Status::Linking;
            generation
        };
        info!(generation, "hand tracking starting");

        let device  = self.device.clone();
        let tracker = self.tracker.clone();
        let shared  = Arc::clone(&self.shared);
        let options = self.options;

        let spawned = thread::Builder::new()
            .name(format!("hand-tracking-{}", generation))
            .spawn(move || run_worker(device, tracker, shared, generation, options));

        match spawned {
            Ok(handle) => self.workers.push(handle),
            Err(e)     => self.shared.fail(generation, format!("could not start tracking: {}", e)),
        }
    }

    fn deactivate(&mut self) {
        let mut status = self.shared.status.write();
        self.shared.generation.fetch_add(1, Ordering::AcqRel);
        self.shared.active.store(false, Ordering::Release);
        self.shared.pointer.clear_active();
        if *status != Status::Idle {
            info!("hand tracking stopped");
        }
        *status = Status::Idle;
    }

    pub fn is_active(&self) -> bool { self.shared.active.load(Ordering::Acquire) }

    pub fn status(&self) -> Status { self.shared.status.read().clone() }

    /// Latest pointer snapshot.
    pub fn pointer(&self) -> PointerSample { self.shared.pointer.snapshot() }

    /// Surface size that landmarks are projected into.
    pub fn set_bounds(&self, width: f32, height: f32) {
        self.shared.pointer.set_bounds(width, height);
    }

    /// Alive portal tickets; expired ones are dropped on the way.
    pub fn live_tickets(&self) -> Vec<PortalTicket> {
        let now = self.shared.now_ms();
        self.shared.tickets.lock().live(now).to_vec()
    }

    /// Milliseconds since the controller was created, on the same clock the
    /// tickets use.
    pub fn now_ms(&self) -> u64 { self.shared.now_ms() }

    /// Wait for every worker thread to exit.  Call after `set_active(false)`;
    /// a current worker only exits once deactivated.
    pub fn join_workers(&mut self) {
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("hand tracking worker panicked");
            }
        }
    }
}

impl<C, T> Drop for TrackingController<C, T> {
    fn drop(&mut self) {
        // Detach: workers see the stale token and release their streams.
        self.shared.generation.fetch_add(1, Ordering::AcqRel);
        self.shared.active.store(false, Ordering::Release);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Worker
// ════════════════════════════════════════════════════════════════════════════

fn run_worker<C, T>(
    mut device:  C,
    mut tracker: T,
    shared:      Arc<Shared>,
    generation:  u64,
    options:     TrackingOptions,
)
where
    C: CaptureDevice,
    T: HandTracker<C::Frame>,
{
    let stream = match device.acquire() {
        Ok(stream) => stream,
        Err(e) => {
            shared.fail(generation, e.to_string());
            return;
        }
    };
    if !shared.is_current(generation) {
        debug!(generation, "stream acquired after deactivation, releasing");
        stream.release();
        return;
    }

    shared.commit(generation, |s| *s = Status::Handshaking);
    if let Err(e) = tracker.handshake() {
        shared.fail(generation, e.to_string());
        stream.release();
        return;
    }
    if !shared.is_current(generation) {
        debug!(generation, "handshake finished after deactivation, releasing");
        stream.release();
        return;
    }

    shared.commit(generation, |s| *s = Status::Searching);
    info!(generation, "hand tracking live");

    let mut stream = stream;
    let mut recognizer = GestureRecognizer::new();

    while shared.is_current(generation) {
        let started = Instant::now();

        if let Some(frame) = stream.read_frame() {
            match tracker.detect(&frame) {
                Ok(hand) => shared.on_hand(generation, hand, &mut recognizer, &options),
                Err(e)   => debug!(error = %e, "dropping frame"),
            }
        }

        let spent = started.elapsed();
        if spent < options.poll_interval {
            thread::sleep(options.poll_interval - spent);
        }
    }

    stream.release();
    debug!(generation, "hand tracking worker exited");
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
