//! Simulated camera and hand model driven by the mouse.
//!
//! The visualizer forwards every mouse move as a [`SimInput`].  [`SimCamera`]
//! turns the latest one into a "frame", and [`SimHandModel`] turns a frame
//! into a hand: index fingertip under the cursor, thumb pulled in close while
//! the left button is held.  The real tracking controller runs unchanged on
//! top, so the whole lifecycle (linking, handshake, searching, tracking) is
//! exercised without hardware.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use particle_field::tracking::Result;
use particle_field::{CaptureDevice, CaptureError, FrameStream, HandLandmarks, HandTracker, Landmark};

/// Thumb offset from the fingertip, per normalized axis.
const THUMB_OPEN:  f32 = 0.25;
const THUMB_PINCH: f32 = 0.02;

/// Raw input forwarded from the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Cursor inside the window, normalized to `0.0..=1.0`.
    Pointer { x: f32, y: f32, pressed: bool },
    /// Cursor left the window.
    Left,
}

/// One simulated camera image: the hand in view, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimFrame {
    pub hand: Option<SimHand>,
}

/// Where the simulated hand sits in the image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimHand {
    /// Image-space position.  A front camera sees the scene flipped, so this
    /// is `1 - x` of the cursor.
    pub x:       f32,
    pub y:       f32,
    pub pressed: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// SimCamera
// ════════════════════════════════════════════════════════════════════════════

/// Capture device reading the visualizer's mouse channel.
#[derive(Clone)]
pub struct SimCamera {
    inputs: Arc<Mutex<Receiver<SimInput>>>,
}

impl SimCamera {
    pub fn new(inputs: Receiver<SimInput>) -> Self {
        SimCamera { inputs: Arc::new(Mutex::new(inputs)) }
    }
}

pub struct SimStream {
    inputs: Arc<Mutex<Receiver<SimInput>>>,
    latest: Option<SimFrame>,
}

impl CaptureDevice for SimCamera {
    type Frame = SimFrame;
    type Stream = SimStream;

    fn acquire(&mut self) -> Result<SimStream, CaptureError> {
        debug!("simulated camera acquired");
        Ok(SimStream { inputs: Arc::clone(&self.inputs), latest: None })
    }
}

impl FrameStream for SimStream {
    type Frame = SimFrame;

    /// Drain pending input and report the newest cursor state.  The last
    /// position keeps being reported while the mouse is still; once the
    /// cursor leaves, frames keep coming with no hand in them.  Nothing is
    /// reported before the first input.
    fn read_frame(&mut self) -> Option<SimFrame> {
        let inputs = self.inputs.lock();
        loop {
            match inputs.try_recv() {
                Ok(SimInput::Pointer { x, y, pressed }) => {
                    let hand = SimHand { x: 1.0 - x, y, pressed };
                    self.latest = Some(SimFrame { hand: Some(hand) });
                }
                Ok(SimInput::Left) => self.latest = Some(SimFrame { hand: None }),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        self.latest
    }

    fn release(self) {
        debug!("simulated camera released");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandModel
// ════════════════════════════════════════════════════════════════════════════

/// Hand tracker that reads a hand straight out of a [`SimFrame`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SimHandModel;

impl HandTracker<SimFrame> for SimHandModel {
    fn handshake(&mut self) -> Result<()> {
        Ok(())
    }

    fn detect(&mut self, frame: &SimFrame) -> Result<Option<HandLandmarks>> {
        Ok(frame.hand.as_ref().map(synthesize))
    }
}

/// A full 21-point hand with the index tip at the hand position.
fn synthesize(hand: &SimHand) -> HandLandmarks {
    let tip = Landmark { x: hand.x, y: hand.y };
    let offset = if hand.pressed { THUMB_PINCH } else { THUMB_OPEN };
    let thumb = Landmark { x: tip.x + offset, y: tip.y + offset };

    let mut hand = HandLandmarks::from_tips(tip, thumb);
    // Wrist and the remaining joints trail below the fingertip.
    let wrist = Landmark { x: tip.x, y: tip.y + 0.3 };
    for (i, point) in hand.points.iter_mut().enumerate() {
        if i == HandLandmarks::THUMB_TIP || i == HandLandmarks::INDEX_TIP {
            continue;
        }
        let t = i as f32 / (HandLandmarks::COUNT - 1) as f32;
        *point = Landmark {
            x: wrist.x + (tip.x - wrist.x) * t,
            y: wrist.y + (tip.y - wrist.y) * t,
        };
    }
    hand
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
