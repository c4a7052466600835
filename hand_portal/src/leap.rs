//! LeapMotion hand source (feature = "leap").
//!
//! Requires the LeapC shared library installed.  The controller reports
//! fingertips in millimetres above the device; they are normalized into the
//! same image-space convention a front camera would produce, so the default
//! mirrored projection puts the pointer where the hand is.

use leaprs::{Connection, ConnectionConfig, Event};
use tracing::{debug, info};

use particle_field::tracking::Result;
use particle_field::{CaptureDevice, CaptureError, FrameStream, HandLandmarks, HandTracker, Landmark};

/// Interaction box the fingertip is normalized against, in mm.
const X_RANGE:  (f32, f32) = (-200.0, 200.0);
const Y_RANGE:  (f32, f32) = (100.0, 400.0);
const POLL_MS:  u32        = 100;

/// One tracking event: the first hand's index and thumb tips, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LeapFrame {
    pub tips: Option<([f32; 3], [f32; 3])>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LeapCamera;

pub struct LeapStream {
    connection: Connection,
}

impl CaptureDevice for LeapCamera {
    type Frame = LeapFrame;
    type Stream = LeapStream;

    fn acquire(&mut self) -> Result<LeapStream, CaptureError> {
        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| CaptureError::Unavailable(format!("LeapC connection: {:?}", e)))?;
        connection
            .open()
            .map_err(|e| CaptureError::Unavailable(format!("LeapMotion device: {:?}", e)))?;
        info!("LeapMotion connection open");
        Ok(LeapStream { connection })
    }
}

impl FrameStream for LeapStream {
    type Frame = LeapFrame;

    fn read_frame(&mut self) -> Option<LeapFrame> {
        let msg = match self.connection.poll(POLL_MS) {
            Ok(m)  => m,
            Err(e) => {
                debug!(error = ?e, "LeapC poll failed");
                return None;
            }
        };
        let Event::Tracking(frame) = msg.event() else {
            return None;
        };

        let tips = frame.hands().into_iter().next().and_then(|hand| {
            let digits: Vec<_> = hand.digits().into_iter().collect();
            if digits.len() < 2 {
                return None;
            }
            let thumb = digits[0].distal().next_joint();
            let index = digits[1].distal().next_joint();
            Some(([index.x, index.y, index.z], [thumb.x, thumb.y, thumb.z]))
        });
        Some(LeapFrame { tips })
    }

    fn release(self) {
        drop(self.connection);
        info!("LeapMotion connection closed");
    }
}

/// Projects LeapMotion fingertips into normalized landmarks.
#[derive(Clone, Copy, Debug, Default)]
pub struct LeapHandModel;

impl HandTracker<LeapFrame> for LeapHandModel {
    fn handshake(&mut self) -> Result<()> {
        Ok(())
    }

    fn detect(&mut self, frame: &LeapFrame) -> Result<Option<HandLandmarks>> {
        Ok(frame.tips.map(|(index, thumb)| {
            HandLandmarks::from_tips(normalize(index), normalize(thumb))
        }))
    }
}

/// Millimetres → image space (x flipped like a front camera, y downward).
fn normalize(p: [f32; 3]) -> Landmark {
    let nx = ((p[0] - X_RANGE.0) / (X_RANGE.1 - X_RANGE.0)).clamp(0.0, 1.0);
    let ny = ((p[1] - Y_RANGE.0) / (Y_RANGE.1 - Y_RANGE.0)).clamp(0.0, 1.0);
    Landmark { x: 1.0 - nx, y: 1.0 - ny }
}
