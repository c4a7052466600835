//! Live pointer state shared between the tracking worker and the frame loop.

use parking_lot::RwLock;

/// Fingertip–thumb distance (pixels) below which the hand counts as pinching.
pub const PINCH_THRESHOLD: f32 = 60.0;

/// Hand posture: an open hand repels particles, a pinch attracts them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerMode {
    #[default]
    Open,
    Pinch,
}

impl PointerMode {
    /// Classify from the fingertip and thumb-tip positions in pixels.
    pub fn from_tips(tip: (f32, f32), thumb: (f32, f32)) -> Self {
        let dx = tip.0 - thumb.0;
        let dy = tip.1 - thumb.1;
        if (dx * dx + dy * dy).sqrt() < PINCH_THRESHOLD {
            PointerMode::Pinch
        } else {
            PointerMode::Open
        }
    }

    pub fn is_pinch(self) -> bool { self == PointerMode::Pinch }
}

/// Raw pointer target in surface pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    pub x:      f32,
    pub y:      f32,
    /// A hand is currently tracked.
    pub active: bool,
    pub mode:   PointerMode,
}

impl PointerSample {
    pub fn at(x: f32, y: f32, mode: PointerMode) -> Self {
        PointerSample { x, y, active: true, mode }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SharedPointer
// ════════════════════════════════════════════════════════════════════════════

/// Single-writer snapshot cell.
///
/// The tracking worker is the only writer and publishes a complete sample per
/// callback; the frame loop copies one snapshot per frame.  A reader never
/// observes a half-written sample.
#[derive(Debug, Default)]
pub struct SharedPointer {
    sample: RwLock<PointerSample>,
    /// Surface size the worker maps normalized landmarks into.
    bounds: RwLock<(f32, f32)>,
}

impl SharedPointer {
    pub fn new() -> Self { Self::default() }

    pub fn publish(&self, sample: PointerSample) {
        *self.sample.write() = sample;
    }

    pub fn snapshot(&self) -> PointerSample {
        *self.sample.read()
    }

    /// Mark the pointer absent, keeping its last position.
    pub fn clear_active(&self) {
        self.sample.write().active = false;
    }

    pub fn set_bounds(&self, width: f32, height: f32) {
        *self.bounds.write() = (width, height);
    }

    pub fn bounds(&self) -> (f32, f32) {
        *self.bounds.read()
    }
}
