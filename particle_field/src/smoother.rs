//! Exponential smoothing of the pointer target.

use crate::pointer::PointerSample;

/// Off-canvas position used as the target whenever no pointer is engaged.
pub const OFFSCREEN: (f32, f32) = (-1000.0, -1000.0);

/// Fraction of the remaining distance covered each frame.
pub const ALPHA: f32 = 0.2;

/// Filtered pointer position used for physics and rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Smoother {
    pub x: f32,
    pub y: f32,
}

impl Default for Smoother {
    fn default() -> Self {
        Smoother { x: OFFSCREEN.0, y: OFFSCREEN.1 }
    }
}

impl Smoother {
    pub fn new() -> Self { Self::default() }

    /// Move a fifth of the way toward `target`.
    pub fn update(&mut self, target: (f32, f32)) {
        self.x += (target.0 - self.x) * ALPHA;
        self.y += (target.1 - self.y) * ALPHA;
    }

    /// The raw pointer when the field is active and a hand is present,
    /// otherwise the off-canvas sentinel.
    pub fn target_for(pointer: &PointerSample, field_active: bool) -> (f32, f32) {
        if field_active && pointer.active {
            (pointer.x, pointer.y)
        } else {
            OFFSCREEN
        }
    }

    pub fn position(&self) -> (f32, f32) { (self.x, self.y) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::PointerMode;

    #[test]
    fn starts_offscreen() {
        assert_eq!(Smoother::new().position(), OFFSCREEN);
    }

    #[test]
    fn one_step_covers_a_fifth() {
        let mut s = Smoother { x: 0.0, y: 100.0 };
        s.update((100.0, 0.0));
        assert!((s.x - 20.0).abs() < 1e-4);
        assert!((s.y - 80.0).abs() < 1e-4);
    }

    #[test]
    fn converges_without_overshoot() {
        let mut s = Smoother { x: 0.0, y: 0.0 };
        let mut prev = 0.0;
        for _ in 0..60 {
            s.update((300.0, 300.0));
            assert!(s.x >= prev && s.x <= 300.0);
            prev = s.x;
        }
        assert!((s.x - 300.0).abs() < 0.1);
    }

    #[test]
    fn inactive_targets_sentinel() {
        let p = PointerSample::at(10.0, 10.0, PointerMode::Open);
        assert_eq!(Smoother::target_for(&p, false), OFFSCREEN);
        assert_eq!(Smoother::target_for(&p, true), (10.0, 10.0));
        let absent = PointerSample { active: false, ..p };
        assert_eq!(Smoother::target_for(&absent, true), OFFSCREEN);
    }
}
