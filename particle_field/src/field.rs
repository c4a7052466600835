//! The particle grid and its per-frame step.

use crate::canvas::{Canvas, Palette};
use crate::particle::Particle;
use crate::pointer::PointerSample;

/// Distance between neighbouring home cells, in pixels.
pub const SPACING: f32 = 30.0;

const RETICULE_RADIUS: f32 = 20.0;
const RETICULE_ARM:    f32 = 30.0;
const RETICULE_WIDTH:  f32 = 2.0;

/// Owns every particle and the bounds they were laid out for.
///
/// The collection is only ever replaced wholesale by [`rebuild`](Self::rebuild);
/// particles are never added or removed one at a time.
#[derive(Debug, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width:     f32,
    height:    f32,
}

impl ParticleField {
    pub fn new(width: f32, height: f32) -> Self {
        let mut field = ParticleField::default();
        field.rebuild(width, height);
        field
    }

    /// Replace the whole grid with one particle per cell, each resting on
    /// the centre of its cell.
    pub fn rebuild(&mut self, width: f32, height: f32) {
        self.width  = width;
        self.height = height;

        let cols = grid_cells(width);
        let rows = grid_cells(height);
        let half = SPACING / 2.0;

        self.particles = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (col, row)))
            .map(|(col, row)| Particle::new(col as f32 * SPACING + half, row as f32 * SPACING + half))
            .collect();
    }

    /// Rebuild only when the bounds differ from the current layout.
    /// Returns true when a rebuild happened.
    pub fn resize_if_needed(&mut self, width: f32, height: f32) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        self.rebuild(width, height);
        true
    }

    /// Advance and draw every particle, then the reticule.
    ///
    /// `smoothed` is the filtered pointer position; `pointer` supplies the
    /// presence flag and mode.
    pub fn step(
        &mut self,
        canvas:       &mut dyn Canvas,
        smoothed:     (f32, f32),
        pointer:      &PointerSample,
        field_active: bool,
        palette:      &Palette,
        sim_time_ms:  f64,
    ) {
        let engaged = field_active && pointer.active;

        for p in &mut self.particles {
            p.advance(smoothed, pointer.mode, engaged, sim_time_ms);
            p.render(canvas, engaged, pointer.mode, palette);
        }

        if engaged {
            draw_reticule(canvas, smoothed, pointer, palette);
        }
    }

    pub fn particles(&self) -> &[Particle] { &self.particles }
    pub fn len(&self) -> usize { self.particles.len() }
    pub fn is_empty(&self) -> bool { self.particles.is_empty() }
    pub fn bounds(&self) -> (f32, f32) { (self.width, self.height) }
}

fn grid_cells(extent: f32) -> usize {
    if extent.is_finite() && extent > 0.0 {
        (extent / SPACING).floor() as usize
    } else {
        0
    }
}

/// Ring plus crosshair centred on the smoothed pointer.
fn draw_reticule(canvas: &mut dyn Canvas, at: (f32, f32), pointer: &PointerSample, palette: &Palette) {
    let color = if pointer.mode.is_pinch() { palette.pinch } else { palette.active };
    let (cx, cy) = at;

    canvas.set_stroke(color);
    canvas.set_line_width(RETICULE_WIDTH);
    canvas.stroke_circle(cx, cy, RETICULE_RADIUS);
    canvas.stroke_line(cx - RETICULE_ARM, cy, cx + RETICULE_ARM, cy);
    canvas.stroke_line(cx, cy - RETICULE_ARM, cx, cy + RETICULE_ARM);
    canvas.set_line_width(1.0);
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::tests::{Op, Recorder};
    use crate::pointer::PointerMode;

    #[test]
    fn count_is_floor_product() {
        let f = ParticleField::new(1000.0, 800.0);
        assert_eq!(f.len(), 33 * 26);
        let f = ParticleField::new(59.0, 90.0);
        assert_eq!(f.len(), 3);
    }

    #[test]
    fn degenerate_bounds_are_empty() {
        assert!(ParticleField::new(0.0, 500.0).is_empty());
        assert!(ParticleField::new(500.0, 0.0).is_empty());
        assert!(ParticleField::new(-30.0, 90.0).is_empty());
        assert!(ParticleField::new(f32::NAN, 90.0).is_empty());
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut f = ParticleField::new(400.0, 300.0);
        f.rebuild(400.0, 300.0);
        let first: Vec<_> = f.particles().iter().map(Particle::home).collect();
        f.rebuild(400.0, 300.0);
        let second: Vec<_> = f.particles().iter().map(Particle::home).collect();
        assert_eq!(first.len(), second.len());
        assert_eq!(first, second);
    }

    #[test]
    fn rebuild_discards_motion() {
        let mut f = ParticleField::new(90.0, 90.0);
        let mut rec = Recorder::new(90, 90);
        let pointer = PointerSample::at(45.0, 45.0, PointerMode::Open);
        f.step(&mut rec, (45.0, 45.0), &pointer, true, &Palette::default(), 0.0);
        assert!(f.particles().iter().any(|p| p.speed() > 0.0));

        f.rebuild(90.0, 90.0);
        assert!(f.particles().iter().all(|p| p.speed() == 0.0 && (p.x, p.y) == p.home()));
    }

    #[test]
    fn homes_sit_on_cell_centres() {
        let f = ParticleField::new(90.0, 60.0);
        let homes: Vec<_> = f.particles().iter().map(Particle::home).collect();
        assert_eq!(homes, vec![
            (15.0, 15.0), (45.0, 15.0), (75.0, 15.0),
            (15.0, 45.0), (45.0, 45.0), (75.0, 45.0),
        ]);
    }

    #[test]
    fn resize_only_on_change() {
        let mut f = ParticleField::new(300.0, 300.0);
        assert!(!f.resize_if_needed(300.0, 300.0));
        assert!(f.resize_if_needed(600.0, 300.0));
        assert_eq!(f.len(), 20 * 10);
        assert_eq!(f.bounds(), (600.0, 300.0));
    }

    #[test]
    fn step_draws_every_particle_and_reticule_when_engaged() {
        let mut f = ParticleField::new(300.0, 300.0);
        let mut rec = Recorder::new(300, 300);
        let pointer = PointerSample::at(150.0, 150.0, PointerMode::Pinch);
        let palette = Palette::default();
        f.step(&mut rec, (150.0, 150.0), &pointer, true, &palette, 0.0);

        assert_eq!(rec.fills().count(), f.len());
        assert_eq!(rec.rings(), 1);
        let lines: Vec<_> = rec.ops.iter().filter(|op| matches!(op, Op::Line { .. })).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|op| **op == Op::Line { color: palette.pinch }));
    }

    #[test]
    fn no_reticule_when_inactive_or_absent() {
        let palette = Palette::default();
        let mut f = ParticleField::new(300.0, 300.0);

        let mut rec = Recorder::new(300, 300);
        let pointer = PointerSample::at(150.0, 150.0, PointerMode::Open);
        f.step(&mut rec, (150.0, 150.0), &pointer, false, &palette, 0.0);
        assert_eq!(rec.rings(), 0);

        let mut rec = Recorder::new(300, 300);
        let absent = PointerSample { active: false, ..pointer };
        f.step(&mut rec, (150.0, 150.0), &absent, true, &palette, 0.0);
        assert_eq!(rec.rings(), 0);
    }

    #[test]
    fn glow_never_leaks_between_particles() {
        let mut f = ParticleField::new(300.0, 300.0);
        let mut rec = Recorder::new(300, 300);
        let pointer = PointerSample::at(150.0, 150.0, PointerMode::Open);
        for _ in 0..3 {
            f.step(&mut rec, (150.0, 150.0), &pointer, true, &Palette::default(), 0.0);
        }

        let mut glowing = false;
        let mut fills_while_glowing = 0;
        for op in &rec.ops {
            match op {
                Op::Glow(g) => { glowing = g.is_some(); fills_while_glowing = 0; }
                Op::Fill { .. } if glowing => {
                    fills_while_glowing += 1;
                    assert_eq!(fills_while_glowing, 1, "glow spilled onto a second disc");
                }
                _ => {}
            }
        }
        assert!(!glowing);
    }

    #[test]
    fn empty_field_step_is_noop() {
        let mut f = ParticleField::new(0.0, 0.0);
        let mut rec = Recorder::new(0, 0);
        let pointer = PointerSample::default();
        f.step(&mut rec, (0.0, 0.0), &pointer, false, &Palette::default(), 0.0);
        assert!(rec.ops.is_empty());
    }
}
