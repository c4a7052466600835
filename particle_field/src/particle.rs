//! A single spring-anchored particle.

use crate::canvas::{Canvas, Glow, Palette};
use crate::pointer::PointerMode;

// ════════════════════════════════════════════════════════════════════════════
// Force-model constants
// ════════════════════════════════════════════════════════════════════════════

/// Pointer influence radius in pixels.
pub const MOUSE_RADIUS: f32 = 220.0;
/// Spring constant pulling a particle back to its home cell.
pub const ELASTICITY:   f32 = 0.04;
/// Per-step velocity retention.
pub const FRICTION:     f32 = 0.92;
const REPEL_POWER:      f32 = 25.0;
const ATTRACT_POWER:    f32 = 12.0;

const DRIFT_AMPLITUDE:  f32 = 0.2;
const DRIFT_SPATIAL:    f32 = 0.01;
const DRIFT_TEMPORAL:   f32 = 0.001;

/// `|vx| + |vy|` above which a particle is drawn as excited.
pub const EXCITED_SPEED: f32 = 0.3;

const ENGAGED_RADIUS:   f32 = 2.5;
const ENGAGED_GLOW:     f32 = 8.0;
const IDLE_MOVE_RADIUS: f32 = 2.0;
const REST_RADIUS:      f32 = 1.2;
const REST_ALPHA:       f32 = 0.25;

// ════════════════════════════════════════════════════════════════════════════
// Particle
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x:  f32,
    pub y:  f32,
    pub vx: f32,
    pub vy: f32,
    home_x: f32,
    home_y: f32,
}

impl Particle {
    /// A particle at rest on its home cell.
    pub fn new(home_x: f32, home_y: f32) -> Self {
        Particle { x: home_x, y: home_y, vx: 0.0, vy: 0.0, home_x, home_y }
    }

    pub fn home(&self) -> (f32, f32) { (self.home_x, self.home_y) }

    pub fn speed(&self) -> f32 { self.vx.abs() + self.vy.abs() }

    /// One explicit-Euler step.
    ///
    /// `engaged` means the field is active *and* a pointer is present; only
    /// then does `target` exert a radial force.  Particles outside the radius
    /// (or with no pointer at all) shimmer with a slow traveling sine drift.
    pub fn advance(&mut self, target: (f32, f32), mode: PointerMode, engaged: bool, sim_time_ms: f64) {
        let mut pushed = false;

        if engaged {
            let dx = target.0 - self.x;
            let dy = target.1 - self.y;
            let dist = (dx * dx + dy * dy).sqrt();

            if dist < MOUSE_RADIUS {
                let force = (MOUSE_RADIUS - dist) / MOUSE_RADIUS;
                let angle = dy.atan2(dx);
                let (dir, power) = match mode {
                    PointerMode::Pinch => (1.0, ATTRACT_POWER),
                    PointerMode::Open  => (-1.0, REPEL_POWER),
                };
                self.vx += angle.cos() * force * power * dir;
                self.vy += angle.sin() * force * power * dir;
                pushed = true;
            }
        }

        if !pushed {
            let t = sim_time_ms * DRIFT_TEMPORAL as f64;
            let phase_x = (self.home_y * DRIFT_SPATIAL) as f64 + t;
            let phase_y = (self.home_x * DRIFT_SPATIAL) as f64 + t;
            self.vx += phase_x.sin() as f32 * DRIFT_AMPLITUDE;
            self.vy += phase_y.cos() as f32 * DRIFT_AMPLITUDE;
        }

        self.vx += (self.home_x - self.x) * ELASTICITY;
        self.vy += (self.home_y - self.y) * ELASTICITY;
        self.vx *= FRICTION;
        self.vy *= FRICTION;
        self.x += self.vx;
        self.y += self.vy;
    }

    /// Draw as a filled disc.  Glow and alpha are restored before returning
    /// so nothing leaks onto the next particle.
    pub fn render(&self, canvas: &mut dyn Canvas, engaged: bool, mode: PointerMode, palette: &Palette) {
        let speed = self.speed();

        let (radius, color, alpha, glow) = if speed > EXCITED_SPEED {
            let intensity = (speed / 4.0).min(1.0);
            if engaged {
                let color = if mode.is_pinch() { palette.pinch } else { palette.active };
                (ENGAGED_RADIUS, color, intensity, Some(Glow { blur: ENGAGED_GLOW, color }))
            } else {
                (IDLE_MOVE_RADIUS, palette.active_idle, intensity * 0.5, None)
            }
        } else {
            (REST_RADIUS, palette.idle, REST_ALPHA, None)
        };

        canvas.set_fill(color);
        canvas.set_alpha(alpha);
        if glow.is_some() {
            canvas.set_glow(glow);
        }
        canvas.fill_circle(self.x, self.y, radius);
        if glow.is_some() {
            canvas.set_glow(None);
        }
        canvas.set_alpha(1.0);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
