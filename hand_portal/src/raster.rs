//! ARGB software framebuffer implementing [`Canvas`].
//!
//! Everything is drawn by coverage tests against pixel centres; there is no
//! anti-aliasing beyond the global alpha.  Glow is approximated by a linear
//! halo around filled discs.

use particle_field::{Canvas, Glow, Rgb};

pub const BACKGROUND: u32 = 0xFF0B1120;

/// Peak opacity of a glow halo, relative to the current alpha.
const GLOW_STRENGTH: f32 = 0.35;

pub struct Raster {
    width:      usize,
    height:     usize,
    buf:        Vec<u32>,
    fill:       Rgb,
    stroke:     Rgb,
    alpha:      f32,
    line_width: f32,
    glow:       Option<Glow>,
}

impl Raster {
    pub fn new(width: usize, height: usize) -> Self {
        Raster {
            width,
            height,
            buf:        vec![BACKGROUND; width * height],
            fill:       Rgb::new(255, 255, 255),
            stroke:     Rgb::new(255, 255, 255),
            alpha:      1.0,
            line_width: 1.0,
            glow:       None,
        }
    }

    /// Reallocate for a new size.  Returns false if the size is unchanged.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        self.width  = width;
        self.height = height;
        self.buf    = vec![BACKGROUND; width * height];
        true
    }

    pub fn buffer(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.buf[y * self.width + x])
        } else {
            None
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    /// Blend `color` over one pixel; off-surface coordinates are ignored.
    fn blend_pixel(&mut self, x: i64, y: i64, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height || alpha <= 0.0 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.buf[idx] = blend(self.buf[idx], color, alpha);
    }

    /// Visit every pixel whose centre lies within the box around
    /// `(cx, cy)` of half-size `reach`, passing the centre coordinates.
    fn for_box(&mut self, cx: f32, cy: f32, reach: f32, mut f: impl FnMut(&mut Self, i64, i64, f32, f32)) {
        if !(cx.is_finite() && cy.is_finite() && reach.is_finite()) {
            return;
        }
        let x0 = ((cx - reach).floor() as i64).max(0);
        let y0 = ((cy - reach).floor() as i64).max(0);
        let x1 = ((cx + reach).ceil() as i64).min(self.width as i64 - 1);
        let y1 = ((cy + reach).ceil() as i64).min(self.height as i64 - 1);
        for py in y0..=y1 {
            for px in x0..=x1 {
                f(self, px, py, px as f32 + 0.5, py as f32 + 0.5);
            }
        }
    }

    /// Render `text` with the 3×5 font, each font pixel `scale` pixels wide.
    pub fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: Rgb) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            let bits = glyph(ch);
            for row in 0..5 {
                for col in 0..3 {
                    if bits & (1 << (14 - row * 3 - col)) != 0 {
                        let px = cx + col * scale;
                        let py = y + row * scale;
                        for sy in 0..scale {
                            for sx in 0..scale {
                                self.blend_pixel((px + sx) as i64, (py + sy) as i64, color, 1.0);
                            }
                        }
                    }
                }
            }
            cx += 4 * scale;
            if cx >= self.width { break; }
        }
    }
}

/// Width in pixels of `text` drawn at `scale`.
pub fn text_width(text: &str, scale: usize) -> usize {
    text.chars().count() * 4 * scale.max(1)
}

impl Canvas for Raster {
    fn dimensions(&self) -> (usize, usize) { (self.width, self.height) }

    fn clear(&mut self) { self.buf.fill(BACKGROUND); }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32) {
        if radius <= 0.0 {
            return;
        }
        let (fill, alpha, glow) = (self.fill, self.alpha, self.glow);
        let reach = radius + glow.map_or(0.0, |g| g.blur);

        self.for_box(x, y, reach, |r, px, py, fx, fy| {
            let d = ((fx - x).powi(2) + (fy - y).powi(2)).sqrt();
            if d <= radius {
                r.blend_pixel(px, py, fill, alpha);
            } else if let Some(g) = glow {
                if g.blur > 0.0 && d <= radius + g.blur {
                    let falloff = 1.0 - (d - radius) / g.blur;
                    r.blend_pixel(px, py, g.color, alpha * GLOW_STRENGTH * falloff);
                }
            }
        });
    }

    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32) {
        let (stroke, alpha) = (self.stroke, self.alpha);
        let half = (self.line_width / 2.0).max(0.5);
        self.for_box(x, y, radius + half, |r, px, py, fx, fy| {
            let d = ((fx - x).powi(2) + (fy - y).powi(2)).sqrt();
            if (d - radius).abs() <= half {
                r.blend_pixel(px, py, stroke, alpha);
            }
        });
    }

    fn stroke_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) {
        let (stroke, alpha) = (self.stroke, self.alpha);
        let half = (self.line_width / 2.0).max(0.5);
        let (dx, dy) = (x1 - x0, y1 - y0);
        let len2 = dx * dx + dy * dy;
        let (mx, my) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
        let reach = len2.sqrt() / 2.0 + half;

        self.for_box(mx, my, reach, |r, px, py, fx, fy| {
            // Distance from the pixel centre to the segment.
            let t = if len2 > 0.0 {
                (((fx - x0) * dx + (fy - y0) * dy) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let (qx, qy) = (x0 + t * dx, y0 + t * dy);
            if ((fx - qx).powi(2) + (fy - qy).powi(2)).sqrt() <= half {
                r.blend_pixel(px, py, stroke, alpha);
            }
        });
    }

    fn set_fill(&mut self, color: Rgb) { self.fill = color; }
    fn set_stroke(&mut self, color: Rgb) { self.stroke = color; }
    fn set_alpha(&mut self, alpha: f32) { self.alpha = alpha.clamp(0.0, 1.0); }
    fn set_line_width(&mut self, width: f32) { self.line_width = width.max(0.0); }
    fn set_glow(&mut self, glow: Option<Glow>) { self.glow = glow; }
}

/// Blend an opaque color over an ARGB pixel.  `t` = 0.0 keeps `dst`,
/// `t` = 1.0 replaces it.
pub fn blend(dst: u32, src: Rgb, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |shift: u32, c: u8| {
        let d = ((dst >> shift) & 0xFF) as f32;
        ((d + (c as f32 - d) * t).round() as u32) << shift
    };
    0xFF000000 | mix(16, src.r) | mix(8, src.g) | mix(0, src.b)
}

// ────────────────────────────────────────────────────────────────────────────
// 3×5 bitmap font: five rows of three bits, top row in the high bits
// ────────────────────────────────────────────────────────────────────────────

fn glyph(c: char) -> u16 {
    match c.to_ascii_lowercase() {
        '0' => 0x7B6F, '1' => 0x2C97, '2' => 0x73E7, '3' => 0x73CF, '4' => 0x5BC9,
        '5' => 0x79CF, '6' => 0x79EF, '7' => 0x7249, '8' => 0x7BEF, '9' => 0x7BCF,
        'a' => 0x7BED, 'b' => 0x6BAE, 'c' => 0x7927, 'd' => 0x6B6E, 'e' => 0x79E7,
        'f' => 0x79E4, 'g' => 0x796F, 'h' => 0x5BED, 'i' => 0x7497, 'j' => 0x126F,
        'k' => 0x5BAD, 'l' => 0x4927, 'm' => 0x5F6D, 'n' => 0x7B6D, 'o' => 0x7B6F,
        'p' => 0x7BE4, 'q' => 0x7B79, 'r' => 0x6BAD, 's' => 0x79CF, 't' => 0x7492,
        'u' => 0x5B6F, 'v' => 0x5B52, 'w' => 0x5B7D, 'x' => 0x5AAD, 'y' => 0x5BD2,
        'z' => 0x72A7,
        '/' => 0x12A4, '-' => 0x01C0, '.' => 0x0002, ',' => 0x0014, ':' => 0x0410,
        '=' => 0x0E38, '+' => 0x05D0, '(' => 0x2922, ')' => 0x224A, '?' => 0x7282,
        '_' => 0x0007, ' ' => 0x0000,
        _   => 0x0080, // centre dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);

    fn lit(r: &Raster) -> usize {
        r.buffer().iter().filter(|&&p| p != BACKGROUND).count()
    }

    #[test]
    fn opaque_disc_covers_its_centre() {
        let mut r = Raster::new(40, 40);
        r.set_fill(RED);
        r.fill_circle(20.0, 20.0, 3.0);
        assert_eq!(r.pixel(20, 20), Some(RED.to_argb()));
        assert_eq!(r.pixel(30, 20), Some(BACKGROUND));
    }

    #[test]
    fn alpha_blends_halfway() {
        let mut r = Raster::new(10, 10);
        r.fill_rect(0, 0, 10, 10, 0xFF000000);
        r.set_fill(Rgb::new(200, 100, 0));
        r.set_alpha(0.5);
        r.fill_circle(5.0, 5.0, 2.0);
        assert_eq!(r.pixel(5, 5), Some(0xFF643200));
    }

    #[test]
    fn glow_reaches_past_the_disc_only_when_set() {
        let mut plain = Raster::new(40, 40);
        plain.set_fill(RED);
        plain.fill_circle(20.0, 20.0, 2.5);

        let mut glowing = Raster::new(40, 40);
        glowing.set_fill(RED);
        glowing.set_glow(Some(Glow { blur: 8.0, color: RED }));
        glowing.fill_circle(20.0, 20.0, 2.5);

        assert_eq!(plain.pixel(25, 20), Some(BACKGROUND));
        assert_ne!(glowing.pixel(25, 20), Some(BACKGROUND));
        assert!(lit(&glowing) > lit(&plain));
        // Halo never reaches full strength.
        assert_ne!(glowing.pixel(25, 20), Some(RED.to_argb()));
    }

    #[test]
    fn ring_leaves_the_middle_empty() {
        let mut r = Raster::new(60, 60);
        r.set_stroke(RED);
        r.set_line_width(2.0);
        r.stroke_circle(30.0, 30.0, 20.0);
        assert_eq!(r.pixel(30, 30), Some(BACKGROUND));
        assert_eq!(r.pixel(49, 29), Some(RED.to_argb()));
    }

    #[test]
    fn line_covers_its_path() {
        let mut r = Raster::new(50, 50);
        r.set_stroke(RED);
        r.stroke_line(5.0, 25.0, 45.0, 25.0);
        assert_eq!(r.pixel(25, 24), Some(RED.to_argb()));
        assert_eq!(r.pixel(25, 30), Some(BACKGROUND));
        assert_eq!(r.pixel(2, 24), Some(BACKGROUND));
    }

    #[test]
    fn off_surface_drawing_is_clipped() {
        let mut r = Raster::new(20, 20);
        r.set_fill(RED);
        r.set_glow(Some(Glow { blur: 8.0, color: RED }));
        r.fill_circle(-1000.0, -1000.0, 5.0);
        r.stroke_circle(500.0, 5.0, 20.0);
        r.stroke_line(-50.0, -50.0, -10.0, -10.0);
        r.fill_circle(f32::NAN, 3.0, 2.0);
        assert_eq!(lit(&r), 0);
    }

    #[test]
    fn clear_and_resize() {
        let mut r = Raster::new(8, 8);
        r.set_fill(RED);
        r.fill_circle(4.0, 4.0, 3.0);
        r.clear();
        assert_eq!(lit(&r), 0);

        assert!(!r.resize(8, 8));
        assert!(r.resize(16, 4));
        assert_eq!(r.dimensions(), (16, 4));
        assert_eq!(r.buffer().len(), 64);
    }

    #[test]
    fn text_is_drawn_and_measured() {
        let mut r = Raster::new(100, 20);
        r.draw_text("idle", 2, 2, 2, RED);
        assert!(lit(&r) > 0);
        assert_eq!(text_width("idle", 2), 32);
        // The dotted "i" has its top row fully lit.
        assert_eq!(r.pixel(2, 2), Some(RED.to_argb()));
    }
}
