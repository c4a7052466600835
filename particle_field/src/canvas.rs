//! Rendering surface abstraction and the four-color theme palette.
//!
//! The field never touches pixels directly: it issues a small set of 2D
//! drawing calls through [`Canvas`].  The desktop shell implements it over a
//! software framebuffer; tests implement it with a recorder.

// ════════════════════════════════════════════════════════════════════════════
// Rgb — an opaque color
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parse `#rrggbb`, `#rgb`, or `rgb(r, g, b)`.  Surrounding whitespace
    /// is ignored; anything else yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return match hex.len() {
                6 => {
                    let v = u32::from_str_radix(hex, 16).ok()?;
                    Some(Rgb::new((v >> 16) as u8, (v >> 8) as u8, v as u8))
                }
                3 => {
                    let v = u16::from_str_radix(hex, 16).ok()?;
                    // #abc → #aabbcc
                    let expand = |n: u16| ((n & 0xF) as u8) * 0x11;
                    Some(Rgb::new(expand(v >> 8), expand(v >> 4), expand(v)))
                }
                _ => None,
            };
        }
        let inner = s.strip_prefix("rgb(")?.strip_suffix(')')?;
        let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>());
        let (r, g, b) = (parts.next()?.ok()?, parts.next()?.ok()?, parts.next()?.ok()?);
        if parts.next().is_some() {
            return None;
        }
        Some(Rgb::new(r, g, b))
    }

    /// Packed `0xAARRGGBB` with full alpha.
    pub fn to_argb(self) -> u32 {
        0xFF000000 | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// Soft halo drawn around filled shapes while set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
    pub blur:  f32,
    pub color: Rgb,
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — the 2D drawing context
// ════════════════════════════════════════════════════════════════════════════

/// Minimal immediate-mode 2D context.
///
/// State set through the `set_*` calls persists until changed, so callers
/// that enable glow or lower alpha must restore them afterwards.
pub trait Canvas {
    /// Drawable size in pixels.
    fn dimensions(&self) -> (usize, usize);

    fn clear(&mut self);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32);
    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32);
    fn stroke_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32);

    fn set_fill(&mut self, color: Rgb);
    fn set_stroke(&mut self, color: Rgb);
    /// Global alpha applied to every subsequent draw, `0.0..=1.0`.
    fn set_alpha(&mut self, alpha: f32);
    fn set_line_width(&mut self, width: f32);
    fn set_glow(&mut self, glow: Option<Glow>);
}

// ════════════════════════════════════════════════════════════════════════════
// Theme → Palette
// ════════════════════════════════════════════════════════════════════════════

/// Resolves named theme colors as strings at render time.
pub trait ThemeProvider {
    fn resolve(&self, name: &str) -> Option<String>;
}

/// A theme that resolves nothing, so every color falls back to its default.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultTheme;

impl ThemeProvider for DefaultTheme {
    fn resolve(&self, _name: &str) -> Option<String> { None }
}

pub const THEME_IDLE:        &str = "idle";
pub const THEME_ACTIVE_IDLE: &str = "active-idle";
pub const THEME_ACTIVE:      &str = "active";
pub const THEME_PINCH:       &str = "pinch";

/// The four colors the field renders with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Resting particles.
    pub idle:        Rgb,
    /// Moving particles while no pointer is engaged.
    pub active_idle: Rgb,
    /// Excited particles and reticule under an open hand.
    pub active:      Rgb,
    /// Excited particles and reticule while pinching.
    pub pinch:       Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            idle:        Rgb::new(0x47, 0x55, 0x69),
            active_idle: Rgb::new(0x94, 0xA3, 0xB8),
            active:      Rgb::new(0x22, 0xD3, 0xEE),
            pinch:       Rgb::new(0xF4, 0x72, 0xB6),
        }
    }
}

impl Palette {
    /// Resolve each color from `theme`, falling back per color to the
    /// defaults when the name is unknown or the string does not parse.
    pub fn resolve(theme: &dyn ThemeProvider) -> Self {
        let defaults = Palette::default();
        let pick = |name: &str, fallback: Rgb| {
            theme.resolve(name)
                .and_then(|s| Rgb::parse(&s))
                .unwrap_or(fallback)
        };
        Palette {
            idle:        pick(THEME_IDLE,        defaults.idle),
            active_idle: pick(THEME_ACTIVE_IDLE, defaults.active_idle),
            active:      pick(THEME_ACTIVE,      defaults.active),
            pinch:       pick(THEME_PINCH,       defaults.pinch),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
