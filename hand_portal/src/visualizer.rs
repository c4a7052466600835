//! Software-rendered window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                                  space=track  q/esc=quit │
//! │                                                          │
//! │          · · · · · · · particle field · · · · · ·        │
//! │                        ( portal )                        │
//! │          · · · · · · · · · · · · · · · · · · · ·         │
//! │                                                          │
//! │ tracking-open                                            │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::{Context, Result};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use particle_field::{Canvas, FrameSurface, PortalTicket, Rgb};

use crate::config::WindowConfig;
use crate::raster::{text_width, Raster};
use crate::sim::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const TEXT_SCALE:    usize = 2;
const MARGIN:        usize = 12;
const LEGEND:        &str  = "space=track  q/esc=quit";
const LEGEND_COLOR:  Rgb   = Rgb::new(0x64, 0x74, 0x8B);
const STATUS_COLOR:  Rgb   = Rgb::new(0xE2, 0xE8, 0xF0);
const ERROR_COLOR:   Rgb   = Rgb::new(0xF8, 0x71, 0x71);
/// Portal ring radius at birth, and how far it grows relative to the
/// shorter window side.
const PORTAL_START:  f32   = 30.0;
const PORTAL_GROWTH: f32   = 0.45;

/// Window commands for the app loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiEvent {
    ToggleTracking,
    Quit,
}

/// Everything drawn on top of the field.
#[derive(Clone, Debug)]
pub struct Overlay {
    pub status:   String,
    pub is_error: bool,
    pub tickets:  Vec<PortalTicket>,
    pub now_ms:   u64,
    pub accent:   Rgb,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:       Window,
    raster:       Raster,
    sim_tx:       Option<Sender<SimInput>>,
    last_pointer: Option<SimInput>,
}

impl Visualizer {
    pub fn new(config: &WindowConfig, sim_tx: Option<Sender<SimInput>>) -> Result<Self> {
        let mut window = Window::new(
            &config.title,
            config.width, config.height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        ).context("failed to open window")?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            raster: Raster::new(config.width, config.height),
            sim_tx,
            last_pointer: None,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keys and forward the mouse to the simulated camera.
    pub fn poll_input(&mut self) -> Vec<UiEvent> {
        let mut events = Vec::new();
        if !self.window.is_open() {
            events.push(UiEvent::Quit);
            return events;
        }

        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        if pressed(Key::Q) || pressed(Key::Escape) {
            events.push(UiEvent::Quit);
        }
        if pressed(Key::Space) {
            events.push(UiEvent::ToggleTracking);
        }

        if let Some(tx) = &self.sim_tx {
            let (w, h) = self.window.get_size();
            let input = match self.window.get_mouse_pos(MouseMode::Discard) {
                Some((x, y)) if w > 0 && h > 0 => SimInput::Pointer {
                    x:       x / w as f32,
                    y:       y / h as f32,
                    pressed: self.window.get_mouse_down(MouseButton::Left),
                },
                _ => SimInput::Left,
            };
            if self.last_pointer != Some(input) {
                let _ = tx.send(input);
                self.last_pointer = Some(input);
            }
        }

        events
    }

    /// Draw the overlays and push the frame to the window.
    pub fn present(&mut self, overlay: &Overlay) -> Result<()> {
        draw_overlays(&mut self.raster, overlay);
        let (w, h) = self.raster.dimensions();
        self.window
            .update_with_buffer(self.raster.buffer(), w, h)
            .context("failed to present frame")
    }

    /// Keep the window responsive on frames with nothing to draw.
    pub fn idle(&mut self) {
        self.window.update();
    }
}

impl FrameSurface for Visualizer {
    fn canvas(&mut self) -> Option<&mut dyn Canvas> {
        if !self.window.is_open() {
            return None;
        }
        let (w, h) = self.window.get_size();
        if w == 0 || h == 0 {
            return None;
        }
        self.raster.resize(w, h);
        Some(&mut self.raster)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Overlays
// ════════════════════════════════════════════════════════════════════════════

/// Portal rings at the centre, the key legend top-right and the status
/// label bottom-left.
pub fn draw_overlays(raster: &mut Raster, overlay: &Overlay) {
    let (w, h) = raster.dimensions();
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let span = w.min(h) as f32;

    raster.set_stroke(overlay.accent);
    for ticket in &overlay.tickets {
        let p = ticket.progress(overlay.now_ms);
        raster.set_alpha(1.0 - p);
        raster.set_line_width(1.0 + 4.0 * (1.0 - p));
        raster.stroke_circle(cx, cy, PORTAL_START + p * PORTAL_GROWTH * span);
    }
    raster.set_alpha(1.0);
    raster.set_line_width(1.0);

    let legend_x = w.saturating_sub(MARGIN + text_width(LEGEND, TEXT_SCALE));
    raster.draw_text(LEGEND, legend_x, MARGIN, TEXT_SCALE, LEGEND_COLOR);

    let color = if overlay.is_error { ERROR_COLOR } else { STATUS_COLOR };
    let y = h.saturating_sub(MARGIN + 5 * TEXT_SCALE);
    raster.draw_text(&overlay.status, MARGIN, y, TEXT_SCALE, color);
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
