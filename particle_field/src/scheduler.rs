//! Per-frame driver: smoother, then field step, once per display refresh.
//!
//! The scheduler does not own a timer.  The host loop paces it (the desktop
//! shell relies on the window's update-rate limit) and calls [`tick`] once per
//! refresh until the [`StopHandle`] is raised.
//!
//! [`tick`]: FrameScheduler::tick

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::canvas::{Canvas, Palette, ThemeProvider};
use crate::field::ParticleField;
use crate::pointer::PointerSample;
use crate::smoother::Smoother;

/// Something that may or may not have a drawable surface this frame.
pub trait FrameSurface {
    /// `None` when the surface is currently unavailable (closed, minimised,
    /// zero-sized).  The scheduler skips the frame and tries again next tick.
    fn canvas(&mut self) -> Option<&mut dyn Canvas>;
}

/// Everything a frame reads from outside the render loop.
#[derive(Clone, Copy, Debug)]
pub struct FrameInputs {
    pub pointer:      PointerSample,
    pub field_active: bool,
    pub sim_time_ms:  f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered { particles: usize },
    NoSurface,
}

/// Cloneable cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) { self.0.store(true, Ordering::Release); }
    pub fn is_stopped(&self) -> bool { self.0.load(Ordering::Acquire) }
}

pub struct FrameScheduler {
    field:    ParticleField,
    smoother: Smoother,
    theme:    Box<dyn ThemeProvider>,
    stop:     StopHandle,
    frames:   u64,
}

impl FrameScheduler {
    pub fn new(theme: Box<dyn ThemeProvider>) -> Self {
        FrameScheduler {
            field:    ParticleField::default(),
            smoother: Smoother::new(),
            theme,
            stop:     StopHandle::default(),
            frames:   0,
        }
    }

    pub fn stop_handle(&self) -> StopHandle { self.stop.clone() }

    pub fn is_running(&self) -> bool { !self.stop.is_stopped() }

    /// Run one simulation and render pass.
    ///
    /// The smoother always advances before the field reads it.  A missing
    /// surface skips the frame without touching any state.
    pub fn tick(&mut self, surface: &mut dyn FrameSurface, inputs: &FrameInputs) -> FrameOutcome {
        let Some(canvas) = surface.canvas() else {
            return FrameOutcome::NoSurface;
        };

        let (w, h) = canvas.dimensions();
        self.field.resize_if_needed(w as f32, h as f32);

        // Resolved fresh every frame; the theme may change underneath us.
        let palette = Palette::resolve(self.theme.as_ref());

        self.smoother.update(Smoother::target_for(&inputs.pointer, inputs.field_active));

        canvas.clear();
        self.field.step(
            canvas,
            self.smoother.position(),
            &inputs.pointer,
            inputs.field_active,
            &palette,
            inputs.sim_time_ms,
        );

        self.frames += 1;
        FrameOutcome::Rendered { particles: self.field.len() }
    }

    pub fn field(&self) -> &ParticleField { &self.field }
    pub fn smoother(&self) -> &Smoother { &self.smoother }
    pub fn frames(&self) -> u64 { self.frames }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::tests::{Op, Recorder};
    use crate::canvas::{DefaultTheme, Rgb};
    use crate::pointer::PointerMode;
    use crate::smoother::OFFSCREEN;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Surface(Option<Recorder>);

    impl FrameSurface for Surface {
        fn canvas(&mut self) -> Option<&mut dyn Canvas> {
            self.0.as_mut().map(|r| r as &mut dyn Canvas)
        }
    }

    fn inputs(pointer: PointerSample, field_active: bool) -> FrameInputs {
        FrameInputs { pointer, field_active, sim_time_ms: 0.0 }
    }

    #[test]
    fn missing_surface_skips_without_state_change() {
        let mut sched = FrameScheduler::new(Box::new(DefaultTheme));
        let mut surface = Surface(None);
        let pointer = PointerSample::at(100.0, 100.0, PointerMode::Open);

        assert_eq!(sched.tick(&mut surface, &inputs(pointer, true)), FrameOutcome::NoSurface);
        assert_eq!(sched.smoother().position(), OFFSCREEN);
        assert_eq!(sched.frames(), 0);
        assert!(sched.is_running(), "a missing surface must not stop the loop");

        surface.0 = Some(Recorder::new(300, 300));
        assert_eq!(
            sched.tick(&mut surface, &inputs(pointer, true)),
            FrameOutcome::Rendered { particles: 100 },
        );
    }

    #[test]
    fn idle_frames_still_animate() {
        let mut sched = FrameScheduler::new(Box::new(DefaultTheme));
        let mut surface = Surface(Some(Recorder::new(120, 120)));
        let absent = PointerSample::default();
        for frame in 0..30 {
            let inp = FrameInputs { pointer: absent, field_active: false, sim_time_ms: frame as f64 * 16.0 };
            sched.tick(&mut surface, &inp);
        }
        assert!(sched.field().particles().iter().any(|p| p.speed() > 0.0));
    }

    #[test]
    fn smoother_advances_before_step() {
        let mut sched = FrameScheduler::new(Box::new(DefaultTheme));
        let mut surface = Surface(Some(Recorder::new(300, 300)));
        let pointer = PointerSample::at(100.0, 100.0, PointerMode::Open);
        sched.tick(&mut surface, &inputs(pointer, true));

        // One update from (-1000,-1000) toward (100,100).
        let expected = -1000.0 + 1100.0 * 0.2;
        let (sx, sy) = sched.smoother().position();
        assert!((sx - expected).abs() < 1e-3 && (sy - expected).abs() < 1e-3);

        // The reticule was drawn at the already-updated position.
        let ring = surface.0.as_ref().and_then(|r| {
            r.ops.iter().find_map(|op| match op {
                Op::Ring { x, y, .. } => Some((*x, *y)),
                _ => None,
            })
        });
        assert_eq!(ring, Some((sx, sy)));
    }

    #[test]
    fn frame_clears_before_drawing() {
        let mut sched = FrameScheduler::new(Box::new(DefaultTheme));
        let mut surface = Surface(Some(Recorder::new(60, 60)));
        sched.tick(&mut surface, &inputs(PointerSample::default(), false));
        let ops = &surface.0.as_ref().map(|r| r.ops.clone()).unwrap_or_default();
        assert_eq!(ops.first(), Some(&Op::Clear));
        assert_eq!(ops.len(), 1 + 4);
    }

    #[test]
    fn resizes_follow_surface() {
        let mut sched = FrameScheduler::new(Box::new(DefaultTheme));
        let mut surface = Surface(Some(Recorder::new(90, 90)));
        sched.tick(&mut surface, &inputs(PointerSample::default(), false));
        assert_eq!(sched.field().len(), 9);

        surface.0 = Some(Recorder::new(180, 90));
        sched.tick(&mut surface, &inputs(PointerSample::default(), false));
        assert_eq!(sched.field().len(), 18);
    }

    /// Theme that answers every name with black on even frames and white on
    /// odd ones.  `idle` is the first name looked up in a frame.
    struct FlipTheme(Rc<Cell<bool>>);

    impl ThemeProvider for FlipTheme {
        fn resolve(&self, name: &str) -> Option<String> {
            if name == crate::canvas::THEME_IDLE {
                self.0.set(!self.0.get());
            }
            Some(if self.0.get() { "#000000" } else { "#ffffff" }.to_string())
        }
    }

    #[test]
    fn palette_is_resolved_every_frame() {
        let flag = Rc::new(Cell::new(false));
        let mut sched = FrameScheduler::new(Box::new(FlipTheme(flag)));
        let mut surface = Surface(Some(Recorder::new(30, 30)));
        let idle = inputs(PointerSample::default(), false);

        let mut colors = Vec::new();
        for _ in 0..2 {
            sched.tick(&mut surface, &idle);
            if let Some(rec) = surface.0.as_mut() {
                colors.extend(rec.fills().map(|op| match op {
                    Op::Fill { color, .. } => *color,
                    _ => unreachable!(),
                }));
                rec.ops.clear();
            }
        }
        assert_eq!(colors, vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)]);
    }

    #[test]
    fn stop_handle_is_shared() {
        let sched = FrameScheduler::new(Box::new(DefaultTheme));
        let handle = sched.stop_handle();
        assert!(sched.is_running());
        handle.stop();
        assert!(!sched.is_running());
    }
}
