//! Top-level application loop.
//!
//! `AppState` owns the tracking controller and the frame scheduler.  Each
//! frame it reads the latest pointer snapshot from the controller, lets the
//! scheduler smooth and step the field, and hands the current status and live
//! portal tickets to the visualizer for the overlays.

use std::time::Instant;

use anyhow::Result;
use tracing::info;

use particle_field::{
    CaptureDevice, FrameInputs, FrameOutcome, FrameScheduler, FrameSurface, HandTracker, Palette,
    Status, TrackingController,
};

use crate::config::{Config, ThemeConfig};
use crate::visualizer::{Overlay, UiEvent, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState<C, T> {
    controller: TrackingController<C, T>,
    scheduler:  FrameScheduler,
    theme:      ThemeConfig,
    epoch:      Instant,
}

impl<C, T> AppState<C, T>
where
    C: CaptureDevice,
    T: HandTracker<C::Frame>,
{
    pub fn new(config: &Config, device: C, tracker: T) -> Self {
        let mut controller = TrackingController::new(device, tracker, config.tracking_options());
        if config.tracking.start_active {
            controller.set_active(true);
        }

        AppState {
            controller,
            scheduler: FrameScheduler::new(Box::new(config.theme.clone())),
            theme:     config.theme.clone(),
            epoch:     Instant::now(),
        }
    }

    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::ToggleTracking => {
                let on = !self.controller.is_active();
                info!(on, "tracking toggled");
                self.controller.set_active(on);
            }
            UiEvent::Quit => self.scheduler.stop_handle().stop(),
        }
    }

    pub fn is_running(&self) -> bool { self.scheduler.is_running() }

    /// Run one frame against `surface`.
    pub fn frame(&mut self, surface: &mut dyn FrameSurface) -> FrameOutcome {
        let inputs = FrameInputs {
            pointer:      self.controller.pointer(),
            field_active: self.controller.is_active(),
            sim_time_ms:  self.epoch.elapsed().as_secs_f64() * 1000.0,
        };
        let outcome = self.scheduler.tick(surface, &inputs);

        // Landmarks are projected into whatever size the surface had last.
        if let FrameOutcome::Rendered { .. } = outcome {
            let (w, h) = self.scheduler.field().bounds();
            self.controller.set_bounds(w, h);
        }
        outcome
    }

    pub fn overlay(&self) -> Overlay {
        let status = self.controller.status();
        Overlay {
            is_error: matches!(status, Status::Error(_)),
            status:   status.to_string(),
            tickets:  self.controller.live_tickets(),
            now_ms:   self.controller.now_ms(),
            accent:   Palette::resolve(&self.theme).active,
        }
    }

    pub fn status(&self) -> Status { self.controller.status() }

    pub fn controller(&self) -> &TrackingController<C, T> { &self.controller }

    /// Stop tracking and wait for the worker to release its stream.
    pub fn shutdown(mut self) {
        self.controller.set_active(false);
        self.controller.join_workers();
        info!(frames = self.scheduler.frames(), "shut down");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Opens the window, picks the hand source (mouse simulation by default,
/// LeapMotion with `--features leap`) and drives the loop at ~60 fps until
/// the window closes or the user quits.
pub fn run(config: Config) -> Result<()> {
    #[cfg(feature = "leap")]
    {
        use crate::leap::{LeapCamera, LeapHandModel};
        info!("hand source: LeapMotion");
        return drive(config, LeapCamera, LeapHandModel, None);
    }

    #[cfg(not(feature = "leap"))]
    {
        use crate::sim::{SimCamera, SimHandModel};
        let (sim_tx, sim_rx) = std::sync::mpsc::channel();
        info!("hand source: mouse simulation (hold the left button to pinch)");
        drive(config, SimCamera::new(sim_rx), SimHandModel, Some(sim_tx))
    }
}

fn drive<C, T>(
    config:  Config,
    device:  C,
    tracker: T,
    sim_tx:  Option<std::sync::mpsc::Sender<crate::sim::SimInput>>,
) -> Result<()>
where
    C: CaptureDevice,
    T: HandTracker<C::Frame>,
{
    let mut vis = Visualizer::new(&config.window, sim_tx)?;
    let mut app = AppState::new(&config, device, tracker);

    while app.is_running() && vis.is_open() {
        for event in vis.poll_input() {
            app.handle(event);
        }

        match app.frame(&mut vis) {
            FrameOutcome::Rendered { .. } => vis.present(&app.overlay())?,
            FrameOutcome::NoSurface       => vis.idle(),
        }
    }

    app.shutdown();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
