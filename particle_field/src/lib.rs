//! # particle_field
//!
//! A grid of spring-anchored particles that react to a smoothed pointer, plus
//! a sliding-window recognizer for rapid vertical hand oscillation.
//!
//! ## Data flow
//!
//! ```text
//!  tracking worker                       frame loop
//!  ───────────────                       ──────────
//!  FrameStream ─► HandTracker            SharedPointer ─► Smoother
//!        │             │                                     │
//!        │        HandLandmarks                              ▼
//!        │             │                              ParticleField::step
//!        ▼             ▼                                     │
//!  PointerSample ─► SharedPointer                            ▼
//!  raw y ─► GestureRecognizer ─► PortalTickets             Canvas
//! ```
//!
//! ## Force model
//!
//! | Pointer | Inside radius (220px) | Outside radius |
//! |---|---|---|
//! | Open hand | repel, power 25 | ambient drift |
//! | Pinch | attract, power 12 | ambient drift |
//! | Absent / inactive | ambient drift | ambient drift |
//!
//! Every particle is always pulled back toward its home cell by a spring and
//! damped by friction, so the field settles when left alone.

pub mod canvas;
pub mod smoother;
pub mod particle;
pub mod field;
pub mod gesture;
pub mod portal;
pub mod pointer;
pub mod scheduler;
pub mod tracking;

pub use canvas::{Canvas, DefaultTheme, Glow, Palette, Rgb, ThemeProvider};
pub use field::ParticleField;
pub use gesture::GestureRecognizer;
pub use particle::Particle;
pub use pointer::{PointerMode, PointerSample, SharedPointer};
pub use portal::{PortalTicket, PortalTickets};
pub use scheduler::{FrameInputs, FrameOutcome, FrameScheduler, FrameSurface, StopHandle};
pub use smoother::Smoother;
pub use tracking::{
    CaptureDevice, CaptureError, FrameStream, HandLandmarks, HandTracker, Landmark, Status,
    TrackingController, TrackingError, TrackingOptions,
};
