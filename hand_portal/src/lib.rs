//! # hand_portal
//!
//! Desktop shell for [`particle_field`]: a resizable software-rendered window
//! whose particle grid reacts to a tracked hand.
//!
//! ## Hand → field mapping
//!
//! | Hand | Field |
//! |---|---|
//! | Open hand | Particles within 220px are pushed away |
//! | Pinch (thumb and index tips together) | Particles within 220px are pulled in |
//! | Fast vertical wave | A portal ring opens at the centre for 2s |
//! | No hand / tracking off | Particles drift gently around their homes |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: the mouse is the hand.  Hold the left
//!   button to pinch; shake the cursor up and down to open a portal.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Keys
//!
//! | Key | Action |
//! |---|---|
//! | `Space` | Start / stop hand tracking |
//! | `Q` / `Escape` | Quit |

pub mod config;
pub mod raster;
pub mod sim;
pub mod visualizer;
pub mod app;

#[cfg(feature = "leap")]
pub mod leap;
