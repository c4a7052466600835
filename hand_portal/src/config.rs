//! Configuration management
//!
//! Loaded from a TOML file; every section and key is optional and falls back
//! to the defaults below.  CLI flags override the file.
//!
//! ```toml
//! [window]
//! width  = 1000
//! height = 700
//! title  = "hand portal"
//!
//! [theme]
//! active = "#22d3ee"
//! pinch  = "rgb(244, 114, 182)"
//!
//! [tracking]
//! mirror           = true
//! poll_interval_ms = 16
//! start_active     = false
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use particle_field::canvas::{THEME_ACTIVE, THEME_ACTIVE_IDLE, THEME_IDLE, THEME_PINCH};
use particle_field::{ThemeProvider, TrackingOptions};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window:   WindowConfig,
    pub theme:    ThemeConfig,
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width:  usize,
    pub height: usize,
    pub title:  String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig { width: 1000, height: 700, title: "hand portal".to_string() }
    }
}

/// The four named colors.  Unset or unparsable entries fall back to the
/// built-in palette.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub idle:        Option<String>,
    pub active_idle: Option<String>,
    pub active:      Option<String>,
    pub pinch:       Option<String>,
}

impl ThemeProvider for ThemeConfig {
    fn resolve(&self, name: &str) -> Option<String> {
        match name {
            THEME_IDLE        => self.idle.clone(),
            THEME_ACTIVE_IDLE => self.active_idle.clone(),
            THEME_ACTIVE      => self.active.clone(),
            THEME_PINCH       => self.pinch.clone(),
            _                 => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Flip landmark x so the pointer follows the hand like a mirror.
    pub mirror:           bool,
    pub poll_interval_ms: u64,
    /// Start tracking as soon as the window opens.
    pub start_active:     bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        TrackingConfig { mirror: true, poll_interval_ms: 16, start_active: false }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file means defaults.
    /// A file that exists and is broken is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Config::default());
        }
        Config::load(path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            bail!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            );
        }
        if self.tracking.poll_interval_ms == 0 {
            bail!("tracking.poll_interval_ms must be at least 1");
        }
        Ok(())
    }

    /// Apply command-line overrides on top of the file.
    pub fn with_overrides(mut self, width: Option<usize>, height: Option<usize>, active: bool) -> Self {
        if let Some(w) = width  { self.window.width  = w; }
        if let Some(h) = height { self.window.height = h; }
        if active { self.tracking.start_active = true; }
        self
    }

    pub fn tracking_options(&self) -> TrackingOptions {
        TrackingOptions {
            mirror:        self.tracking.mirror,
            poll_interval: Duration::from_millis(self.tracking.poll_interval_ms),
            bounds:        (self.window.width as f32, self.window.height as f32),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
