//! hand_portal — interactive entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hand_portal::app::run;
use hand_portal::config::Config;

/// Command-line arguments for hand_portal
#[derive(Parser, Debug)]
#[command(name = "hand_portal")]
#[command(version, about = "Pointer-reactive particle field driven by hand tracking", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "hand_portal.toml")]
    pub config: PathBuf,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Window width, overriding the config file
    #[arg(long)]
    pub width: Option<usize>,

    /// Window height, overriding the config file
    #[arg(long)]
    pub height: Option<usize>,

    /// Start hand tracking immediately
    #[arg(long)]
    pub active: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    info!("hand_portal v{}", env!("CARGO_PKG_VERSION"));
    #[cfg(feature = "leap")]
    info!("mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    info!("mode: mouse simulation (use --features leap for hardware)");

    let config = Config::load_or_default(&args.config)?
        .with_overrides(args.width, args.height, args.active);
    config.validate()?;
    tracing::debug!(?config, "configuration loaded");

    run(config)
}

fn init_logging(args: &Args) {
    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "hand_portal={level},particle_field={level},warn",
            level = log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();
}
