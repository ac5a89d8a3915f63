//! # Pinball Runtime
//!
//! Entry point for the pinball binary. By default the table runs headless
//! for a fixed number of frames, optionally replaying a gesture script.
//! Built with the `render` feature, `--window` opens a window and takes
//! input from the keyboard instead.

mod app;
mod watcher;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use table::{InputScript, TableConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pinball", version, about = "Simulate a pinball table")]
struct Args {
    /// JSON table config; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Frames to simulate in headless mode
    #[arg(long, default_value_t = 600)]
    frames: u64,
    /// Gesture timeline, e.g. "charge@0.0-1.0,left@2.0-2.3"
    #[arg(long)]
    script: Option<String>,
    /// Reload actuator settings whenever the config file changes
    #[arg(long, requires = "config")]
    watch: bool,
    /// Open a window (needs the `render` feature)
    #[arg(long)]
    window: bool,
    /// Log the ball every this many frames; 0 disables
    #[arg(long, default_value_t = 60)]
    log_every: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TableConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TableConfig::default(),
    };
    let script = match &args.script {
        Some(text) => text.parse::<InputScript>().context("invalid --script")?,
        None => InputScript::default(),
    };

    app::run(app::RunOptions {
        config,
        config_path: args.config,
        frames: args.frames,
        script,
        watch: args.watch,
        window: args.window,
        log_every: args.log_every,
    })
}
