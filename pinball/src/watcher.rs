//! # Config Hot-Reloading
//!
//! Watches the table config file with [`notify`]. Every modification is
//! parsed on the watcher's thread and, if valid, handed to the frame loop
//! over a channel. The loop picks up the newest config between frames, so
//! live changes never race the frame in progress.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use table::TableConfig;
use tracing::{error, info, warn};

/// Keeps the watcher alive and exposes the parsed configs it produced
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    updates: Receiver<TableConfig>,
}

impl ConfigWatcher {
    /// Newest config received since the last call, if any.
    pub fn latest(&self) -> Option<TableConfig> {
        self.updates.try_iter().last()
    }
}

/// Start watching `path`.
///
/// The parent directory is watched rather than the file itself, so editors
/// that save by replacing the file are still seen.
///
/// # Errors
///
/// Fails when the watcher cannot be created or the directory watched.
pub fn start(path: &Path) -> Result<ConfigWatcher> {
    let path = path
        .canonicalize()
        .with_context(|| format!("config file {} not found", path.display()))?;
    let directory = path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let file_name = path.file_name().map(OsString::from).unwrap_or_default();

    let (sender, updates) = mpsc::channel();
    let target = path.clone();
    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        match result {
            Ok(event) => handle_event(&event, &target, &file_name, &sender),
            Err(e) => error!("Config watcher error: {e:?}"),
        }
    })
    .context("failed to create config watcher")?;

    watcher
        .watch(&directory, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", directory.display()))?;

    info!("Watching {} for changes", path.display());
    Ok(ConfigWatcher {
        _watcher: watcher,
        updates,
    })
}

fn handle_event(event: &Event, target: &Path, file_name: &OsString, sender: &Sender<TableConfig>) {
    if !event.kind.is_modify() && !event.kind.is_create() {
        return;
    }
    let touched = event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name.as_os_str()));
    if !touched {
        return;
    }
    match TableConfig::from_path(target) {
        Ok(config) => {
            info!("Config {} changed, queuing reload", target.display());
            // The loop may have exited already
            let _ = sender.send(config);
        }
        Err(e) => warn!("Ignoring config change: {e}"),
    }
}
