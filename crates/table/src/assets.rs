//! # Asset Loader
//!
//! Models are loaded off the frame loop. Requests go to a driver thread that
//! owns a small rayon pool, and completions are queued on a channel; the
//! simulation drains the queue once per frame, so a model can appear several
//! frames after the body it decorates. There is no cache and no retry: every
//! request reads its file again, and a failure only drops that one
//! attachment.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use glam::{Quat, Vec3};
use render::NodeId;

use crate::error::AssetError;

/// Opaque handle to a loaded model file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneFragment {
    pub source: PathBuf,
    pub byte_len: usize,
}

/// Local transform given to a fragment once attached
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Placement {
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn with_yaw(self, yaw: f32) -> Self {
        self.with_orientation(Quat::from_rotation_y(yaw))
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vec3::splat(scale))
    }
}

/// What to load and where to hang it
#[derive(Clone, Debug, PartialEq)]
pub struct AssetRequest {
    pub path: String,
    /// Parent node, or the scene root when `None`
    pub parent: Option<NodeId>,
    pub placement: Placement,
}

impl AssetRequest {
    #[must_use]
    pub fn new(path: impl Into<String>, parent: Option<NodeId>, placement: Placement) -> Self {
        Self {
            path: path.into(),
            parent,
            placement,
        }
    }
}

/// A finished request, successful or not
#[derive(Debug)]
pub struct LoadedAsset {
    pub request: AssetRequest,
    pub result: Result<SceneFragment, AssetError>,
}

/// Worker threads reading model files
pub const LOADER_THREADS: usize = 4;

pub struct AssetLoader {
    root: PathBuf,
    requests: Sender<(PathBuf, AssetRequest)>,
    completed: Receiver<LoadedAsset>,
    in_flight: usize,
}

impl AssetLoader {
    /// Start the loader's driver thread. If the driver cannot be started,
    /// every later request is dropped with a warning.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let (requests, request_rx) = mpsc::channel::<(PathBuf, AssetRequest)>();
        let (result_tx, completed) = mpsc::channel::<LoadedAsset>();

        // The driver thread owns the pool and dispatches reads into it
        let driver = thread::Builder::new()
            .name("asset-driver".into())
            .spawn(move || drive(&request_rx, &result_tx));
        if let Err(e) = driver {
            tracing::error!("Failed to start asset loader: {e}");
        }

        Self {
            root: root.into(),
            requests,
            completed,
            in_flight: 0,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Requests issued but not yet drained
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Fire and forget: the file is read on a pool thread.
    pub fn request(&mut self, request: AssetRequest) {
        let path = self.root.join(&request.path);
        tracing::debug!("Loading asset {}", path.display());
        match self.requests.send((path, request)) {
            Ok(()) => self.in_flight += 1,
            Err(mpsc::SendError((path, _))) => {
                tracing::warn!("Asset loader is down, dropping {}", path.display());
            }
        }
    }

    /// Every completion queued so far, without blocking.
    pub fn poll(&mut self) -> Vec<LoadedAsset> {
        let completed: Vec<LoadedAsset> = self.completed.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(completed.len());
        completed
    }

    /// Block until every request has completed or `timeout` passes.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::LoaderDisconnected`] if the driver stops while
    /// requests are still outstanding.
    pub fn wait_idle(&mut self, timeout: Duration) -> Result<Vec<LoadedAsset>, AssetError> {
        let deadline = Instant::now() + timeout;
        let mut completed = Vec::new();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.completed.recv_timeout(remaining) {
                Ok(loaded) => {
                    self.in_flight -= 1;
                    completed.push(loaded);
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return Err(AssetError::LoaderDisconnected),
            }
        }
        Ok(completed)
    }
}

fn drive(requests: &Receiver<(PathBuf, AssetRequest)>, results: &Sender<LoadedAsset>) {
    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(LOADER_THREADS)
        .thread_name(|i| format!("asset-loader-{i}"))
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to build asset loader pool: {e}");
            return;
        }
    };

    while let Ok((path, request)) = requests.recv() {
        let results = results.clone();
        pool.spawn(move || {
            let result = load_fragment(&path);
            // The loader may already be gone; nobody is left to tell
            let _ = results.send(LoadedAsset { request, result });
        });
    }
}

/// Read a model file into a fragment handle.
///
/// # Errors
///
/// Fails when the file cannot be read or holds no bytes.
pub fn load_fragment(path: &Path) -> Result<SceneFragment, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(AssetError::Empty(path.to_path_buf()));
    }
    Ok(SceneFragment {
        source: path.to_path_buf(),
        byte_len: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_driver_reports_disconnect() {
        let (requests, _request_rx) = mpsc::channel();
        let (result_tx, completed) = mpsc::channel::<LoadedAsset>();
        drop(result_tx);
        let mut loader = AssetLoader {
            root: PathBuf::from("."),
            requests,
            completed,
            in_flight: 1,
        };

        assert!(matches!(
            loader.wait_idle(Duration::from_secs(1)),
            Err(AssetError::LoaderDisconnected)
        ));
    }

    #[test]
    fn dropped_driver_refuses_requests() {
        let (requests, request_rx) = mpsc::channel();
        let (_result_tx, completed) = mpsc::channel::<LoadedAsset>();
        drop(request_rx);
        let mut loader = AssetLoader {
            root: PathBuf::from("."),
            requests,
            completed,
            in_flight: 0,
        };

        loader.request(AssetRequest::new("models/ball.glb", None, Placement::default()));
        assert_eq!(loader.in_flight(), 0);
    }
}
