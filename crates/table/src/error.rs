use std::path::PathBuf;

use physics::PhysicsError;
use render::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is empty", .0.display())]
    Empty(PathBuf),
    #[error("asset loader workers disconnected")]
    LoaderDisconnected,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Problems found while parsing a gesture script
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("unknown gesture `{0}`")]
    UnknownGesture(String),
    #[error("malformed script entry `{0}`, expected gesture@press-release")]
    Malformed(String),
    #[error("entry `{0}` releases before it presses")]
    ReleaseBeforePress(String),
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("scene node {0:?} does not exist")]
    UnknownNode(NodeId),
}
