//! Error types.
//!
//! Only configuration and startup errors are fatal. Everything that can go
//! wrong during a refresh tick ([`FetchError`], a missing scene element) is
//! handled per plant by the refresh cycle and never escapes it.

use std::path::PathBuf;

use thiserror::Error;

/// Grid layout could not be computed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    #[error("cannot lay out a grid for zero plants")]
    NoPlants,
}

/// Scene graph mutation failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene is full ({capacity} elements)")]
    Full { capacity: usize },
    #[error("slot {0} is not registered in the scene")]
    UnknownSlot(usize),
}

/// A single plant's reading could not be fetched or decoded.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("feed returned HTTP {0}")]
    Status(u16),
    #[error("could not decode feed payload: {0}")]
    Decode(String),
    #[error("malformed reading {0:?}")]
    Malformed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Configuration could not be loaded or is unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("no plants configured")]
    NoPlants,
    #[error("{count} plants configured, at most {max} fit on the display")]
    TooManyPlants { count: usize, max: usize },
    #[error("plant name {0:?} is longer than {} characters", crate::config::NAME_MAX_LEN)]
    NameTooLong(String),
    #[error("Adafruit IO credentials missing (set AIO_USERNAME and AIO_KEY)")]
    MissingCredentials,
}

/// Startup or driver failure. Fatal to the binary.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("cannot set up feed client: {0}")]
    Feed(#[from] FetchError),
    #[error("cannot write snapshot {}: {message}", .path.display())]
    Snapshot { path: PathBuf, message: String },
}
