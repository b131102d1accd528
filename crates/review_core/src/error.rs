//! Error types shared across the review core.

use std::path::PathBuf;
use thiserror::Error;

/// Opening a patient case failed; the caller has to pick another directory.
#[derive(Debug, Error)]
pub enum CaseLoadError {
    #[error("Case directory has no usable name: {0:?}")]
    NoPatientId(PathBuf),

    #[error("Case directory cannot be read: {path:?}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Case directory contains no series subdirectories: {0:?}")]
    NoSeries(PathBuf),

    #[error("First series has no recognized frames: {0}")]
    EmptyFirstSeries(#[source] SeriesLoadError),

    #[error("Saved labels cannot be read: {0}")]
    Annotations(#[source] StoreError),
}

/// A single series could not be turned into a frame set.
#[derive(Debug, Error)]
pub enum SeriesLoadError {
    #[error("Series directory cannot be read: {path:?}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("No decodable frames in {0:?}")]
    NoFrames(PathBuf),
}

/// Navigation was rejected or the target series failed to load.
#[derive(Debug, Error)]
pub enum NavigateError {
    #[error("Already at the first series")]
    AtFirst,

    #[error("Already at the last series")]
    AtLast,

    #[error("Series index {requested} is out of range (case has {len} series)")]
    OutOfRange { requested: usize, len: usize },

    #[error(transparent)]
    Load(#[from] SeriesLoadError),
}

/// Reading or writing the annotation/prediction files failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Could not replace {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

/// Loading the TOML configuration failed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file cannot be read: {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file is not valid TOML: {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors raised by [`crate::ReviewSession`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Series {series_id} has no prediction to accept")]
    NoPrediction { series_id: String },

    #[error(transparent)]
    Navigate(#[from] NavigateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
