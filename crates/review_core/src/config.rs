use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime settings for a review session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Directory that holds `{patient_id}_annotations.csv`.
    pub output_dir: PathBuf,
    /// Edge length of the square display frame.
    pub display_size: u32,
    /// Autosave after every N label assignments; 0 disables autosave.
    pub autosave_every: u32,
    /// Duration of one full cine loop in milliseconds.
    pub cine_period_ms: u64,
    /// Extension of per-frame files inside a series directory.
    pub frame_extension: String,
    /// Move to the next series after a label button is used.
    pub advance_after_label: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
            display_size: 356,
            autosave_every: 10,
            cine_period_ms: 1000,
            frame_extension: "dcm".to_string(),
            advance_after_label: true,
        }
    }
}

impl ReviewConfig {
    /// Parse a TOML file. Missing keys fall back to their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`ReviewConfig::from_file`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Canonical annotation file for a patient.
    pub fn annotation_path(&self, patient_id: &str) -> PathBuf {
        self.output_dir.join(format!("{patient_id}_annotations.csv"))
    }
}
