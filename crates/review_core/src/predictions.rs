use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Automated view prediction for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    /// Model confidence as written in the predictions file.
    pub confidence: String,
}

impl Prediction {
    /// Confidence as a number, when the file holds one.
    pub fn confidence_value(&self) -> Option<f64> {
        self.confidence.parse().ok()
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.confidence)
    }
}

#[derive(Debug, Deserialize)]
struct PredictionRow {
    #[serde(rename = "Series ID")]
    series_id: String,
    #[serde(rename = "Predicted View")]
    label: String,
    #[serde(rename = "Confidence")]
    confidence: String,
}

/// Read-only series-id to prediction mapping.
#[derive(Debug, Default)]
pub struct PredictionStore {
    predictions: HashMap<String, Prediction>,
    source: Option<PathBuf>,
}

impl PredictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mapping with the rows of `path`.
    ///
    /// A missing or unreadable file leaves the store empty; malformed rows
    /// are skipped. Returns the number of predictions loaded.
    pub fn load(&mut self, path: impl AsRef<Path>) -> usize {
        let path = path.as_ref();
        self.predictions.clear();
        self.source = Some(path.to_path_buf());

        let mut rdr = match csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Could not read predictions file {}: {e}", path.display());
                return 0;
            }
        };

        for (idx, row) in rdr.deserialize::<PredictionRow>().enumerate() {
            match row {
                Ok(row) => {
                    self.predictions.insert(
                        row.series_id,
                        Prediction {
                            label: row.label,
                            confidence: row.confidence,
                        },
                    );
                }
                Err(e) => {
                    tracing::warn!("Skipping prediction row {}: {e}", idx + 1);
                }
            }
        }
        tracing::info!(
            "Loaded {} predictions from {}",
            self.predictions.len(),
            path.display()
        );
        self.predictions.len()
    }

    pub fn get(&self, series_id: &str) -> Option<&Prediction> {
        self.predictions.get(series_id)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}
