//! Per-frame view labels with CSV persistence and count-triggered autosave.
//!
//! Labels are stored per frame identifier for file compatibility, but are
//! always written for the full frame set of one series at a time, so every
//! frame of a series carries the same label.

use crate::error::StoreError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const HEADER: [&str; 2] = ["File", "Label"];

/// What an assignment did to the stored labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelChange {
    /// None of the frames had a label yet.
    Added,
    /// At least one frame carried a different label.
    Updated,
    /// Every frame already had this label.
    Unchanged,
}

/// Result of the autosave check that follows every assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveStatus {
    NotDue,
    Saved(PathBuf),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignOutcome {
    pub change: LabelChange,
    pub autosave: AutosaveStatus,
}

/// Counts assignments since the case was opened and reports every Nth one.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutosaveCounter {
    count: u64,
    every: u32,
}

impl AutosaveCounter {
    /// `every == 0` never fires.
    pub fn new(every: u32) -> Self {
        Self { count: 0, every }
    }

    /// Count one assignment; true when a save is due.
    pub fn record(&mut self) -> bool {
        self.count += 1;
        self.every != 0 && self.count % u64::from(self.every) == 0
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

#[derive(Debug, Default)]
pub struct AnnotationStore {
    labels: BTreeMap<String, String>,
    counter: AutosaveCounter,
    autosave_path: Option<PathBuf>,
}

impl AnnotationStore {
    /// Empty store without autosave.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store that saves to `path` after every `every` assignments.
    pub fn with_autosave(path: impl Into<PathBuf>, every: u32) -> Self {
        Self {
            labels: BTreeMap::new(),
            counter: AutosaveCounter::new(every),
            autosave_path: Some(path.into()),
        }
    }

    /// Merge rows from `path` into the mapping and return how many were read.
    ///
    /// A missing file is not an error: the store keeps its current content.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<usize, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("No previously saved labels at {}", path.display());
            return Ok(0);
        }

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| csv_err(path, source))?;

        let mut loaded = 0;
        for record in rdr.records() {
            let record = record.map_err(|source| csv_err(path, source))?;
            match (record.get(0), record.get(1)) {
                (Some(file), Some(label)) if !file.is_empty() => {
                    self.labels.insert(file.to_string(), normalize_label(label));
                    loaded += 1;
                }
                _ => tracing::warn!("Skipping malformed annotation row in {}", path.display()),
            }
        }
        tracing::info!("Loaded {loaded} labels from {}", path.display());
        Ok(loaded)
    }

    /// Write the full mapping to `path` through a temporary file and rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|source| io_err(dir, source))?;

        let tmp = NamedTempFile::new_in(dir).map_err(|source| io_err(dir, source))?;
        {
            let mut wtr = csv::Writer::from_writer(tmp.as_file());
            wtr.write_record(HEADER)
                .map_err(|source| csv_err(path, source))?;
            for (file, label) in &self.labels {
                wtr.write_record([file.as_str(), label.as_str()])
                    .map_err(|source| csv_err(path, source))?;
            }
            wtr.flush().map_err(|source| io_err(path, source))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|source| io_err(path, source))?;
        tmp.persist(path).map_err(|source| StoreError::Persist {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Saved {} labels to {}", self.labels.len(), path.display());
        Ok(())
    }

    /// Give every frame of one series the same upper-cased label.
    ///
    /// The autosave counter advances even when nothing changed.
    pub fn assign<I, S>(&mut self, frame_ids: I, label: &str) -> AssignOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let label = normalize_label(label);
        let ids: Vec<String> = frame_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect();

        let change = if ids
            .iter()
            .all(|id| self.labels.get(id).is_some_and(|l| *l == label))
        {
            tracing::debug!("Labels already set to {label}");
            LabelChange::Unchanged
        } else {
            let had_any = ids.iter().any(|id| self.labels.contains_key(id));
            for id in ids {
                self.labels.insert(id, label.clone());
            }
            if had_any {
                LabelChange::Updated
            } else {
                LabelChange::Added
            }
        };

        let autosave = self.autosave_if_due();
        AssignOutcome { change, autosave }
    }

    fn autosave_if_due(&mut self) -> AutosaveStatus {
        if !self.counter.record() {
            return AutosaveStatus::NotDue;
        }
        let Some(path) = self.autosave_path.clone() else {
            return AutosaveStatus::NotDue;
        };
        match self.save(&path) {
            Ok(()) => {
                tracing::info!("Autosaved after {} assignments", self.counter.count());
                AutosaveStatus::Saved(path)
            }
            Err(e) => {
                tracing::warn!("Autosave failed: {e}");
                AutosaveStatus::Failed(e.to_string())
            }
        }
    }

    pub fn label_for(&self, frame_id: &str) -> Option<&str> {
        self.labels.get(frame_id).map(String::as_str)
    }

    pub fn autosave_path(&self) -> Option<&Path> {
        self.autosave_path.as_deref()
    }

    pub fn assignments(&self) -> u64 {
        self.counter.count()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().to_uppercase()
}

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_err(path: &Path, source: csv::Error) -> StoreError {
    StoreError::Csv {
        path: path.to_path_buf(),
        source,
    }
}
