//! Patient case scanning and series-by-series navigation.
//!
//! Only the series at the current position is decoded. Moving to another
//! series decodes all of its frames again; nothing is cached between moves.

use crate::error::{CaseLoadError, NavigateError, SeriesLoadError};
use crate::frame::{self, Window};
use crate::reader::FrameReader;
use image::GrayImage;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One display-ready frame and the file it came from.
#[derive(Debug, Clone)]
pub struct Frame {
    /// `<series dir>/<file name>`; the annotation key.
    pub file_id: String,
    pub image: GrayImage,
}

/// The decoded series at the navigator's current position.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series_id: String,
    pub description: String,
    pub pulse_sequence: String,
    pub window: Window,
    pub frames: Vec<Frame>,
}

impl LoadedSeries {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_ids(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().map(|f| f.file_id.as_str())
    }
}

/// A patient directory and its series subdirectories in name order.
#[derive(Debug, Clone)]
pub struct PatientCase {
    pub patient_id: String,
    pub root: PathBuf,
    pub series_dirs: Vec<PathBuf>,
}

impl PatientCase {
    /// List the series subdirectories of `dir`.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self, CaseLoadError> {
        let root = dir.as_ref();
        let mut series_dirs = Vec::new();
        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| CaseLoadError::Unreadable {
                path: root.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_dir() {
                series_dirs.push(entry.into_path());
            }
        }
        if series_dirs.is_empty() {
            return Err(CaseLoadError::NoSeries(root.to_path_buf()));
        }

        let patient_id = patient_id_for(root)
            .ok_or_else(|| CaseLoadError::NoPatientId(root.to_path_buf()))?;
        Ok(Self {
            patient_id,
            root: root.to_path_buf(),
            series_dirs,
        })
    }

    pub fn len(&self) -> usize {
        self.series_dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series_dirs.is_empty()
    }
}

fn patient_id_for(root: &Path) -> Option<String> {
    let named = |p: &Path| {
        p.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
    };
    named(root).or_else(|| root.canonicalize().ok().as_deref().and_then(named))
}

/// Decode every recognized frame file of one series directory.
///
/// Files the reader rejects are skipped with a warning; a series with no
/// decodable frame is an error.
pub fn load_series(
    dir: &Path,
    reader: &dyn FrameReader,
    display_size: u32,
) -> Result<LoadedSeries, SeriesLoadError> {
    let mut frames = Vec::new();
    let mut meta = None;
    let dir_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| SeriesLoadError::Unreadable {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || !reader.accepts(path) {
            continue;
        }

        let raw = match reader.read_frame(path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Skipping frame {}: {e:#}", path.display());
                continue;
            }
        };
        let window = raw
            .window
            .unwrap_or_else(|| Window::from_range(&raw.pixels));
        frames.push(Frame {
            file_id: format!("{dir_name}/{}", entry.file_name().to_string_lossy()),
            image: frame::process(&raw.pixels, window, display_size),
        });
        if meta.is_none() {
            meta = Some((raw.series_id, raw.description, raw.pulse_sequence, window));
        }
    }

    let Some((series_id, description, pulse_sequence, window)) = meta else {
        return Err(SeriesLoadError::NoFrames(dir.to_path_buf()));
    };
    let series_id = series_id.unwrap_or(dir_name);

    tracing::info!("Loaded series {series_id}: {} frames", frames.len());
    Ok(LoadedSeries {
        series_id,
        description,
        pulse_sequence,
        window,
        frames,
    })
}

/// Ordered series list, current position and the decoded current series.
pub struct SeriesNavigator {
    case: PatientCase,
    position: usize,
    current: LoadedSeries,
    reader: Box<dyn FrameReader>,
    display_size: u32,
}

impl SeriesNavigator {
    /// Scan `dir` and decode its first series.
    pub fn open_case(
        dir: impl AsRef<Path>,
        reader: Box<dyn FrameReader>,
        display_size: u32,
    ) -> Result<Self, CaseLoadError> {
        let case = PatientCase::scan(dir)?;
        let current = load_series(&case.series_dirs[0], reader.as_ref(), display_size)
            .map_err(CaseLoadError::EmptyFirstSeries)?;
        tracing::info!(
            "Opened case {} with {} series",
            case.patient_id,
            case.len()
        );
        Ok(Self {
            case,
            position: 0,
            current,
            reader,
            display_size,
        })
    }

    pub fn forward(&mut self) -> Result<(), NavigateError> {
        if !self.can_forward() {
            return Err(NavigateError::AtLast);
        }
        self.load_at(self.position + 1)
    }

    pub fn back(&mut self) -> Result<(), NavigateError> {
        if !self.can_back() {
            return Err(NavigateError::AtFirst);
        }
        self.load_at(self.position - 1)
    }

    /// Move to `index`, reloading even when it is the current position.
    pub fn jump_to(&mut self, index: usize) -> Result<(), NavigateError> {
        if index >= self.case.len() {
            return Err(NavigateError::OutOfRange {
                requested: index,
                len: self.case.len(),
            });
        }
        self.load_at(index)
    }

    fn load_at(&mut self, index: usize) -> Result<(), NavigateError> {
        let series = load_series(
            &self.case.series_dirs[index],
            self.reader.as_ref(),
            self.display_size,
        )?;
        self.current = series;
        self.position = index;
        Ok(())
    }

    pub fn can_forward(&self) -> bool {
        self.position + 1 < self.case.len()
    }

    pub fn can_back(&self) -> bool {
        self.position > 0
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.case.len()
    }

    pub fn is_empty(&self) -> bool {
        self.case.is_empty()
    }

    pub fn case(&self) -> &PatientCase {
        &self.case
    }

    pub fn current(&self) -> &LoadedSeries {
        &self.current
    }

    pub fn current_series_id(&self) -> &str {
        &self.current.series_id
    }
}
