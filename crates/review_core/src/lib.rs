//! Core of the series view-labelling tool.
//!
//! A patient directory holds one subdirectory per image series and one DICOM
//! file per frame. [`ReviewSession`] opens such a case, turns the frames of
//! the current series into fixed-size display images, keeps one view label
//! per series in a CSV file next to the automated predictions, and drives
//! cine playback. Rendering is left to the caller.

pub mod annotations;
pub mod cine;
pub mod config;
pub mod dicom;
pub mod error;
pub mod frame;
pub mod labels;
pub mod navigator;
pub mod predictions;
pub mod reader;
pub mod session;

pub use annotations::{AnnotationStore, AssignOutcome, AutosaveCounter, AutosaveStatus, LabelChange};
pub use cine::{CineController, CineState};
pub use config::ReviewConfig;
pub use dicom::{DicomFrameReader, SampleLayout};
pub use error::{CaseLoadError, ConfigError, NavigateError, SeriesLoadError, SessionError, StoreError};
pub use frame::{IntensityImage, Window, normalize, pad_and_resize};
pub use labels::ViewLabel;
pub use navigator::{Frame, LoadedSeries, PatientCase, SeriesNavigator};
pub use predictions::{Prediction, PredictionStore};
pub use reader::{FrameReader, RawFrame};
pub use session::{LabelStep, ReviewSession, SeriesDisplay};
