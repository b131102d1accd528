//! The single owned state object behind the viewer.
//!
//! A presentation layer keeps one [`ReviewSession`], forwards user actions
//! into it and renders [`SeriesDisplay`] plus the current cine frame. Every
//! operation that replaces the frame buffer or relabels stops cine first.

use crate::annotations::{AnnotationStore, AssignOutcome};
use crate::cine::CineController;
use crate::config::ReviewConfig;
use crate::dicom::DicomFrameReader;
use crate::error::{CaseLoadError, NavigateError, SessionError, StoreError};
use crate::labels::ViewLabel;
use crate::navigator::{Frame, LoadedSeries, SeriesNavigator};
use crate::predictions::{Prediction, PredictionStore};
use crate::reader::FrameReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const NONE_TEXT: &str = "None";

/// Read-only values describing the current series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDisplay {
    pub series_id: String,
    pub position: usize,
    pub series_count: usize,
    pub frame_count: usize,
    pub description: String,
    pub pulse_sequence: String,
    pub label_text: String,
    pub prediction_text: String,
}

/// Outcome of labelling the current series and moving on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelStep {
    pub outcome: AssignOutcome,
    /// False at the last series, where the label is applied in place.
    pub advanced: bool,
}

pub struct ReviewSession {
    config: ReviewConfig,
    navigator: SeriesNavigator,
    annotations: AnnotationStore,
    predictions: PredictionStore,
    cine: CineController,
}

impl ReviewSession {
    /// Open a case of per-frame DICOM files.
    pub fn open(dir: impl AsRef<Path>, config: ReviewConfig) -> Result<Self, CaseLoadError> {
        let reader = DicomFrameReader::new(config.frame_extension.clone());
        Self::open_with_reader(dir, config, Box::new(reader))
    }

    /// Open a case and load any labels previously saved for the patient.
    pub fn open_with_reader(
        dir: impl AsRef<Path>,
        config: ReviewConfig,
        reader: Box<dyn FrameReader>,
    ) -> Result<Self, CaseLoadError> {
        let navigator = SeriesNavigator::open_case(dir, reader, config.display_size)?;
        let output = config.annotation_path(&navigator.case().patient_id);
        let mut annotations = AnnotationStore::with_autosave(&output, config.autosave_every);
        annotations
            .load(&output)
            .map_err(CaseLoadError::Annotations)?;

        Ok(Self {
            cine: CineController::new(Duration::from_millis(config.cine_period_ms)),
            config,
            navigator,
            annotations,
            predictions: PredictionStore::new(),
        })
    }

    /// Replace the predictions with the rows of `path`; returns how many were read.
    pub fn select_predictions(&mut self, path: impl AsRef<Path>) -> usize {
        self.predictions.load(path)
    }

    /// Rejected moves at either end leave playback untouched.
    pub fn forward(&mut self) -> Result<(), NavigateError> {
        if !self.navigator.can_forward() {
            return Err(NavigateError::AtLast);
        }
        self.cine.reset();
        self.navigator.forward()
    }

    pub fn back(&mut self) -> Result<(), NavigateError> {
        if !self.navigator.can_back() {
            return Err(NavigateError::AtFirst);
        }
        self.cine.reset();
        self.navigator.back()
    }

    pub fn jump_to(&mut self, index: usize) -> Result<(), NavigateError> {
        if index >= self.navigator.len() {
            return Err(NavigateError::OutOfRange {
                requested: index,
                len: self.navigator.len(),
            });
        }
        self.cine.reset();
        self.navigator.jump_to(index)
    }

    /// Label every frame of the current series.
    pub fn assign_label(&mut self, label: &str) -> AssignOutcome {
        self.cine.reset();
        let ids: Vec<String> = self
            .navigator
            .current()
            .frame_ids()
            .map(str::to_string)
            .collect();
        let outcome = self.annotations.assign(ids, label);
        tracing::info!(
            "Series {}: {label} ({:?})",
            self.navigator.current_series_id(),
            outcome.change
        );
        outcome
    }

    pub fn assign_view(&mut self, label: ViewLabel) -> AssignOutcome {
        self.assign_label(label.key())
    }

    /// Label the current series with its predicted view.
    pub fn accept_prediction(&mut self) -> Result<AssignOutcome, SessionError> {
        let label = self.predicted_label()?;
        Ok(self.assign_label(&label))
    }

    /// Label the current series, then move forward unless it is the last one.
    ///
    /// The label stays assigned even if loading the next series fails.
    pub fn assign_and_advance(&mut self, label: &str) -> Result<LabelStep, NavigateError> {
        let outcome = self.assign_label(label);
        self.advance_after(outcome)
    }

    pub fn accept_prediction_and_advance(&mut self) -> Result<LabelStep, SessionError> {
        let label = self.predicted_label()?;
        let outcome = self.assign_label(&label);
        self.advance_after(outcome).map_err(SessionError::from)
    }

    fn advance_after(&mut self, outcome: AssignOutcome) -> Result<LabelStep, NavigateError> {
        if !self.navigator.can_forward() {
            return Ok(LabelStep {
                outcome,
                advanced: false,
            });
        }
        self.navigator.forward()?;
        Ok(LabelStep {
            outcome,
            advanced: true,
        })
    }

    fn predicted_label(&self) -> Result<String, SessionError> {
        let series_id = self.navigator.current_series_id();
        self.predictions
            .get(series_id)
            .map(|p| p.label.clone())
            .ok_or_else(|| SessionError::NoPrediction {
                series_id: series_id.to_string(),
            })
    }

    /// Write all labels to the patient's annotation file.
    pub fn save(&self) -> Result<PathBuf, StoreError> {
        let path = self.annotation_path();
        self.annotations.save(&path)?;
        Ok(path)
    }

    pub fn annotation_path(&self) -> PathBuf {
        self.config
            .annotation_path(&self.navigator.case().patient_id)
    }

    /// Start cine over the current series. False if already playing.
    pub fn play(&mut self, now: Instant) -> bool {
        let count = self.navigator.current().frame_count();
        self.cine.start(count, now)
    }

    pub fn stop(&mut self) {
        self.cine.stop();
    }

    /// Advance cine if due; returns the new frame index when it changed.
    pub fn poll_cine(&mut self, now: Instant) -> Option<usize> {
        self.cine.poll(now)
    }

    /// Frame to show right now.
    pub fn displayed_frame(&self) -> Option<&Frame> {
        self.navigator
            .current()
            .frames
            .get(self.cine.frame_index())
    }

    pub fn current_series_id(&self) -> &str {
        self.navigator.current_series_id()
    }

    /// Upper-cased assigned label, or `"None"`.
    pub fn current_label_text(&self) -> String {
        self.navigator
            .current()
            .frame_ids()
            .next()
            .and_then(|id| self.annotations.label_for(id))
            .map(str::to_uppercase)
            .unwrap_or_else(|| NONE_TEXT.to_string())
    }

    /// `"{label} ({confidence})"`, or `"None"`.
    pub fn current_prediction_text(&self) -> String {
        self.current_prediction()
            .map(Prediction::to_string)
            .unwrap_or_else(|| NONE_TEXT.to_string())
    }

    pub fn current_prediction(&self) -> Option<&Prediction> {
        self.predictions.get(self.navigator.current_series_id())
    }

    pub fn display(&self) -> SeriesDisplay {
        let series = self.current_series();
        SeriesDisplay {
            series_id: series.series_id.clone(),
            position: self.navigator.position(),
            series_count: self.navigator.len(),
            frame_count: series.frame_count(),
            description: series.description.clone(),
            pulse_sequence: series.pulse_sequence.clone(),
            label_text: self.current_label_text(),
            prediction_text: self.current_prediction_text(),
        }
    }

    pub fn current_series(&self) -> &LoadedSeries {
        self.navigator.current()
    }

    pub fn patient_id(&self) -> &str {
        &self.navigator.case().patient_id
    }

    pub fn can_forward(&self) -> bool {
        self.navigator.can_forward()
    }

    pub fn can_back(&self) -> bool {
        self.navigator.can_back()
    }

    pub fn navigator(&self) -> &SeriesNavigator {
        &self.navigator
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn predictions(&self) -> &PredictionStore {
        &self.predictions
    }

    pub fn cine(&self) -> &CineController {
        &self.cine
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }
}
