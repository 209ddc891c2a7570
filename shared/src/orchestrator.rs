//! State of one upload, analyze and display cycle.
//!
//! [`UploadOrchestrator`] does no I/O. Intents return the [`AnalysisRequest`]s
//! to run; the caller executes them and hands each [`Settlement`] back to
//! [`UploadOrchestrator::apply`]. Requests and settlements carry the
//! generation they belong to, and selecting or clearing an image moves the
//! generation on so that late answers are dropped.

use crate::SegmentationMode;
use crate::error::{RemoteError, ValidationError};
use crate::image::{PreviewFactory, SelectedImage};
use crate::request::{AnalysisRequest, Generation, Settlement};
use crate::wire::{ClassificationResponse, SegmentationResponse};
use log::{debug, info, warn};
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationResult {
    pub predicted_label: String,
    /// Percentage in `[0, 100]`.
    pub confidence: f64,
    pub message: Option<String>,
}

impl ClassificationResult {
    pub fn indicates_no_tumor(&self) -> bool {
        is_no_tumor_label(&self.predicted_label)
    }
}

impl From<ClassificationResponse> for ClassificationResult {
    fn from(response: ClassificationResponse) -> Self {
        Self {
            predicted_label: response.predicted_result,
            confidence: response.confidence.clamp(0.0, 100.0),
            message: response.message.filter(|m| !m.trim().is_empty()),
        }
    }
}

/// Matches "no tumor", "No_Tumor", "notumor" and similar spellings.
pub fn is_no_tumor_label(label: &str) -> bool {
    let normalized = label
        .trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    normalized == "no tumor" || normalized == "notumor"
}

#[derive(Debug)]
pub enum SegmentationOutcome<H> {
    NotStarted,
    InProgress,
    Succeeded(Rc<H>),
    Failed(String),
}

impl<H> Default for SegmentationOutcome<H> {
    fn default() -> Self {
        SegmentationOutcome::NotStarted
    }
}

impl<H> SegmentationOutcome<H> {
    pub fn handle(&self) -> Option<&Rc<H>> {
        match self {
            SegmentationOutcome::Succeeded(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SegmentationOutcome::Failed(_))
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, SegmentationOutcome::InProgress)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, derive_more::Display)]
pub enum RequestPhase {
    #[default]
    #[display(fmt = "idle")]
    Idle,
    #[display(fmt = "submitting")]
    Submitting,
    #[display(fmt = "done")]
    Done,
}

#[derive(Clone, Copy, Debug, Default)]
struct InFlight {
    classify: bool,
    segment: bool,
}

impl InFlight {
    fn any(&self) -> bool {
        self.classify || self.segment
    }
}

pub struct UploadOrchestrator<F: PreviewFactory> {
    factory: F,
    mode: SegmentationMode,
    generation: Generation,
    image: Option<SelectedImage>,
    preview: Option<Rc<F::Handle>>,
    classification: Option<ClassificationResult>,
    segmentation: SegmentationOutcome<F::Handle>,
    phase: RequestPhase,
    in_flight: InFlight,
    notification: Option<String>,
}

impl<F: PreviewFactory> UploadOrchestrator<F> {
    pub fn new(factory: F, mode: SegmentationMode) -> Self {
        Self {
            factory,
            mode,
            generation: 0,
            image: None,
            preview: None,
            classification: None,
            segmentation: SegmentationOutcome::NotStarted,
            phase: RequestPhase::Idle,
            in_flight: InFlight::default(),
            notification: None,
        }
    }

    pub fn mode(&self) -> SegmentationMode {
        self.mode
    }

    /// Ignored while a submission is in flight.
    pub fn set_mode(&mut self, mode: SegmentationMode) -> bool {
        if self.phase == RequestPhase::Submitting {
            return false;
        }
        self.mode = mode;
        true
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    pub fn preview(&self) -> Option<&Rc<F::Handle>> {
        self.preview.as_ref()
    }

    pub fn classification(&self) -> Option<&ClassificationResult> {
        self.classification.as_ref()
    }

    pub fn segmentation(&self) -> &SegmentationOutcome<F::Handle> {
        &self.segmentation
    }

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    pub fn can_submit(&self) -> bool {
        self.image.is_some() && self.phase != RequestPhase::Submitting
    }

    pub fn can_retry_segmentation(&self) -> bool {
        self.segmentation.is_failed() && self.phase != RequestPhase::Submitting
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    /// Takes the pending blocking notification, if any.
    pub fn take_notification(&mut self) -> Option<String> {
        self.notification.take()
    }

    pub fn select_image(&mut self, image: SelectedImage) {
        if !image.looks_like_image() {
            warn!(
                "{} is declared as {}, it will be sent anyway",
                image.name(),
                image.mime_type()
            );
        }
        if image.exceeds_size_hint() {
            warn!("{} is {} bytes, above the suggested size", image.name(), image.len());
        }

        self.reset();
        self.preview = Some(Rc::new(self.factory.preview(&image)));
        info!("Selected {} ({} bytes)", image.name(), image.len());
        self.image = Some(image);
    }

    pub fn clear(&mut self) {
        self.reset();
    }

    pub fn submit(&mut self) -> Result<Vec<AnalysisRequest>, ValidationError> {
        let Some(image) = self.image.clone() else {
            let error = ValidationError::NoImageSelected;
            self.notification = Some(error.to_string());
            return Err(error);
        };
        if self.phase == RequestPhase::Submitting {
            warn!("Submit ignored, generation {} is still running", self.generation);
            return Err(ValidationError::AlreadySubmitting);
        }

        self.generation += 1;
        self.classification = None;
        self.segmentation = SegmentationOutcome::NotStarted;
        self.phase = RequestPhase::Submitting;
        self.in_flight.classify = true;
        info!(
            "Submitting {} as generation {} ({} mode)",
            image.name(),
            self.generation,
            self.mode
        );

        let mut requests = vec![AnalysisRequest::Classify {
            generation: self.generation,
            image: image.clone(),
        }];
        if self.mode == SegmentationMode::Parallel {
            requests.push(self.start_segmentation(image, None));
        }
        Ok(requests)
    }

    pub fn retry_segmentation(&mut self) -> Result<AnalysisRequest, ValidationError> {
        if self.phase == RequestPhase::Submitting {
            return Err(ValidationError::AlreadySubmitting);
        }
        if !self.segmentation.is_failed() {
            return Err(ValidationError::NothingToRetry);
        }
        let image = self.image.clone().ok_or(ValidationError::NoImageSelected)?;

        let hint = match self.mode {
            SegmentationMode::Gated => self
                .classification
                .as_ref()
                .map(|c| c.predicted_label.clone()),
            SegmentationMode::Parallel => None,
        };
        info!("Retrying segmentation for generation {}", self.generation);
        self.phase = RequestPhase::Submitting;
        Ok(self.start_segmentation(image, hint))
    }

    /// Applies the result of a request and returns the follow-up request, if
    /// the cycle needs one.
    pub fn apply(&mut self, settlement: Settlement) -> Option<AnalysisRequest> {
        if settlement.generation() != self.generation {
            debug!(
                "Dropping result of generation {}, current is {}",
                settlement.generation(),
                self.generation
            );
            return None;
        }

        let follow_up = match settlement {
            Settlement::Classified { result, .. } => self.on_classified(result),
            Settlement::Segmented { result, .. } => {
                self.on_segmented(result);
                None
            }
        };

        if !self.in_flight.any() && self.phase == RequestPhase::Submitting {
            self.phase = RequestPhase::Done;
        }
        follow_up
    }

    fn on_classified(
        &mut self,
        result: Result<ClassificationResponse, RemoteError>,
    ) -> Option<AnalysisRequest> {
        if !self.in_flight.classify {
            debug!("Unexpected classification result ignored");
            return None;
        }
        self.in_flight.classify = false;

        match result {
            Ok(response) => {
                let classification = ClassificationResult::from(response);
                info!(
                    "Classified as {} ({:.1}%)",
                    classification.predicted_label, classification.confidence
                );
                let follow_up = match self.mode {
                    SegmentationMode::Gated => self.gate_segmentation(&classification),
                    SegmentationMode::Parallel => None,
                };
                self.classification = Some(classification);
                follow_up
            }
            Err(error) => {
                warn!("Classification failed: {}", error);
                self.notification = Some(format!("Error uploading file: {}", error));
                None
            }
        }
    }

    fn gate_segmentation(
        &mut self,
        classification: &ClassificationResult,
    ) -> Option<AnalysisRequest> {
        if classification.indicates_no_tumor() {
            info!("No tumor predicted, showing the original image as segmentation");
            self.segmentation = match &self.preview {
                Some(preview) => SegmentationOutcome::Succeeded(Rc::clone(preview)),
                None => SegmentationOutcome::NotStarted,
            };
            return None;
        }

        let image = self.image.clone()?;
        Some(self.start_segmentation(image, Some(classification.predicted_label.clone())))
    }

    fn on_segmented(&mut self, result: Result<SegmentationResponse, RemoteError>) {
        if !self.in_flight.segment {
            debug!("Unexpected segmentation result ignored");
            return;
        }
        self.in_flight.segment = false;

        self.segmentation = match result {
            Ok(SegmentationResponse::Image { bytes, mime_type }) => {
                info!("Segmentation image received ({} bytes)", bytes.len());
                SegmentationOutcome::Succeeded(Rc::new(self.factory.segmentation(bytes, &mime_type)))
            }
            Ok(SegmentationResponse::ErrorPayload(message)) => {
                warn!("Segmentation service answered with an error: {}", message);
                SegmentationOutcome::Failed(message)
            }
            Err(error) => {
                let kind = if error.is_transport() { "transport" } else { "protocol" };
                warn!("Segmentation {} failure: {}", kind, error);
                SegmentationOutcome::Failed(error.to_string())
            }
        };
    }

    fn start_segmentation(
        &mut self,
        image: SelectedImage,
        tumor_type: Option<String>,
    ) -> AnalysisRequest {
        self.segmentation = SegmentationOutcome::InProgress;
        self.in_flight.segment = true;
        AnalysisRequest::Segment {
            generation: self.generation,
            image,
            tumor_type,
        }
    }

    // Drops every handle and moves past anything still in flight.
    fn reset(&mut self) {
        if self.image.is_some() {
            self.generation += 1;
        }
        self.segmentation = SegmentationOutcome::NotStarted;
        self.preview = None;
        self.image = None;
        self.classification = None;
        self.phase = RequestPhase::Idle;
        self.in_flight = InFlight::default();
        self.notification = None;
    }
}
