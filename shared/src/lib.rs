pub mod error;
pub mod image;
pub mod orchestrator;
pub mod request;
pub mod wire;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum_macros::{Display, EnumString};

pub use error::{RemoteError, ValidationError};
pub use image::{PreviewFactory, SelectedImage};
pub use orchestrator::{
    ClassificationResult, RequestPhase, SegmentationOutcome, UploadOrchestrator,
};
pub use request::{AnalysisRequest, Classifier, Generation, Segmenter, Settlement};
pub use wire::{ClassificationResponse, SegmentationResponse};

pub const DEFAULT_SEGMENTER_TIMEOUT_SECS: u64 = 900;

/// How the segmentation leg is scheduled relative to classification.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SegmentationMode {
    /// Segment only after classification, hinted with the predicted label.
    #[default]
    Gated,
    /// Fire both calls together, without a hint.
    Parallel,
}

/// Runtime configuration handed to the browser client by the host.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub classifier_base_url: String,
    pub segmenter_base_url: String,
    #[serde(default)]
    pub segmentation_mode: SegmentationMode,
    #[serde(default = "default_segmenter_timeout_secs")]
    pub segmenter_timeout_secs: u64,
}

fn default_segmenter_timeout_secs() -> u64 {
    DEFAULT_SEGMENTER_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn classifier_url(&self) -> String {
        wire::predict_url(&self.classifier_base_url)
    }

    pub fn segmenter_url(&self) -> String {
        wire::predict_url(&self.segmenter_base_url)
    }

    pub fn segmenter_timeout(&self) -> Duration {
        Duration::from_secs(self.segmenter_timeout_secs)
    }
}
