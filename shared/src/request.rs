//! Remote work requested by the orchestrator and the results fed back to it.

use crate::error::RemoteError;
use crate::image::SelectedImage;
use crate::wire::{ClassificationResponse, SegmentationResponse};

/// Tag of one analysis cycle. Results carrying an older tag are discarded.
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    Classify {
        generation: Generation,
        image: SelectedImage,
    },
    Segment {
        generation: Generation,
        image: SelectedImage,
        tumor_type: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    Classified {
        generation: Generation,
        result: Result<ClassificationResponse, RemoteError>,
    },
    Segmented {
        generation: Generation,
        result: Result<SegmentationResponse, RemoteError>,
    },
}

#[allow(async_fn_in_trait)]
pub trait Classifier {
    async fn classify(&self, image: &SelectedImage)
    -> Result<ClassificationResponse, RemoteError>;
}

/// Implementations bound the call with their own timeout and report it as
/// [`RemoteError::Timeout`].
#[allow(async_fn_in_trait)]
pub trait Segmenter {
    async fn segment(
        &self,
        image: &SelectedImage,
        tumor_type: Option<&str>,
    ) -> Result<SegmentationResponse, RemoteError>;
}

impl AnalysisRequest {
    pub fn generation(&self) -> Generation {
        match self {
            AnalysisRequest::Classify { generation, .. }
            | AnalysisRequest::Segment { generation, .. } => *generation,
        }
    }

    pub async fn execute<C, S>(self, classifier: &C, segmenter: &S) -> Settlement
    where
        C: Classifier,
        S: Segmenter,
    {
        match self {
            AnalysisRequest::Classify { generation, image } => Settlement::Classified {
                generation,
                result: classifier.classify(&image).await,
            },
            AnalysisRequest::Segment {
                generation,
                image,
                tumor_type,
            } => Settlement::Segmented {
                generation,
                result: segmenter.segment(&image, tumor_type.as_deref()).await,
            },
        }
    }
}

impl Settlement {
    pub fn generation(&self) -> Generation {
        match self {
            Settlement::Classified { generation, .. }
            | Settlement::Segmented { generation, .. } => *generation,
        }
    }
}
