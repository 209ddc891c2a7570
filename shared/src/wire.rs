//! HTTP contracts of the classifier and segmenter services.

use crate::error::RemoteError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Multipart field carrying the image for the classifier.
pub const CLASSIFIER_FILE_FIELD: &str = "fileUploadedByUser";
/// Multipart field carrying the image for the segmenter.
pub const SEGMENTER_FILE_FIELD: &str = "file";
/// Optional multipart field with the predicted tumor type.
pub const SEGMENTER_HINT_FIELD: &str = "tumor_type";

pub const SEGMENTATION_FALLBACK_MESSAGE: &str = "Segmentation failed";

pub fn predict_url(base_url: &str) -> String {
    format!("{}/predict", base_url.trim_end_matches('/'))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassificationResponse {
    pub predicted_result: String,
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub message: Option<String>,
}

// The classifier reports confidence either as a number or as a numeric string
fn deserialize_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim_end().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(confidence) if confidence.is_finite() => Ok(confidence),
        _ => Err(serde::de::Error::custom(format!(
            "Invalid confidence value: {}",
            value
        ))),
    }
}

impl ClassificationResponse {
    /// Interprets a finished classifier exchange.
    pub fn from_http(status: u16, body: &str) -> Result<Self, RemoteError> {
        if !(200..300).contains(&status) {
            return Err(RemoteError::Status {
                status,
                message: error_message_from_body(body).unwrap_or_else(|| status.to_string()),
            });
        }
        serde_json::from_str(body).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

/// The segmenter answers on one endpoint with either an image or an error body.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentationResponse {
    Image { bytes: Vec<u8>, mime_type: String },
    ErrorPayload(String),
}

impl SegmentationResponse {
    /// Interprets a finished segmenter exchange.
    ///
    /// The declared content type decides the shape before the body is looked
    /// at: only a 2xx `image/*` answer is kept as bytes. Any other 2xx body is
    /// read as text and becomes an [`SegmentationResponse::ErrorPayload`];
    /// non-2xx statuses are [`RemoteError::Status`].
    pub fn from_http(
        status: u16,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> Result<Self, RemoteError> {
        let image_type = content_type.and_then(image_media_type);

        if !(200..300).contains(&status) {
            let text = String::from_utf8_lossy(&body);
            return Err(RemoteError::Status {
                status,
                message: error_message_from_body(&text).unwrap_or_else(|| status.to_string()),
            });
        }

        Ok(match image_type {
            Some(mime_type) => SegmentationResponse::Image {
                bytes: body,
                mime_type,
            },
            None => {
                let text = String::from_utf8_lossy(&body);
                SegmentationResponse::ErrorPayload(
                    error_message_from_body(&text)
                        .unwrap_or_else(|| SEGMENTATION_FALLBACK_MESSAGE.to_string()),
                )
            }
        })
    }
}

/// Returns the bare media type when `content_type` declares an image.
pub fn image_media_type(content_type: &str) -> Option<String> {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type.starts_with("image/").then_some(media_type)
}

/// Pulls a human-readable message out of an error body.
///
/// JSON bodies are searched for `error`, `message` and `detail` in that order;
/// anything else is returned trimmed. Blank bodies yield `None`.
pub fn error_message_from_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        for key in ["error", "message", "detail"] {
            match value.get(key) {
                Some(Value::String(s)) if !s.trim().is_empty() => {
                    return Some(s.trim().to_string());
                }
                Some(other @ (Value::Object(_) | Value::Array(_))) => {
                    return Some(other.to_string());
                }
                _ => {}
            }
        }
        if let Value::String(s) = value {
            return Some(s);
        }
    }

    Some(trimmed.to_string())
}
