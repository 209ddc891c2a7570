use std::time::Duration;

/// Intents rejected locally, before any request is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select an image!")]
    NoImageSelected,
    #[error("An analysis is already in progress.")]
    AlreadySubmitting,
    #[error("There is no failed segmentation to retry.")]
    NothingToRetry,
}

/// Failures of either remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server error: {status} - {message}")]
    Status { status: u16, message: String },
    #[error("Request timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),
    #[error("{0}")]
    Protocol(String),
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Network failures, non-2xx statuses and timeouts.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RemoteError::Network(_) | RemoteError::Status { .. } | RemoteError::Timeout(_)
        )
    }
}
