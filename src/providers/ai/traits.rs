//! Draft generation provider trait and error taxonomy.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

use super::request::DraftRequest;

/// A field-level validation message, mirroring the
/// `{error, details: [{field, message}]}` shape of the generation
/// endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors from draft generation, one variant per status class.
#[derive(Debug, Error)]
pub enum DraftError {
    /// Malformed request; carries per-field detail.
    #[error("validation failed: {}", .details.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("; "))]
    Validation { details: Vec<FieldError> },

    /// Provider is misconfigured (missing or rejected API key).
    #[error("API configuration error: {0}")]
    Configuration(String),

    /// Rate limited by the provider.
    #[error("rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Generic API failure.
    #[error("generation failed: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failure while consuming an already-open stream.
    #[error("stream error: {0}")]
    Stream(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl DraftError {
    /// Message suitable for direct display.
    pub fn user_message(&self) -> String {
        match self {
            DraftError::Validation { .. } => "Validation failed".to_string(),
            DraftError::Configuration(_) => "API configuration error".to_string(),
            DraftError::RateLimited { .. } => {
                "Rate limit exceeded. Please try again later.".to_string()
            }
            _ => "Failed to generate draft".to_string(),
        }
    }
}

/// Result type for generation operations.
pub type DraftResult<T> = Result<T, DraftError>;

/// A chunk of streamed draft text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationChunk {
    pub text: String,
}

/// Live token stream; terminates when the draft is complete.
pub type GenerationStream = Pin<Box<dyn Stream<Item = DraftResult<GenerationChunk>> + Send>>;

/// A collaborator that turns a structured draft request into a live
/// text stream. Context fields stay structured all the way to the
/// provider so tone instructions can vary independently of content.
#[async_trait]
pub trait DraftProvider: Send + Sync {
    /// Provider name, for logging.
    fn name(&self) -> &str;

    /// Validates the request and opens a generation stream.
    async fn stream_draft(&self, request: &DraftRequest) -> DraftResult<GenerationStream>;
}
