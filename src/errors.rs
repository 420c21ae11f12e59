//! Error types for SentiFlow
//!
//! Two layers:
//! - `ProviderError`: raised by the embedding, search and generation collaborators
//! - `SentiflowError`: the single structured error surfaced by the core

use thiserror::Error;

/// Substrings that mark a quota/rate-limit failure when a provider only hands
/// back free text instead of a structured status.
const RATE_LIMIT_MARKERS: [&str; 2] = ["429", "resource exhausted"];

/// Failure raised by an external collaborator
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Quota exhausted or request rate exceeded
    #[error("{provider} rate limited: {message}")]
    RateLimited { provider: String, message: String },

    /// Non-success API status
    #[error("{provider} API error (HTTP {status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Anything else, carried as text
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Whether this failure is a quota/rate-limit condition.
    ///
    /// Structured variants decide from their status alone. Message markers
    /// only apply to free-text errors and transport failures without a status.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ProviderError::RateLimited { .. } => true,
            ProviderError::Api { status, .. } => *status == 429,
            ProviderError::InvalidResponse { .. } => false,
            ProviderError::Http(e) => match e.status() {
                Some(status) => status.as_u16() == 429,
                None => has_rate_limit_marker(&e.to_string()),
            },
            ProviderError::Other(message) => has_rate_limit_marker(message),
        }
    }

    pub fn invalid_response(provider: &str, message: impl Into<String>) -> Self {
        ProviderError::InvalidResponse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

fn has_rate_limit_marker(text: &str) -> bool {
    let text = text.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Main error type for the SentiFlow core
#[derive(Error, Debug)]
pub enum SentiflowError {
    /// Provider failure during an explicitly requested retrieval
    #[error("Retrieval failed: {0}")]
    Retrieval(#[source] ProviderError),

    /// Every model in the fallback chain failed; carries the last cause
    #[error("Generation failed after {attempts} attempts (last model {model}): {source}")]
    GenerationExhausted {
        model: String,
        attempts: usize,
        #[source]
        source: ProviderError,
    },

    /// No model produced usable text and no provider error was recorded
    #[error("No model produced a usable response (tried: {})", .models_tried.join(", "))]
    NoUsableOutput { models_tried: Vec<String> },

    /// Rejected caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SentiflowError {
    /// True when the failure came from an upstream provider rather than from
    /// the absence of usable output.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            SentiflowError::Retrieval(_) | SentiflowError::GenerationExhausted { .. }
        )
    }

    /// Hard errors that a caller should answer with a generic "try again".
    pub fn is_retryable_by_user(&self) -> bool {
        matches!(
            self,
            SentiflowError::Retrieval(_)
                | SentiflowError::GenerationExhausted { .. }
                | SentiflowError::NoUsableOutput { .. }
        )
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, SentiflowError>;

/// Result type alias for collaborator calls
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
