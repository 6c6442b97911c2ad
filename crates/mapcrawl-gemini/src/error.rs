use mapcrawl_core::SourceError;
use thiserror::Error;

/// Errors returned by the Gemini API client.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API reported an exhausted quota or rate limit.
    #[error("Gemini quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Any other non-2xx response.
    #[error("Gemini API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid Gemini base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl GeminiError {
    #[must_use]
    pub fn is_quota(&self) -> bool {
        matches!(self, GeminiError::QuotaExceeded(_))
    }
}

impl From<GeminiError> for SourceError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::QuotaExceeded(message) => SourceError::QuotaExceeded(message),
            other => SourceError::Failed(other.to_string()),
        }
    }
}

/// Classify a non-2xx response.
///
/// HTTP 429, the `RESOURCE_EXHAUSTED` API status, and any message mentioning
/// "quota" are all reported as [`GeminiError::QuotaExceeded`].
pub(crate) fn classify_api_error(
    status: u16,
    api_status: Option<&str>,
    message: String,
) -> GeminiError {
    let quota = status == 429
        || api_status == Some("RESOURCE_EXHAUSTED")
        || message.to_lowercase().contains("quota");
    if quota {
        GeminiError::QuotaExceeded(message)
    } else {
        GeminiError::Api { status, message }
    }
}
