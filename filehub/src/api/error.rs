use thiserror::Error;

use super::common::ApiErrorDetails;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The sentinel for missing remote objects. Callers translate this into
    /// local state removal instead of surfacing it.
    #[error("Resource not found")]
    NotFound,

    #[error("Authentication failed")]
    AuthFailed,

    #[error("API returned error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        #[source]
        details: Option<Box<ApiErrorDetails>>,
    },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }
}
