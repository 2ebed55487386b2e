use axum::response::{IntoResponse, Response};
use http::StatusCode;

use chorus_core::{HttpError, error_body};

/// Voice catalog errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Upstream probe failed or returned no voice list
    #[error("upstream voice fetch failed: {0}")]
    UpstreamUnavailable(String),

    /// Unknown voice identifier
    #[error("voice not found: {0}")]
    VoiceNotFound(String),
}

impl HttpError for CatalogError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::VoiceNotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::UpstreamUnavailable(_) => "server_error",
            Self::VoiceNotFound(_) => "not_found_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::UpstreamUnavailable(_) => "Voice service temporarily unavailable".to_string(),
            Self::VoiceNotFound(_) => "Voice not found".to_string(),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        (self.status_code(), axum::Json(error_body(&self))).into_response()
    }
}
