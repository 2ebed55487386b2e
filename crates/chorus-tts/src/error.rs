use axum::response::{IntoResponse, Response};
use http::StatusCode;

use chorus_core::{HttpError, error_body};

pub type Result<T> = std::result::Result<T, TtsError>;

/// Speech forwarding errors
///
/// Transport-layer failures (timeout, unreachable host) are distinct
/// variants from application-layer rejections because they map to
/// different client-visible codes.
#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    /// Bad request input; no upstream call was made
    #[error("{0}")]
    Validation(String),

    /// The requested voice is not in the catalog
    #[error("voice '{0}' not found")]
    VoiceNotFound(String),

    /// Upstream call exceeded the configured timeout
    #[error("upstream call timed out")]
    Timeout,

    /// Upstream unreachable (connect/DNS failure)
    #[error("upstream unreachable")]
    Unavailable,

    /// Upstream rejected our credential
    #[error("upstream authentication failed")]
    UpstreamAuth,

    /// Upstream reported the voice as unknown or unavailable
    #[error("upstream rejected the voice")]
    UpstreamVoiceGone,

    /// Upstream rate limit hit
    #[error("upstream rate limit exceeded")]
    UpstreamRateLimited,

    /// Upstream answered with `ok: false`
    #[error("upstream rejected the request: {0}")]
    Rejected(String),

    /// Upstream succeeded but returned no audio URL
    #[error("no audio URL in upstream response")]
    MissingAudioUrl,

    /// Any other non-success upstream status
    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl HttpError for TtsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::VoiceNotFound(_) | Self::UpstreamVoiceGone | Self::Rejected(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamRateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamAuth | Self::MissingAudioUrl | Self::UpstreamStatus(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Validation(_) | Self::VoiceNotFound(_) | Self::UpstreamVoiceGone | Self::Rejected(_) => {
                "invalid_request_error"
            }
            Self::Timeout => "timeout_error",
            Self::UpstreamRateLimited => "rate_limit_error",
            Self::Unavailable
            | Self::UpstreamAuth
            | Self::MissingAudioUrl
            | Self::UpstreamStatus(_)
            | Self::Internal(_) => "server_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::VoiceNotFound(voice) => {
                format!("Voice '{voice}' not found. Use /v1/voices to see available voices.")
            }
            Self::Timeout => "TTS service request timeout".to_string(),
            Self::Unavailable => "TTS service temporarily unavailable".to_string(),
            Self::UpstreamAuth => "TTS service authentication failed".to_string(),
            Self::UpstreamVoiceGone => "Voice not found or not available".to_string(),
            Self::UpstreamRateLimited => "TTS service rate limit exceeded".to_string(),
            Self::Rejected(message) => message.clone(),
            Self::MissingAudioUrl => "No audio URL received from TTS service".to_string(),
            Self::UpstreamStatus(_) => "TTS service error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        (self.status_code(), axum::Json(error_body(&self))).into_response()
    }
}
