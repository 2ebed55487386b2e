use http::StatusCode;

use chorus_core::HttpError;

/// Key store errors
#[derive(Debug, thiserror::Error)]
pub enum KeyStoreError {
    /// Bad or missing input from the caller
    #[error("{0}")]
    Validation(String),

    /// Unknown key id
    #[error("{0}")]
    NotFound(String),

    /// Reading or writing the backing file failed
    #[error("key store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file holds malformed JSON
    #[error("key store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl HttpError for KeyStoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Io(_) | Self::Corrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Validation(_) => "invalid_request_error",
            Self::NotFound(_) => "not_found_error",
            Self::Io(_) | Self::Corrupt(_) => "server_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::NotFound(msg) => msg.clone(),
            // Never leak filesystem details to API consumers
            Self::Io(_) | Self::Corrupt(_) => "key store unavailable".to_string(),
        }
    }
}
