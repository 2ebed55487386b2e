#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod forwarder;
mod http_client;
mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json, Router, routing::post};
use chorus_keystore::{CustomKey, KeyStore};

pub use error::{Result, TtsError};
pub use forwarder::Forwarder;
pub use types::{SpeechAudio, SpeechRequest};

/// Shared state for the speech route
#[derive(Clone)]
pub struct TtsState {
    pub forwarder: Arc<Forwarder>,
    pub keys: Arc<KeyStore>,
}

/// Create the endpoint router for speech synthesis
pub fn endpoint_router() -> Router<TtsState> {
    Router::new().route("/v1/audio/speech", post(synthesize))
}

/// Handle speech synthesis requests
///
/// The authenticated caller's key arrives as a request extension from the
/// auth middleware. Usage is metered here, not in the forwarder, so the
/// dashboard test route can reuse the forwarder without double counting.
async fn synthesize(
    State(state): State<TtsState>,
    Extension(caller): Extension<CustomKey>,
    Json(request): Json<SpeechRequest>,
) -> Result<axum::response::Response> {
    state.keys.record_usage(&caller.api_key).await;

    let audio = state.forwarder.synthesize(&request, Some(&caller.api_key)).await?;

    tracing::debug!(voice = %audio.voice.name, "speech synthesis complete");

    Ok(audio.into_response())
}
