//! Mock upstream TTS provider for integration tests
//!
//! Implements the provider contract: a synthesis endpoint answering
//! `{ok, url}` on success, the invalid-voice catalog probe answering a
//! 400 with `available_voices` attached, and an audio download route.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Audio bytes served by the download route
pub const FAKE_AUDIO: &[u8] = b"ID3\x03\x00fake-mp3-bytes-for-tests";

/// A running mock provider
pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    /// Synthesis calls, excluding catalog probes
    synth_count: AtomicU32,
    /// Catalog probe calls (voice=invalid-voice-name)
    probe_count: AtomicU32,
    /// Bearer token seen on the most recent synthesis call
    last_bearer: Mutex<Option<String>>,
    /// When set, synthesis answers `ok: false` with this message
    reject_message: Option<String>,
    /// Base URL for the audio link returned by synthesis
    base_url: Mutex<String>,
}

impl MockUpstream {
    /// Start the mock provider, answering every synthesis call with a
    /// valid audio URL
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(None).await
    }

    /// Start a mock provider that rejects synthesis with `ok: false`
    pub async fn start_rejecting(message: &str) -> anyhow::Result<Self> {
        Self::start_inner(Some(message.to_string())).await
    }

    async fn start_inner(reject_message: Option<String>) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            synth_count: AtomicU32::new(0),
            probe_count: AtomicU32::new(0),
            last_bearer: Mutex::new(None),
            reject_message,
            base_url: Mutex::new(String::new()),
        });

        let app = Router::new()
            .route("/tts", routing::get(handle_synthesis))
            .route("/audio/clip.mp3", routing::get(handle_audio))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        *state.base_url.lock().unwrap() = format!("http://{addr}");

        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Synthesis endpoint URL, used as the upstream endpoint in configs
    pub fn endpoint(&self) -> String {
        format!("http://{}/tts", self.addr)
    }

    /// Synthesis calls seen so far, excluding catalog probes
    pub fn synth_count(&self) -> u32 {
        self.state.synth_count.load(Ordering::SeqCst)
    }

    /// Catalog probe calls seen so far
    pub fn probe_count(&self) -> u32 {
        self.state.probe_count.load(Ordering::SeqCst)
    }

    /// Bearer token of the most recent synthesis call
    pub fn last_bearer(&self) -> Option<String> {
        self.state.last_bearer.lock().unwrap().clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_synthesis(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let voice = params.get("voice").cloned().unwrap_or_default();

    // The provider has no list endpoint; an invalid voice makes it reject
    // the request with the full list of valid voices attached
    if voice == "invalid-voice-name" {
        state.probe_count.fetch_add(1, Ordering::SeqCst);
        let body = json!({
            "ok": false,
            "message": "Invalid voice",
            "available_voices": [
                {"name": "jenny", "language": "en-US", "engine": "neural"},
                {"name": "matthew", "language": "en-US", "engine": "standard"},
                {"name": "katja", "language": "de-DE", "engine": "azure"},
                // Duplicate entry: the gateway must dedupe it away
                {"name": "jenny", "language": "en-US", "engine": "neural"},
            ],
        });
        return (StatusCode::BAD_REQUEST, Json(body));
    }

    state.synth_count.fetch_add(1, Ordering::SeqCst);

    let bearer = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    *state.last_bearer.lock().unwrap() = bearer;

    if let Some(ref message) = state.reject_message {
        return (StatusCode::OK, Json(json!({"ok": false, "message": message})));
    }

    let base_url = state.base_url.lock().unwrap().clone();
    (
        StatusCode::OK,
        Json(json!({"ok": true, "url": format!("{base_url}/audio/clip.mp3")})),
    )
}

async fn handle_audio() -> impl IntoResponse {
    ([(axum::http::header::CONTENT_TYPE, "audio/mpeg")], FAKE_AUDIO.to_vec())
}
