use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router, middleware};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chorus_catalog::{Voice, VoiceCatalog, VoiceFilters};
use chorus_core::{HttpError, error_body};
use chorus_keystore::{KeyStore, KeyStoreError, KeyStatus};
use chorus_tts::{Forwarder, SpeechRequest};
use jiff::Timestamp;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::history::{TtsHistory, TtsHistoryEntry};
use crate::session::session_middleware;

/// Shared state for the dashboard API
#[derive(Clone)]
pub struct DashboardState {
    pub keys: Arc<KeyStore>,
    pub catalog: Arc<VoiceCatalog>,
    pub forwarder: Arc<Forwarder>,
    pub history: Arc<TtsHistory>,
    pub master_key: SecretString,
    pub session_token: String,
}

/// Build the dashboard router: an open login route plus the
/// session-gated `/dashboard/api/*` surface
pub fn dashboard_router(state: DashboardState) -> Router {
    let session_token = state.session_token.clone();

    let api = Router::new()
        .route("/dashboard/api/stats", get(stats))
        .route("/dashboard/api/keys", get(list_keys).post(create_key))
        .route("/dashboard/api/keys/{id}", delete(delete_key))
        .route(
            "/dashboard/api/original-keys",
            get(list_original_keys).post(create_original_key),
        )
        .route("/dashboard/api/original-keys/{id}", delete(delete_original_key))
        .route("/dashboard/api/playground-keys", get(playground_keys))
        .route("/dashboard/api/voices", get(voices))
        .route("/dashboard/api/voice-categories", get(voice_categories))
        .route("/dashboard/api/refresh-voices", post(refresh_voices))
        .route("/dashboard/api/test-tts", post(test_tts))
        .route("/dashboard/api/tts-history", get(tts_history).delete(clear_tts_history))
        .route("/dashboard/api/tts-history/{id}", delete(delete_tts_history_entry))
        .layer(middleware::from_fn(move |request, next| {
            let token = session_token.clone();
            async move { session_middleware(token, request, next).await }
        }))
        .with_state(state.clone());

    Router::new()
        .route("/dashboard/login", post(login))
        .with_state(state)
        .merge(api)
}

/// Render a domain error as its wire-format JSON response
fn http_error<E: HttpError>(error: &E) -> Response {
    (error.status_code(), Json(error_body(error))).into_response()
}

fn validation_error(message: &str) -> Response {
    http_error(&KeyStoreError::Validation(message.to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    master_key: Option<String>,
}

/// `POST /dashboard/login`
async fn login(State(state): State<DashboardState>, Json(request): Json<LoginRequest>) -> Response {
    if request.master_key.as_deref() == Some(state.master_key.expose_secret()) {
        Json(json!({
            "success": true,
            "message": "Dashboard access granted",
            "token": state.session_token,
        }))
        .into_response()
    } else {
        let body = json!({
            "error": {
                "message": "Invalid master key",
                "type": "authentication_error",
                "status": 401,
            }
        });
        (http::StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// `GET /dashboard/api/stats`
async fn stats(State(state): State<DashboardState>) -> Response {
    match state.keys.usage_stats().await {
        Ok(usage) => {
            let voices = state.catalog.stats().await;
            Json(json!({ "usage": usage, "voices": voices })).into_response()
        }
        Err(e) => http_error(&e),
    }
}

/// `GET /dashboard/api/keys`
async fn list_keys(State(state): State<DashboardState>) -> Response {
    match state.keys.list_custom_keys(true).await {
        Ok(keys) => Json(json!({ "keys": keys })).into_response(),
        Err(e) => http_error(&e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateKeyRequest {
    name: Option<String>,
    rate_limit: Option<u32>,
    original_key_id: Option<String>,
}

/// `POST /dashboard/api/keys`
async fn create_key(State(state): State<DashboardState>, Json(request): Json<CreateKeyRequest>) -> Response {
    let Some(name) = request.name else {
        return validation_error("Name is required");
    };

    match state
        .keys
        .create_custom_key(&name, request.rate_limit, request.original_key_id)
        .await
    {
        Ok(key) => Json(json!({
            "success": true,
            "key": key,
            "message": "API key created successfully",
        }))
        .into_response(),
        Err(e) => http_error(&e),
    }
}

/// `DELETE /dashboard/api/keys/{id}`
async fn delete_key(State(state): State<DashboardState>, Path(id): Path<String>) -> Response {
    match state.keys.delete_custom_key(&id).await {
        Ok(()) => Json(json!({
            "success": true,
            "message": "API key deleted successfully",
        }))
        .into_response(),
        Err(e) => http_error(&e),
    }
}

/// `GET /dashboard/api/original-keys`
async fn list_original_keys(State(state): State<DashboardState>) -> Response {
    match state.keys.list_original_keys().await {
        Ok(keys) => Json(json!({ "keys": keys })).into_response(),
        Err(e) => http_error(&e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOriginalKeyRequest {
    name: Option<String>,
    api_key: Option<String>,
    endpoint: Option<String>,
}

/// `POST /dashboard/api/original-keys`
async fn create_original_key(
    State(state): State<DashboardState>,
    Json(request): Json<CreateOriginalKeyRequest>,
) -> Response {
    let (Some(name), Some(api_key), Some(endpoint)) = (request.name, request.api_key, request.endpoint) else {
        return validation_error("Name, API key, and endpoint are required");
    };

    match state.keys.create_original_key(&name, &api_key, &endpoint).await {
        Ok(key) => Json(json!({
            "success": true,
            "key": key,
            "message": "Original API key created successfully",
        }))
        .into_response(),
        Err(e) => http_error(&e),
    }
}

/// `DELETE /dashboard/api/original-keys/{id}`
async fn delete_original_key(State(state): State<DashboardState>, Path(id): Path<String>) -> Response {
    match state.keys.delete_original_key(&id).await {
        Ok(()) => Json(json!({
            "success": true,
            "message": "Original API key deleted successfully",
        }))
        .into_response(),
        Err(e) => http_error(&e),
    }
}

/// Active key with its full secret, for the playground voice tester
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaygroundKey {
    id: String,
    name: String,
    api_key: String,
    usage_count: u64,
    created_at: String,
}

/// `GET /dashboard/api/playground-keys`
async fn playground_keys(State(state): State<DashboardState>) -> Response {
    match state.keys.list_custom_keys(false).await {
        Ok(keys) => {
            let keys: Vec<PlaygroundKey> = keys
                .into_iter()
                .filter(|view| view.key.status == KeyStatus::Active)
                .map(|view| PlaygroundKey {
                    id: view.key.id,
                    name: view.key.name,
                    api_key: view.key.api_key,
                    usage_count: view.key.usage_count,
                    created_at: view.key.created_at,
                })
                .collect();
            Json(json!({ "keys": keys })).into_response()
        }
        Err(e) => http_error(&e),
    }
}

#[derive(Debug, Deserialize)]
struct DashboardVoicesQuery {
    language: Option<String>,
    engine: Option<String>,
    gender: Option<String>,
    category: Option<String>,
    search: Option<String>,
    #[serde(default = "default_voices_limit")]
    limit: usize,
}

const fn default_voices_limit() -> usize {
    100
}

/// `GET /dashboard/api/voices`
async fn voices(State(state): State<DashboardState>, Query(query): Query<DashboardVoicesQuery>) -> Response {
    let filters = VoiceFilters {
        language: query.language,
        engine: query.engine,
        gender: query.gender,
        category: query.category,
        search: query.search,
    };

    let voices: Vec<Voice> = state.catalog.query(&filters).await.into_iter().take(query.limit).collect();

    Json(json!({ "voices": voices })).into_response()
}

/// `GET /dashboard/api/voice-categories`
async fn voice_categories(State(state): State<DashboardState>) -> Response {
    let voices = state.catalog.load_all().await;

    let languages: BTreeSet<&str> = voices.iter().map(|voice| voice.language.as_str()).collect();
    let engines: BTreeSet<&str> = voices.iter().map(|voice| voice.engine.as_str()).collect();
    let genders: BTreeSet<&str> = voices.iter().map(|voice| voice.gender.as_str()).collect();
    let categories: BTreeSet<&str> = voices.iter().map(|voice| voice.category.as_str()).collect();

    Json(json!({
        "languages": languages,
        "engines": engines,
        "genders": genders,
        "categories": categories,
    }))
    .into_response()
}

/// `POST /dashboard/api/refresh-voices`
async fn refresh_voices(State(state): State<DashboardState>) -> Response {
    match state.catalog.force_refresh().await {
        Ok(voices) => Json(json!({
            "success": true,
            "message": format!("Refreshed voice cache with {} voices", voices.len()),
            "count": voices.len(),
        }))
        .into_response(),
        Err(e) => http_error(&e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestTtsRequest {
    text: Option<String>,
    voice: Option<String>,
    api_key: Option<String>,
}

/// `POST /dashboard/api/test-tts`
///
/// Calls the forwarder directly, the same pure function behind the
/// public speech route, and appends the result to the history ring.
async fn test_tts(State(state): State<DashboardState>, Json(request): Json<TestTtsRequest>) -> Response {
    let (Some(text), Some(voice)) = (request.text, request.voice) else {
        return validation_error("Text and voice are required");
    };
    if text.is_empty() || voice.is_empty() {
        return validation_error("Text and voice are required");
    }

    let all_keys = match state.keys.list_custom_keys(false).await {
        Ok(keys) => keys,
        Err(e) => return http_error(&e),
    };

    let selected = match request.api_key.filter(|key| !key.is_empty()) {
        Some(key) => key,
        None => match all_keys.first() {
            Some(view) => view.key.api_key.clone(),
            None => return validation_error("No API keys available. Please create an API key first."),
        },
    };

    let Some(used) = all_keys.iter().find(|view| view.key.api_key == selected) else {
        return validation_error("Invalid API key");
    };

    let speech = SpeechRequest {
        model: Some("tts-1".to_string()),
        input: text.clone(),
        voice: voice.clone(),
        response_format: Some("mp3".to_string()),
        speed: Some(1.0),
    };

    let audio = match state.forwarder.synthesize(&speech, Some(&selected)).await {
        Ok(audio) => audio,
        Err(e) => return http_error(&e),
    };

    let now = Timestamp::now();
    let entry = TtsHistoryEntry {
        id: now.as_millisecond().to_string(),
        audio: format!("data:audio/mpeg;base64,{}", BASE64.encode(&audio.audio)),
        timestamp: now.to_string(),
        voice,
        text,
        duration: (audio.audio.len() + 500) / 1000,
        api_key: selected,
        api_key_name: used.key.name.clone(),
    };
    state.history.record(entry.clone());

    match serde_json::to_value(&entry) {
        Ok(mut body) => {
            body["success"] = serde_json::Value::Bool(true);
            Json(body).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize history entry");
            http_error(&KeyStoreError::Io(std::io::Error::other("serialization failed")))
        }
    }
}

/// `GET /dashboard/api/tts-history`
async fn tts_history(State(state): State<DashboardState>) -> Response {
    Json(json!({
        "success": true,
        "history": state.history.list(),
    }))
    .into_response()
}

/// `DELETE /dashboard/api/tts-history/{id}`
async fn delete_tts_history_entry(State(state): State<DashboardState>, Path(id): Path<String>) -> Response {
    if state.history.remove(&id) {
        Json(json!({
            "success": true,
            "message": "Response deleted from history",
            "history": state.history.list(),
        }))
        .into_response()
    } else {
        let body = json!({
            "error": {
                "message": "Response not found",
                "type": "not_found_error",
                "status": 404,
            }
        });
        (http::StatusCode::NOT_FOUND, Json(body)).into_response()
    }
}

/// `DELETE /dashboard/api/tts-history`
async fn clear_tts_history(State(state): State<DashboardState>) -> Response {
    state.history.clear();
    Json(json!({
        "success": true,
        "message": "TTS history cleared",
        "history": state.history.list(),
    }))
    .into_response()
}
