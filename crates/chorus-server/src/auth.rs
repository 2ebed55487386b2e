use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chorus_keystore::KeyStore;
use http::StatusCode;

/// Authenticate API requests via custom key
///
/// Extracts the Bearer token from the Authorization header, validates it
/// against the key store, and attaches the full key record to the request
/// for handlers that meter usage or resolve credentials.
pub async fn auth_middleware(keys: Arc<KeyStore>, mut request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    let Some(token) = token else {
        return unauthorized("API key required. Use format: Bearer YOUR_API_KEY");
    };

    match keys.validate_custom_key(&token).await {
        Ok(true) => {}
        Ok(false) => return unauthorized("Invalid API key"),
        Err(e) => {
            tracing::warn!(error = %e, "key validation failed");
            return auth_service_error();
        }
    }

    match keys.get_key_info(&token).await {
        Ok(Some(info)) => {
            request.extensions_mut().insert(info);
            next.run(request).await
        }
        Ok(None) => unauthorized("Invalid API key"),
        Err(e) => {
            tracing::warn!(error = %e, "key lookup failed");
            auth_service_error()
        }
    }
}

fn unauthorized(message: &str) -> Response {
    let body = serde_json::json!({
        "error": {
            "message": message,
            "type": "authentication_error",
            "status": 401,
        }
    });
    (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
}

fn auth_service_error() -> Response {
    let body = serde_json::json!({
        "error": {
            "message": "Authentication service error",
            "type": "authentication_error",
            "status": 500,
        }
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
}
