use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

/// Gate dashboard API routes behind the session token issued by login
pub async fn session_middleware(expected_token: String, request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if token != Some(expected_token.as_str()) {
        let body = serde_json::json!({
            "error": {
                "message": "Dashboard access required",
                "type": "authentication_error",
                "status": 401,
            }
        });
        return (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
    }

    next.run(request).await
}
