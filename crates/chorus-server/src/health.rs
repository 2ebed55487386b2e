use axum::Json;
use axum::extract::State;
use jiff::Timestamp;
use serde::Serialize;

/// Service identity reported by the health endpoints
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: String,
    version: String,
    timestamp: String,
}

/// Health check handler
pub async fn health_handler(State(service): State<ServiceInfo>) -> Json<impl Serialize> {
    Json(HealthResponse {
        status: "ok",
        service: service.name,
        version: service.version,
        timestamp: Timestamp::now().to_string(),
    })
}
