use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use crate::domain::tts::SpeechDispatcher;

pub async fn index() -> impl IntoResponse {
    Json(json!({
        "service": "audiobook-backend",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /api/voices",
            "GET /api/preview/:voice_id",
            "POST /api/preview",
            "POST /api/generate",
            "POST /api/jobs",
            "GET /api/jobs/:job_id",
            "GET /api/jobs/:job_id/download",
            "POST /api/extract",
            "POST /api/estimate",
            "GET /health",
            "GET /health/ready"
        ]
    }))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /api/health - JSON liveness for browser clients
pub async fn api_health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "message": "Server running" }))
}

pub async fn health_ready(State(dispatcher): State<Arc<SpeechDispatcher>>) -> impl IntoResponse {
    let providers = dispatcher.providers();
    if providers.is_empty() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "providers": providers
            })),
        )
    } else {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "providers": providers
            })),
        )
    }
}
