use axum::{extract::State, Json};
use std::sync::Arc;

use crate::domain::voice::{VoiceCatalog, VoiceResponse, VoicesResponse};

/// GET /api/voices - List the voices available for synthesis
pub async fn list_voices(State(catalog): State<Arc<VoiceCatalog>>) -> Json<VoicesResponse> {
    Json(VoicesResponse {
        voices: catalog.voices().iter().map(VoiceResponse::from).collect(),
    })
}
