use axum::Json;

use crate::{
    domain::text::{estimate, reconstruct_text, word_count, ExtractResponse, ProcessingEstimate, TextRequest},
    error::{AppError, AppResult},
    infrastructure::http::ApiJson,
};

/// POST /api/extract - Repair line-wrapped text extracted from a document
pub async fn extract(ApiJson(request): ApiJson<TextRequest>) -> AppResult<Json<ExtractResponse>> {
    let text = reconstruct_text(&request.text);

    if text.trim().is_empty() {
        return Err(AppError::BadRequest(
            "No text could be extracted".to_string(),
        ));
    }

    tracing::info!(
        raw_length = request.text.len(),
        clean_length = text.len(),
        "Text reconstructed"
    );

    Ok(Json(ExtractResponse {
        char_count: text.chars().count(),
        word_count: word_count(&text),
        text,
    }))
}

/// POST /api/estimate - Estimate processing time for a text
pub async fn estimate_time(
    ApiJson(request): ApiJson<TextRequest>,
) -> AppResult<Json<ProcessingEstimate>> {
    Ok(Json(estimate(&request.text)))
}
