use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
};
use std::sync::Arc;

use crate::{
    domain::{
        job::{Artifact, SynthesisRequest},
        tts::{PreviewRequest, TtsService, TtsServiceApi},
    },
    error::{AppError, AppResult},
    infrastructure::http::ApiJson,
};

pub struct TtsController {
    tts_service: Arc<TtsService>,
}

impl TtsController {
    pub fn new(tts_service: Arc<TtsService>) -> Self {
        Self { tts_service }
    }

    /// POST /api/generate - Synthesize a whole text and answer the MP3 as a download
    pub async fn generate(
        State(controller): State<Arc<TtsController>>,
        ApiJson(request): ApiJson<SynthesisRequest>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let artifact = controller
            .tts_service
            .generate(request.text, request.voice)
            .await?;

        audio_response(artifact, Disposition::Attachment)
    }

    /// GET /api/preview/{voice_id} - Short sample of a voice, played inline
    pub async fn preview(
        State(controller): State<Arc<TtsController>>,
        Path(voice_id): Path<String>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let artifact = controller.tts_service.preview(voice_id).await?;
        audio_response(artifact, Disposition::Inline)
    }

    /// POST /api/preview - Same as the GET variant with the voice in the body
    pub async fn preview_body(
        State(controller): State<Arc<TtsController>>,
        ApiJson(request): ApiJson<PreviewRequest>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let artifact = controller.tts_service.preview(request.voice).await?;
        audio_response(artifact, Disposition::Inline)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Disposition {
    Inline,
    Attachment,
}

/// Audio bytes with content type, length and disposition headers
pub(crate) fn audio_response(
    artifact: Artifact,
    disposition: Disposition,
) -> AppResult<(StatusCode, HeaderMap, Body)> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, header_value(&artifact.mime_type)?);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(artifact.bytes.len()));

    let disposition = match disposition {
        Disposition::Inline => format!("inline; filename=\"{}\"", artifact.filename),
        Disposition::Attachment => format!("attachment; filename=\"{}\"", artifact.filename),
    };
    headers.insert(header::CONTENT_DISPOSITION, header_value(&disposition)?);

    Ok((StatusCode::OK, headers, Body::from(artifact.bytes)))
}

fn header_value(value: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::Internal(format!("invalid header value {:?}: {}", value, e)))
}
