use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::tts::{audio_response, Disposition};
use crate::{
    domain::job::{
        JobService, JobServiceApi, JobServiceError, JobStatusResponse, SubmitJobResponse,
        SynthesisRequest,
    },
    error::AppResult,
    infrastructure::http::ApiJson,
};

pub struct JobController {
    job_service: Arc<JobService>,
}

impl JobController {
    pub fn new(job_service: Arc<JobService>) -> Self {
        Self { job_service }
    }

    /// POST /api/jobs - Start a background synthesis job
    pub async fn submit(
        State(controller): State<Arc<JobController>>,
        ApiJson(request): ApiJson<SynthesisRequest>,
    ) -> AppResult<(StatusCode, Json<SubmitJobResponse>)> {
        let job_id = controller
            .job_service
            .submit(request.text, request.voice)
            .await?;
        Ok((StatusCode::ACCEPTED, Json(SubmitJobResponse { job_id })))
    }

    /// GET /api/jobs/{jobId} - Job status and progress
    pub async fn status(
        State(controller): State<Arc<JobController>>,
        Path(job_id): Path<String>,
    ) -> AppResult<Json<JobStatusResponse>> {
        let job = controller.job_service.get_status(parse_job_id(&job_id)?).await?;
        Ok(Json(JobStatusResponse::from(&job)))
    }

    /// GET /api/jobs/{jobId}/download - Audio of a finished job
    pub async fn download(
        State(controller): State<Arc<JobController>>,
        Path(job_id): Path<String>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let artifact = controller
            .job_service
            .fetch_artifact(parse_job_id(&job_id)?)
            .await?;
        audio_response(artifact, Disposition::Attachment)
    }
}

/// Ids that are not UUIDs cannot name a job
fn parse_job_id(raw: &str) -> Result<Uuid, JobServiceError> {
    Uuid::parse_str(raw).map_err(|_| JobServiceError::NotFound)
}
