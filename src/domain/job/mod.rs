pub mod error;
pub mod model;
pub mod service;
pub mod store;

pub use error::JobServiceError;
pub use model::{
    Artifact, ArtifactRef, Job, JobStatus, AUDIO_MIME_TYPE, DONE_PROGRESS, SETUP_PROGRESS,
};
pub use service::{artifact_key, JobService, JobServiceApi, RetentionPolicy, DOWNLOAD_FILENAME};
pub use store::JobStore;

use crate::domain::voice::DEFAULT_VOICE_ID;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request for POST /api/jobs and POST /api/generate
#[derive(Debug, Serialize, Deserialize)]
pub struct SynthesisRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_voice")]
    pub voice: String,
}

fn default_voice() -> String {
    DEFAULT_VOICE_ID.to_string()
}

/// Response for POST /api/jobs
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitJobResponse {
    pub job_id: Uuid,
}

/// Response for GET /api/jobs/:job_id
#[derive(Debug, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub voice_id: String,
    pub status: JobStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Job> for JobStatusResponse {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id,
            voice_id: job.voice_id.clone(),
            status: job.status(),
            progress: job.progress(),
            error_message: job.error_message().map(str::to_string),
            created_at: job.created_at,
        }
    }
}
