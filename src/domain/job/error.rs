use crate::domain::tts::DispatchError;
use crate::error::AppError;
use crate::infrastructure::repositories::ArtifactError;

#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("job not found")]
    NotFound,
    #[error("{0}")]
    NotReady(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("storage error: {0}")]
    Io(String),
    #[error("service is shutting down")]
    ShuttingDown,
}

impl From<DispatchError> for JobServiceError {
    fn from(err: DispatchError) -> Self {
        JobServiceError::Provider(err.to_string())
    }
}

impl From<ArtifactError> for JobServiceError {
    fn from(err: ArtifactError) -> Self {
        JobServiceError::Io(err.to_string())
    }
}

impl From<JobServiceError> for AppError {
    fn from(err: JobServiceError) -> Self {
        match err {
            JobServiceError::Validation(msg) => AppError::BadRequest(msg),
            JobServiceError::NotFound => AppError::NotFound("job not found".to_string()),
            JobServiceError::NotReady(msg) => AppError::NotReady(msg),
            JobServiceError::Provider(msg) => AppError::ExternalService(msg),
            JobServiceError::Io(msg) => AppError::Internal(msg),
            JobServiceError::ShuttingDown => AppError::ServiceUnavailable("service is shutting down".to_string()),
        }
    }
}
