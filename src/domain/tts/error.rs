use crate::domain::voice::ProviderName;
use crate::error::AppError;
use crate::infrastructure::repositories::ArtifactError;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("provider {0} is not configured")]
    Unavailable(ProviderName),
    #[error("nothing to synthesize")]
    EmptyText,
    #[error("{provider} synthesis failed: {message}")]
    Provider {
        provider: ProviderName,
        message: String,
    },
    #[error("{provider} synthesis failed on chunk {index}: {message}")]
    Chunk {
        provider: ProviderName,
        index: usize,
        message: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("storage error: {0}")]
    Io(String),
}

impl From<DispatchError> for TtsServiceError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::EmptyText => TtsServiceError::Invalid(err.to_string()),
            _ => TtsServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<ArtifactError> for TtsServiceError {
    fn from(err: ArtifactError) -> Self {
        TtsServiceError::Io(err.to_string())
    }
}

impl From<TtsServiceError> for AppError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Invalid(msg) => AppError::BadRequest(msg),
            TtsServiceError::Dependency(msg) => AppError::ExternalService(msg),
            TtsServiceError::Io(msg) => AppError::Internal(msg),
        }
    }
}
