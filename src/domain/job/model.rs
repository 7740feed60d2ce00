use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress reported as soon as a job starts processing
pub const SETUP_PROGRESS: u8 = 5;
/// Highest progress a job can report before it is done
pub const MAX_PENDING_PROGRESS: u8 = 99;
pub const DONE_PROGRESS: u8 = 100;

pub const AUDIO_MIME_TYPE: &str = "audio/mpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Done,
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a finished job's audio lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub key: String,
    pub mime_type: String,
    pub filename: String,
    pub size_bytes: usize,
}

impl ArtifactRef {
    pub fn mp3(key: String, filename: &str, size_bytes: usize) -> Self {
        Self {
            key,
            mime_type: AUDIO_MIME_TYPE.to_string(),
            filename: filename.to_string(),
            size_bytes,
        }
    }
}

/// Audio payload handed to a client
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum JobState {
    Pending,
    Processing,
    Done { artifact: ArtifactRef },
    Failed { message: String },
}

/// One synthesis request tracked from submission to delivery.
///
/// State changes go through the transition methods, which refuse to leave a
/// terminal state, keep progress monotonic and below 100 until done, and
/// hold exactly one of artifact or error message once terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: Uuid,
    pub voice_id: String,
    pub created_at: DateTime<Utc>,
    progress: u8,
    state: JobState,
    delivered: bool,
}

impl Job {
    pub fn new(voice_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            voice_id: voice_id.into(),
            created_at: Utc::now(),
            progress: 0,
            state: JobState::Pending,
            delivered: false,
        }
    }

    pub fn status(&self) -> JobStatus {
        match self.state {
            JobState::Pending => JobStatus::Pending,
            JobState::Processing => JobStatus::Processing,
            JobState::Done { .. } => JobStatus::Done,
            JobState::Failed { .. } => JobStatus::Error,
        }
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    pub fn artifact(&self) -> Option<&ArtifactRef> {
        match &self.state {
            JobState::Done { artifact } => Some(artifact),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            JobState::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Pending -> Processing
    pub fn start(&mut self) -> bool {
        if self.state != JobState::Pending {
            return false;
        }
        self.state = JobState::Processing;
        self.progress = self.progress.max(SETUP_PROGRESS);
        true
    }

    /// Raise progress while processing; lower values are ignored
    pub fn advance(&mut self, progress: u8) -> bool {
        if self.state != JobState::Processing {
            return false;
        }
        let progress = progress.min(MAX_PENDING_PROGRESS);
        if progress <= self.progress {
            return false;
        }
        self.progress = progress;
        true
    }

    /// Processing -> Done
    pub fn complete(&mut self, artifact: ArtifactRef) -> bool {
        if self.state != JobState::Processing {
            return false;
        }
        self.state = JobState::Done { artifact };
        self.progress = DONE_PROGRESS;
        true
    }

    /// Any non-terminal state -> Error; progress stays where it was
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.state = JobState::Failed {
            message: message.into(),
        };
        true
    }

    /// Record the first successful download. Returns `false` on later ones.
    pub fn mark_delivered(&mut self) -> bool {
        if self.artifact().is_none() || self.delivered {
            return false;
        }
        self.delivered = true;
        true
    }

    #[cfg(test)]
    pub fn is_delivered(&self) -> bool {
        self.delivered
    }
}
