pub mod dispatcher;
pub mod error;
pub mod service;

pub use dispatcher::{chunk_progress, SpeechDispatcher};
pub use error::{DispatchError, TtsServiceError};
pub use service::{preview_text, TtsService, TtsServiceApi};

use crate::domain::voice::DEFAULT_VOICE_ID;
use serde::{Deserialize, Serialize};

/// Request for POST /api/preview
#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewRequest {
    #[serde(default = "default_preview_voice")]
    pub voice: String,
}

fn default_preview_voice() -> String {
    DEFAULT_VOICE_ID.to_string()
}
