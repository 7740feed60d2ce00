pub mod catalog;
pub mod model;

pub use catalog::{CatalogError, VoiceCatalog, DEFAULT_VOICE_ID};
pub use model::{Gender, ProviderKind, ProviderName, Voice};

use serde::{Deserialize, Serialize};

/// Entry of GET /api/voices
#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceResponse {
    pub id: String,
    pub label: String,
    pub provider: ProviderName,
    pub language: String,
    pub gender: Gender,
}

/// Response for GET /api/voices
#[derive(Debug, Serialize, Deserialize)]
pub struct VoicesResponse {
    pub voices: Vec<VoiceResponse>,
}

impl From<&Voice> for VoiceResponse {
    fn from(voice: &Voice) -> Self {
        Self {
            id: voice.id.clone(),
            label: voice.label.clone(),
            provider: voice.provider.name(),
            language: voice.language.clone(),
            gender: voice.gender,
        }
    }
}
