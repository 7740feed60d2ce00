use super::model::{Gender, ProviderKind, Voice, DEFAULT_GOOGLE_CHUNK_LIMIT};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Voice used when a request does not name one
pub const DEFAULT_VOICE_ID: &str = "pt-BR-AntonioNeural";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read voice catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse voice catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("voice catalog is empty")]
    Empty,
    #[error("voice with empty id")]
    EmptyId,
    #[error("duplicate voice id: {0}")]
    DuplicateId(String),
    #[error("voice {0} has no language code")]
    MissingLanguage(String),
    #[error("voice {0} has a zero chunk limit")]
    ZeroChunkLimit(String),
}

/// Read-only lookup of the voices the service can synthesize with
#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
    index: HashMap<String, usize>,
}

impl VoiceCatalog {
    /// Build a catalog, validating every entry up front
    pub fn new(voices: Vec<Voice>) -> Result<Self, CatalogError> {
        if voices.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for voice in &voices {
            if voice.id.trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if !seen.insert(voice.id.as_str()) {
                return Err(CatalogError::DuplicateId(voice.id.clone()));
            }
            if voice.language.trim().is_empty() {
                return Err(CatalogError::MissingLanguage(voice.id.clone()));
            }
            if voice.provider.chunk_limit() == Some(0) {
                return Err(CatalogError::ZeroChunkLimit(voice.id.clone()));
            }
        }

        Ok(Self::from_validated(voices))
    }

    /// Load a JSON array of voices from disk
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let voices: Vec<Voice> = serde_json::from_str(&content)?;
        Self::new(voices)
    }

    /// Catalog shipped with the service
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(builtin_voices())
    }

    fn from_validated(voices: Vec<Voice>) -> Self {
        let index = voices
            .iter()
            .enumerate()
            .map(|(position, voice)| (voice.id.clone(), position))
            .collect();
        Self { voices, index }
    }

    pub fn get(&self, voice_id: &str) -> Option<&Voice> {
        self.index.get(voice_id).map(|&position| &self.voices[position])
    }

    pub fn contains(&self, voice_id: &str) -> bool {
        self.index.contains_key(voice_id)
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Keep only the voices matching `keep`, returning the dropped ones
    pub fn retain<F>(self, mut keep: F) -> (Self, Vec<Voice>)
    where
        F: FnMut(&Voice) -> bool,
    {
        let (kept, dropped): (Vec<Voice>, Vec<Voice>) =
            self.voices.into_iter().partition(|voice| keep(voice));
        (Self::from_validated(kept), dropped)
    }
}

fn voice(id: &str, label: &str, gender: Gender, provider: ProviderKind) -> Voice {
    let language = id.split('-').take(2).collect::<Vec<_>>().join("-");
    Voice {
        id: id.to_string(),
        label: label.to_string(),
        language,
        gender,
        voice_name: None,
        provider,
    }
}

fn builtin_voices() -> Vec<Voice> {
    let google = ProviderKind::Google {
        chunk_limit: DEFAULT_GOOGLE_CHUNK_LIMIT,
    };

    vec![
        voice(DEFAULT_VOICE_ID, "Antonio BR", Gender::Male, ProviderKind::Edge),
        voice("pt-BR-Neural2-B", "Bruno BR", Gender::Male, google.clone()),
        voice("pt-BR-FranciscaNeural", "Francisca BR", Gender::Female, ProviderKind::Edge),
        voice(
            "pt-BR-ThalitaMultilingualNeural",
            "Thalita BR",
            Gender::Female,
            ProviderKind::Edge,
        ),
        voice("pt-BR-Wavenet-C", "Fernanda BR", Gender::Female, google),
        voice("pt-BR-DonatoNeural", "Donato BR", Gender::Male, ProviderKind::Edge),
        voice("en-US-GuyNeural", "Guy US", Gender::Male, ProviderKind::Edge),
        voice("en-US-JennyNeural", "Jenny US", Gender::Female, ProviderKind::Edge),
        voice("es-ES-AlvaroNeural", "Álvaro ES", Gender::Male, ProviderKind::Edge),
        voice("es-ES-ElviraNeural", "Elvira ES", Gender::Female, ProviderKind::Edge),
    ]
}
