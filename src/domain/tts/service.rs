use super::dispatcher::SpeechDispatcher;
use super::error::TtsServiceError;
use crate::domain::job::{artifact_key, Artifact, RetentionPolicy, AUDIO_MIME_TYPE, DOWNLOAD_FILENAME};
use crate::domain::voice::{Voice, VoiceCatalog};
use crate::infrastructure::repositories::ArtifactRepository;
use crate::infrastructure::scheduler::CleanupScheduler;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const PREVIEW_FILENAME: &str = "preview.mp3";

const PREVIEW_FALLBACK_LANGUAGE: &str = "pt-BR";

const PREVIEW_TEXTS: &[(&str, &str)] = &[
    (
        "pt-BR",
        "Olá! Esta é uma prévia da minha voz. Eu sou uma voz neural, capaz de narrar seus audiobooks com qualidade profissional e muito realismo.",
    ),
    (
        "en-US",
        "Hello! This is a preview of my voice. I am a neural voice, capable of narrating your audiobooks with professional quality and great realism.",
    ),
    (
        "es-ES",
        "Hola! Esta es una vista previa de mi voz. Soy una voz neuronal, capaz de narrar tus audiolibros con calidad profesional y gran realismo.",
    ),
];

/// Sample sentence for a voice's language, Portuguese when unknown
pub fn preview_text(language: &str) -> &'static str {
    PREVIEW_TEXTS
        .iter()
        .find(|(code, _)| *code == language)
        .or_else(|| PREVIEW_TEXTS.iter().find(|(code, _)| *code == PREVIEW_FALLBACK_LANGUAGE))
        .map(|(_, text)| *text)
        .unwrap_or_default()
}

fn preview_key(file_id: Uuid) -> String {
    format!("preview_{}.mp3", file_id)
}

/// Synthesis answered within the request: full audiobooks and voice previews
pub struct TtsService {
    catalog: Arc<VoiceCatalog>,
    dispatcher: Arc<SpeechDispatcher>,
    artifacts: Arc<dyn ArtifactRepository>,
    scheduler: Arc<CleanupScheduler>,
    retention: RetentionPolicy,
    preview_cache: Option<Cache<String, Vec<u8>>>,
}

impl TtsService {
    pub fn new(
        catalog: Arc<VoiceCatalog>,
        dispatcher: Arc<SpeechDispatcher>,
        artifacts: Arc<dyn ArtifactRepository>,
        scheduler: Arc<CleanupScheduler>,
        retention: RetentionPolicy,
        preview_cache_enabled: bool,
    ) -> Self {
        // Previews never change for a voice, so a small idle-based cache is enough
        let preview_cache = if preview_cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(100)
                    .time_to_idle(Duration::from_secs(30 * 60))
                    .build(),
            )
        } else {
            None
        };

        Self {
            catalog,
            dispatcher,
            artifacts,
            scheduler,
            retention,
            preview_cache,
        }
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Synthesize a whole text while the caller waits
    ///
    /// This operation:
    /// - Validates the text and voice like a background job submission
    /// - Synthesizes through the dispatcher, chunking when the provider needs it
    /// - Stores the audio briefly so slow clients can finish reading it
    ///
    /// Returns the audio with its download filename
    async fn generate(&self, text: String, voice_id: String) -> Result<Artifact, TtsServiceError>;

    /// Short sample of a voice in its own language
    async fn preview(&self, voice_id: String) -> Result<Artifact, TtsServiceError>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn generate(&self, text: String, voice_id: String) -> Result<Artifact, TtsServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TtsServiceError::Invalid("Text cannot be empty".to_string()));
        }
        let voice = self.find_voice(&voice_id)?;

        let started = Instant::now();
        let audio = self.dispatcher.synthesize(text, voice, &|_| {}).await?;

        let file_id = Uuid::new_v4();
        let key = artifact_key(file_id);
        self.store_temporarily(file_id, &key, &audio, self.retention.sync_download)
            .await?;

        tracing::info!(
            voice = %voice.id,
            char_count = text.chars().count(),
            audio_size = audio.len(),
            processing_time_ms = started.elapsed().as_millis() as u64,
            "Audiobook generated"
        );

        Ok(Artifact {
            bytes: audio,
            mime_type: AUDIO_MIME_TYPE.to_string(),
            filename: DOWNLOAD_FILENAME.to_string(),
        })
    }

    async fn preview(&self, voice_id: String) -> Result<Artifact, TtsServiceError> {
        let voice = self.find_voice(&voice_id)?;

        if let Some(cache) = &self.preview_cache {
            if let Some(audio) = cache.get(&voice.id).await {
                tracing::info!(voice = %voice.id, audio_size = audio.len(), "Preview cache hit");
                return Ok(preview_artifact(audio));
            }
        }

        let audio = self
            .dispatcher
            .synthesize(preview_text(&voice.language), voice, &|_| {})
            .await?;

        let file_id = Uuid::new_v4();
        self.store_temporarily(file_id, &preview_key(file_id), &audio, self.retention.preview)
            .await?;

        if let Some(cache) = &self.preview_cache {
            cache.insert(voice.id.clone(), audio.clone()).await;
        }

        tracing::info!(voice = %voice.id, audio_size = audio.len(), "Preview generated");
        Ok(preview_artifact(audio))
    }
}

impl TtsService {
    fn find_voice(&self, voice_id: &str) -> Result<&Voice, TtsServiceError> {
        self.catalog
            .get(voice_id)
            .ok_or_else(|| TtsServiceError::Invalid(format!("Unknown voice: {}", voice_id)))
    }

    /// Write the audio and schedule its removal after `retention`
    async fn store_temporarily(
        &self,
        file_id: Uuid,
        key: &str,
        audio: &[u8],
        retention: Duration,
    ) -> Result<(), TtsServiceError> {
        self.artifacts.save(key, audio).await?;

        let artifacts = self.artifacts.clone();
        let key = key.to_string();
        self.scheduler.schedule(file_id, retention, async move {
            if let Err(e) = artifacts.delete(&key).await {
                tracing::warn!(key = %key, error = %e, "Failed to remove temporary audio");
            }
        });
        Ok(())
    }
}

fn preview_artifact(bytes: Vec<u8>) -> Artifact {
    Artifact {
        bytes,
        mime_type: AUDIO_MIME_TYPE.to_string(),
        filename: PREVIEW_FILENAME.to_string(),
    }
}
