use super::error::DispatchError;
use crate::domain::job::SETUP_PROGRESS;
use crate::domain::text::chunker;
use crate::domain::voice::{ProviderName, Voice};
use crate::infrastructure::repositories::TtsRepository;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Share of the progress bar covered by provider calls (5..=95)
const SYNTHESIS_PROGRESS_SPAN: usize = 90;

/// Progress after `completed` of `total` chunks: `5 + floor(90 * completed / total)`
pub fn chunk_progress(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return SETUP_PROGRESS;
    }
    let span = SYNTHESIS_PROGRESS_SPAN * completed.min(total) / total;
    SETUP_PROGRESS + span as u8
}

/// Routes synthesis to the repository registered for a voice's provider and
/// applies that provider's chunking policy.
#[derive(Default, Clone)]
pub struct SpeechDispatcher {
    providers: BTreeMap<ProviderName, Arc<dyn TtsRepository>>,
}

impl SpeechDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, name: ProviderName, repository: Arc<dyn TtsRepository>) -> Self {
        self.providers.insert(name, repository);
        self
    }

    pub fn supports(&self, name: ProviderName) -> bool {
        self.providers.contains_key(&name)
    }

    pub fn providers(&self) -> Vec<ProviderName> {
        self.providers.keys().copied().collect()
    }

    /// Synthesize `text` with `voice`, returning the concatenated audio.
    ///
    /// Direct providers get the whole text in one call. Chunked providers get
    /// one call per chunk, in order, and `on_progress` is invoked after each
    /// successful chunk. The first failing call aborts the whole synthesis and
    /// audio from earlier chunks is dropped.
    pub async fn synthesize(
        &self,
        text: &str,
        voice: &Voice,
        on_progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<Vec<u8>, DispatchError> {
        let provider = voice.provider.name();
        let repository = self
            .providers
            .get(&provider)
            .ok_or(DispatchError::Unavailable(provider))?;

        if text.trim().is_empty() {
            return Err(DispatchError::EmptyText);
        }

        let Some(limit) = voice.provider.chunk_limit() else {
            tracing::info!(
                provider = %provider,
                voice = %voice.id,
                text_length = text.len(),
                "Synthesizing full text in a single call"
            );
            let audio = repository
                .synthesize(text, voice)
                .await
                .map_err(|message| DispatchError::Provider { provider, message })?;
            return Ok(audio);
        };

        let chunks = chunker::split(text, limit);
        if chunks.is_empty() {
            return Err(DispatchError::EmptyText);
        }
        let total = chunks.len();

        tracing::info!(
            provider = %provider,
            voice = %voice.id,
            chunk_count = total,
            chunk_limit = limit,
            text_length = text.len(),
            "Text split into chunks"
        );

        let mut merged_audio = Vec::new();
        for chunk in &chunks {
            tracing::info!(
                chunk_index = chunk.index,
                chunk_size = chunk.len(),
                "Synthesizing chunk"
            );

            let audio = repository
                .synthesize(&chunk.text, voice)
                .await
                .map_err(|message| {
                    tracing::error!(
                        chunk_index = chunk.index,
                        provider = %provider,
                        error = %message,
                        "Chunk synthesis failed"
                    );
                    DispatchError::Chunk {
                        provider,
                        index: chunk.index,
                        message,
                    }
                })?;
            merged_audio.extend(audio);

            on_progress(chunk_progress(chunk.index + 1, total));
            tracing::debug!(
                chunk_index = chunk.index,
                total_audio_size = merged_audio.len(),
                "Chunk synthesized and merged"
            );
        }

        Ok(merged_audio)
    }
}
