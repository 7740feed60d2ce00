use crate::domain::voice::Voice;
use async_trait::async_trait;

/// Repository for a single speech synthesis call.
/// Abstracts the underlying TTS provider (Azure neural voices, Google, AWS Polly, OpenAI)
///
/// Implementations receive text that already fits the provider's per-call
/// limit; splitting and merging happen in the dispatcher.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize text with the given catalog voice
    ///
    /// Returns raw MP3 audio for this call
    ///
    /// # Errors
    /// Returns the upstream error text if synthesis fails or the provider is unavailable
    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<Vec<u8>, String>;
}

/// Preview of text for log lines, cut on a char boundary
pub(crate) fn text_preview(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
