use super::tts_repository::{text_preview, TtsRepository};
use crate::domain::voice::{Gender, Voice};
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel, Voice as OpenAiVoice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI TTS implementation of TTS repository
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }
}

/// Map a catalog voice onto one of OpenAI's fixed voices
fn openai_voice(voice: &Voice) -> OpenAiVoice {
    match voice.provider_voice_name().to_lowercase().as_str() {
        "alloy" => OpenAiVoice::Alloy,
        "echo" => OpenAiVoice::Echo,
        "fable" => OpenAiVoice::Fable,
        "onyx" => OpenAiVoice::Onyx,
        "nova" => OpenAiVoice::Nova,
        "shimmer" => OpenAiVoice::Shimmer,
        _ => match voice.gender {
            Gender::Male => OpenAiVoice::Onyx,
            Gender::Female => OpenAiVoice::Nova,
            Gender::Neutral => OpenAiVoice::Alloy,
        },
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();
        let voice_enum = openai_voice(voice);

        tracing::info!(
            model = %self.model,
            voice = ?voice_enum,
            text_length = text.len(),
            text_preview = text_preview(text),
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequest {
            model: self.speech_model(),
            input: text.to_string(),
            voice: voice_enum.clone(),
            response_format: None, // Defaults to MP3
            speed: None,           // Defaults to 1.0
        };

        let response = self.client.audio().speech(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                voice = ?voice_enum,
                text_length = text.len(),
                "OpenAI TTS API call failed"
            );
            format!("OpenAI TTS error: {}", e)
        })?;

        let audio_bytes = response.bytes.to_vec();

        tracing::info!(
            provider = "openai",
            model = %self.model,
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = text.len(),
            audio_size_bytes = audio_bytes.len(),
            "OpenAI call completed"
        );

        Ok(audio_bytes)
    }
}
