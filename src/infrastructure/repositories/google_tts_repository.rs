use super::tts_repository::{text_preview, TtsRepository};
use crate::domain::voice::Voice;
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;

pub const GOOGLE_TTS_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleSynthesizeResponse {
    audio_content: String,
}

/// Google Cloud Text-to-Speech implementation of TTS repository, authenticated with an API key
pub struct GoogleTtsRepository {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GoogleTtsRepository {
    pub fn new(http_client: reqwest::Client, api_key: String) -> Self {
        Self::with_endpoint(http_client, GOOGLE_TTS_URL.to_string(), api_key)
    }

    pub fn with_endpoint(http_client: reqwest::Client, endpoint: String, api_key: String) -> Self {
        Self {
            http_client,
            endpoint,
            api_key,
        }
    }
}

fn build_request_body(text: &str, voice: &Voice) -> serde_json::Value {
    json!({
        "input": { "text": text },
        "voice": {
            "languageCode": voice.language,
            "name": voice.provider_voice_name(),
            "ssmlGender": voice.gender.as_ssml(),
        },
        "audioConfig": { "audioEncoding": "MP3" }
    })
}

fn decode_audio(body: &str) -> Result<Vec<u8>, String> {
    let response: GoogleSynthesizeResponse = serde_json::from_str(body)
        .map_err(|e| format!("Failed to parse Google TTS response: {}", e))?;

    base64::engine::general_purpose::STANDARD
        .decode(response.audio_content.as_bytes())
        .map_err(|e| format!("Failed to decode Google TTS audio: {}", e))
}

#[async_trait]
impl TtsRepository for GoogleTtsRepository {
    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();

        tracing::info!(
            voice = voice.provider_voice_name(),
            language = %voice.language,
            text_length = text.len(),
            text_preview = text_preview(text),
            "Calling Google TTS API"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&build_request_body(text, voice))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Google TTS request failed");
                format!("Google TTS request failed: {}", e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read Google TTS response: {}", e))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Google TTS API rejected request");
            return Err(format!("Google TTS API error ({}): {}", status, body));
        }

        let audio_bytes = decode_audio(&body)?;

        tracing::info!(
            provider = "google",
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = text.len(),
            audio_size_bytes = audio_bytes.len(),
            "Google TTS call completed"
        );

        Ok(audio_bytes)
    }
}
