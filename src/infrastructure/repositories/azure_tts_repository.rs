use super::tts_repository::{text_preview, TtsRepository};
use crate::domain::voice::Voice;
use async_trait::async_trait;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";
const OUTPUT_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";
const USER_AGENT: &str = "audiobook-backend";

/// Microsoft neural voice synthesis through the Azure Speech REST endpoint.
///
/// These are the same neural voices the Edge read-aloud feature exposes
/// (`pt-BR-AntonioNeural`, ...). The endpoint accepts a whole document per
/// call, so the dispatcher never chunks text for this provider.
pub struct AzureTtsRepository {
    http_client: reqwest::Client,
    endpoint: String,
    subscription_key: String,
}

impl AzureTtsRepository {
    pub fn new(http_client: reqwest::Client, region: &str, subscription_key: String) -> Self {
        Self::with_endpoint(
            http_client,
            format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1"),
            subscription_key,
        )
    }

    pub fn with_endpoint(
        http_client: reqwest::Client,
        endpoint: String,
        subscription_key: String,
    ) -> Self {
        Self {
            http_client,
            endpoint,
            subscription_key,
        }
    }
}

#[async_trait]
impl TtsRepository for AzureTtsRepository {
    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();
        let ssml = build_ssml(text, voice.provider_voice_name(), &voice.language);

        tracing::info!(
            voice = voice.provider_voice_name(),
            language = %voice.language,
            text_length = text.len(),
            text_preview = text_preview(text),
            "Calling Azure speech synthesis"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .header("Content-Type", "application/ssml+xml")
            .header(OUTPUT_FORMAT_HEADER, OUTPUT_FORMAT)
            .header("User-Agent", USER_AGENT)
            .body(ssml)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Azure speech request failed");
                format!("Azure speech request failed: {}", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(status = %status, body = %body, "Azure speech synthesis rejected");
            return Err(format!("Azure speech error ({}): {}", status, body));
        }

        let audio_bytes = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read Azure audio: {}", e))?
            .to_vec();

        tracing::info!(
            provider = "edge",
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = text.len(),
            audio_size_bytes = audio_bytes.len(),
            "Azure speech synthesis completed"
        );

        Ok(audio_bytes)
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn build_ssml(text: &str, voice_name: &str, language: &str) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='{}'><voice name='{}'>{}</voice></speak>",
        escape_xml(language),
        escape_xml(voice_name),
        escape_xml(text)
    )
}
