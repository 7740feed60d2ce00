use crate::domain::job::RetentionPolicy;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Storage and voices
    pub audio_dir: PathBuf,
    pub voice_catalog_path: Option<PathBuf>,
    // Retention (seconds)
    pub job_retention_secs: u64,
    pub sync_retention_secs: u64,
    pub preview_retention_secs: u64,
    pub job_idle_timeout_secs: u64,
    // Jobs and requests
    pub max_concurrent_jobs: usize,
    pub shutdown_grace_secs: u64,
    pub max_text_bytes: usize,
    pub preview_cache_enabled: bool,
    // Edge voices (Azure Speech)
    pub azure_speech_key: Option<String>,
    pub azure_speech_region: String,
    pub azure_speech_endpoint: Option<String>,
    // Google Cloud TTS
    pub google_tts_api_key: Option<String>,
    pub google_tts_endpoint: Option<String>,
    // AWS Polly
    pub polly_enabled: bool,
    pub aws_region: String,
    // OpenAI
    pub openai_api_key: Option<String>,
    pub openai_tts_model: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 5000)?,
            environment: match env::var("ENVIRONMENT").as_deref() {
                Ok("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            audio_dir: env::var("AUDIO_DIR")
                .unwrap_or_else(|_| "./temp_audio".to_string())
                .into(),
            voice_catalog_path: optional_var("VOICE_CATALOG_PATH").map(PathBuf::from),
            job_retention_secs: parse_var("JOB_RETENTION_SECS", 3600)?,
            sync_retention_secs: parse_var("SYNC_RETENTION_SECS", 30)?,
            preview_retention_secs: parse_var("PREVIEW_RETENTION_SECS", 10)?,
            job_idle_timeout_secs: parse_var("JOB_IDLE_TIMEOUT_SECS", 86400)?,
            max_concurrent_jobs: parse_var("MAX_CONCURRENT_JOBS", 0)?,
            shutdown_grace_secs: parse_var("SHUTDOWN_GRACE_SECS", 30)?,
            max_text_bytes: parse_var("MAX_TEXT_BYTES", 5 * 1024 * 1024)?,
            preview_cache_enabled: flag_var("PREVIEW_CACHE_ENABLED", true),
            azure_speech_key: optional_var("AZURE_SPEECH_KEY"),
            azure_speech_region: env::var("AZURE_SPEECH_REGION")
                .unwrap_or_else(|_| "brazilsouth".to_string()),
            azure_speech_endpoint: optional_var("AZURE_SPEECH_ENDPOINT"),
            google_tts_api_key: optional_var("GOOGLE_TTS_API_KEY"),
            google_tts_endpoint: optional_var("GOOGLE_TTS_ENDPOINT"),
            polly_enabled: flag_var("POLLY_ENABLED", false),
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            openai_api_key: optional_var("OPENAI_API_KEY"),
            openai_tts_model: env::var("OPENAI_TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string()),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy {
            job_download: Duration::from_secs(self.job_retention_secs),
            sync_download: Duration::from_secs(self.sync_retention_secs),
            preview: Duration::from_secs(self.preview_retention_secs),
            idle_timeout: Duration::from_secs(self.job_idle_timeout_secs),
        }
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Non-empty value of an environment variable
fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T>(name: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| format!("invalid {}: {}", name, e).into()),
        None => Ok(default),
    }
}

fn flag_var(name: &str, default: bool) -> bool {
    optional_var(name)
        .map(|value| value.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
