pub mod health;
pub mod jobs;
pub mod text;
pub mod tts;
pub mod voices;
