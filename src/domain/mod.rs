pub mod job;
pub mod text;
pub mod tts;
pub mod voice;
