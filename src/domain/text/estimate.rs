use serde::{Deserialize, Serialize};

/// Empirical synthesis throughput, characters per second of processing
const CHARS_PER_PROCESSING_SECOND: f64 = 200.0;
/// Fixed setup overhead per request, in seconds
const SETUP_OVERHEAD_SECONDS: f64 = 3.0;
const MIN_ESTIMATE_SECONDS: f64 = 5.0;
const CHARS_PER_WORD: f64 = 5.0;
const WORDS_PER_MINUTE: f64 = 150.0;

/// Response for POST /api/estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingEstimate {
    pub char_count: usize,
    pub estimated_seconds: u64,
    pub estimated_audio_duration_minutes: u64,
}

/// Estimate processing time and resulting audio length for a text
pub fn estimate(text: &str) -> ProcessingEstimate {
    let char_count = text.trim().chars().count();
    let chars = char_count as f64;

    let mut seconds = (chars / CHARS_PER_PROCESSING_SECOND + SETUP_OVERHEAD_SECONDS)
        .max(MIN_ESTIMATE_SECONDS);

    // Very long texts synthesize slower
    if char_count > 50_000 {
        seconds *= 1.2;
    }
    if char_count > 100_000 {
        seconds *= 1.3;
    }

    ProcessingEstimate {
        char_count,
        estimated_seconds: seconds.round() as u64,
        estimated_audio_duration_minutes: (chars / CHARS_PER_WORD / WORDS_PER_MINUTE).round()
            as u64,
    }
}
