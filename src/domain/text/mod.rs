pub mod chunker;
pub mod estimate;
pub mod reconstruct;

pub use chunker::{split, Chunk};
pub use estimate::{estimate, ProcessingEstimate};
pub use reconstruct::{reconstruct, reconstruct_text, word_count};

use serde::{Deserialize, Serialize};

/// Request for POST /api/extract and POST /api/estimate
#[derive(Debug, Serialize, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: String,
}

/// Response for POST /api/extract
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub text: String,
    pub char_count: usize,
    pub word_count: usize,
}
