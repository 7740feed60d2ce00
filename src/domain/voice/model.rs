use serde::{Deserialize, Serialize};

pub const DEFAULT_GOOGLE_CHUNK_LIMIT: usize = 4500;
/// AWS Polly has a limit of 3000 characters per request
pub const DEFAULT_POLLY_CHUNK_LIMIT: usize = 3000;
/// OpenAI has a limit of 4096 characters per request
pub const DEFAULT_OPENAI_CHUNK_LIMIT: usize = 4096;

fn default_google_chunk_limit() -> usize {
    DEFAULT_GOOGLE_CHUNK_LIMIT
}

fn default_polly_chunk_limit() -> usize {
    DEFAULT_POLLY_CHUNK_LIMIT
}

fn default_openai_chunk_limit() -> usize {
    DEFAULT_OPENAI_CHUNK_LIMIT
}

/// Speech provider backing a voice, with its per-provider parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ProviderKind {
    /// Microsoft neural voices, synthesized in a single call
    Edge,
    Google {
        #[serde(default = "default_google_chunk_limit")]
        chunk_limit: usize,
    },
    Polly {
        #[serde(default = "default_polly_chunk_limit")]
        chunk_limit: usize,
    },
    #[serde(rename = "openai")]
    OpenAi {
        #[serde(default = "default_openai_chunk_limit")]
        chunk_limit: usize,
    },
}

impl ProviderKind {
    pub fn name(&self) -> ProviderName {
        match self {
            ProviderKind::Edge => ProviderName::Edge,
            ProviderKind::Google { .. } => ProviderName::Google,
            ProviderKind::Polly { .. } => ProviderName::Polly,
            ProviderKind::OpenAi { .. } => ProviderName::OpenAi,
        }
    }

    /// Per-call byte budget, `None` for providers that take the whole text
    pub fn chunk_limit(&self) -> Option<usize> {
        match self {
            ProviderKind::Edge => None,
            ProviderKind::Google { chunk_limit }
            | ProviderKind::Polly { chunk_limit }
            | ProviderKind::OpenAi { chunk_limit } => Some(*chunk_limit),
        }
    }
}

/// Provider identity without parameters, used to look up registered clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    Edge,
    Google,
    Polly,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderName::Edge => "edge",
            ProviderName::Google => "google",
            ProviderName::Polly => "polly",
            ProviderName::OpenAi => "openai",
        }
    }
}

impl std::fmt::Display for ProviderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Neutral,
}

impl Gender {
    /// SSML gender tag as expected by Google
    pub fn as_ssml(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Neutral => "NEUTRAL",
        }
    }
}

/// Voice catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub label: String,
    /// BCP-47 language code, e.g. `pt-BR`
    pub language: String,
    pub gender: Gender,
    /// Name of the voice on the provider side, when it differs from `id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_name: Option<String>,
    #[serde(flatten)]
    pub provider: ProviderKind,
}

impl Voice {
    pub fn provider_voice_name(&self) -> &str {
        self.voice_name.as_deref().unwrap_or(&self.id)
    }
}
