use serde::{Deserialize, Serialize};

/// Token budget applied when the caller leaves `max_new_tokens` out.
pub const DEFAULT_MAX_NEW_TOKENS: usize = 200;

fn default_max_new_tokens() -> usize {
    DEFAULT_MAX_NEW_TOKENS
}

// Both sides of the wire use these: the server deserializes what the
// terminal client serialized.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
