pub mod hub;
pub mod mistral;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// One candidate continuation produced by a generation backend.
#[derive(Debug, Clone)]
pub struct Generation {
    pub generated_text: String,
}

/// Sampling knobs passed to the backend on every call. The service uses one
/// fixed configuration for its whole lifetime.
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    pub do_sample: bool,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            do_sample: true,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

/// A text-generation backend. Implementations load and own the model; the
/// HTTP layer only ever sees this trait.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        max_new_tokens: usize,
        sampling: &SamplingConfig,
    ) -> Result<Vec<Generation>>;
}

// ---------------------------------------------------------
// PUBLIC SERVICE
// ---------------------------------------------------------
pub struct ChatService {
    engine: Arc<dyn TextGenerator>,
    sampling: SamplingConfig,
}

impl ChatService {
    pub fn new(engine: Arc<dyn TextGenerator>, sampling: SamplingConfig) -> Self {
        Self { engine, sampling }
    }

    /// Run one generation and return the first candidate's text.
    pub async fn generate(&self, prompt: &str, max_new_tokens: usize) -> Result<String> {
        let candidates = self
            .engine
            .generate(prompt, max_new_tokens, &self.sampling)
            .await?;

        candidates
            .into_iter()
            .next()
            .map(|c| c.generated_text)
            .ok_or_else(|| anyhow!("backend returned no candidates"))
    }
}
