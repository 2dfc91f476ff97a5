use anyhow::{anyhow, Result};
use async_trait::async_trait;
use candle::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::mistral::{Config as MistralConfig, Model as Mistral};
use tokenizers::Tokenizer;

use std::{fs, sync::Arc};
use tokio::sync::Mutex;

use crate::inference::{hub, Generation, SamplingConfig, TextGenerator};

// ---------------------------------------------------------
// PUBLIC SERVICE
// ---------------------------------------------------------
pub struct MistralService {
    model: Arc<Mutex<Mistral>>,
    tokenizer: Arc<Tokenizer>,
    device: Device,
    echo_prompt: bool,
}

impl MistralService {
    // -----------------------------------------------------
    // Constructor: resolve the model id, pick hardware, load
    // -----------------------------------------------------
    pub async fn load(model_id: &str, revision: &str, echo_prompt: bool) -> Result<Self> {
        let device = Device::cuda_if_available(0)?;
        let dtype = if device.is_cuda() {
            DType::F16
        } else {
            DType::F32
        };
        println!("🔌 Using {device:?} with {dtype:?} weights");

        let snapshot = hub::fetch(model_id, revision).await?;

        // ---- Load tokenizer ----
        let tokenizer = Arc::new(
            Tokenizer::from_file(&snapshot.tokenizer)
                .map_err(|e| anyhow!("Tokenizer error: {e}"))?,
        );

        // ---- Load config ----
        let cfg: MistralConfig = serde_json::from_slice(&fs::read(&snapshot.config)?)?;

        // ---- mmap the model weights ----
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&snapshot.weights, dtype, &device)? };

        let model = Arc::new(Mutex::new(Mistral::new(&cfg, vb)?));

        println!("🚀 {model_id} loaded");

        Ok(Self {
            model,
            tokenizer,
            device,
            echo_prompt,
        })
    }

    fn eos_id(&self) -> u32 {
        self.tokenizer
            .token_to_id("</s>")
            .or_else(|| self.tokenizer.token_to_id("<eos>"))
            .unwrap_or(u32::MAX)
    }
}

#[async_trait]
impl TextGenerator for MistralService {
    async fn generate(
        &self,
        prompt: &str,
        max_new_tokens: usize,
        sampling: &SamplingConfig,
    ) -> Result<Vec<Generation>> {
        // Fresh KV cache per request: calls are stateless w.r.t. each other.
        {
            let mut m = self.model.lock().await;
            m.clear_kv_cache();
        }

        let enc = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| anyhow!("Tokenizer encode error: {e}"))?;
        let mut tokens = enc.get_ids().to_vec();
        let prompt_len = tokens.len();
        let eos = self.eos_id();

        let mut lp = sampler(sampling);
        let mut pos = 0usize;

        for _ in 0..max_new_tokens {
            // First step feeds the whole prompt, later steps the last token.
            let ctx: &[u32] = if pos == 0 {
                &tokens
            } else {
                std::slice::from_ref(tokens.last().ok_or_else(|| anyhow!("empty context"))?)
            };

            let input = Tensor::new(ctx, &self.device)?.unsqueeze(0)?;

            let logits = {
                let mut m = self.model.lock().await;
                let out = m.forward(&input, pos)?;
                let seq_len = out.dim(1)?;
                out.i((0, seq_len - 1))?.to_dtype(DType::F32)?
            };

            pos += ctx.len();

            let next = lp.sample(&logits)?;
            if next == eos {
                break;
            }
            tokens.push(next);

            tokio::task::yield_now().await;
        }

        let decoded: &[u32] = if self.echo_prompt {
            &tokens
        } else {
            &tokens[prompt_len..]
        };

        let text = self
            .tokenizer
            .decode(decoded, true)
            .map_err(|e| anyhow!("Tokenizer decode error: {e}"))?;

        Ok(vec![Generation {
            generated_text: text,
        }])
    }
}

// ---------------------------------------------------------
// Helpers
// ---------------------------------------------------------
fn sampler(sampling: &SamplingConfig) -> LogitsProcessor {
    if sampling.do_sample {
        LogitsProcessor::new(seed(), Some(sampling.temperature), Some(sampling.top_p))
    } else {
        // No temperature means argmax decoding.
        LogitsProcessor::new(seed(), None, None)
    }
}

fn seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
