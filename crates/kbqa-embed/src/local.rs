//! Local sentence-transformer embedder (BERT family, e.g. all-MiniLM-L6-v2)
//! running on candle.
//!
//! Inference is CPU/GPU bound, so `embed` hands the work to tokio's blocking
//! pool; the model itself is shared read-only behind an `Arc`.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use kbqa_core::error::EmbedError;
use kbqa_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_on_device;

struct BertRuntime {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    max_len: usize,
}

impl BertRuntime {
    fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let emb = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1::<f32>()?;
        let elapsed = start.elapsed();
        if elapsed.as_millis() > 100 {
            tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, "slow embedding");
        }
        Ok(emb)
    }
}

pub struct LocalEmbedder {
    runtime: Arc<BertRuntime>,
    id: String,
    dim: usize,
}

impl LocalEmbedder {
    /// Load tokenizer, config and weights from `model_dir`.
    ///
    /// Weights are read from `model.safetensors` when present, otherwise from
    /// `pytorch_model.bin`.
    pub fn load(model_dir: &Path, model_name: &str, max_len: usize) -> Result<Self> {
        let device = select_device();
        tracing::info!(model = model_name, dir = %model_dir.display(), "loading local embedding model");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let config: BertConfig = serde_json::from_str(
            &std::fs::read_to_string(&config_path).with_context(|| format!("reading {}", config_path.display()))?,
        )?;

        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = BertModel::load(vb, &config)?;

        let dim = config.hidden_size;
        let id = format!("local:{model_name}:d{dim}");
        tracing::info!(embedder = %id, "local embedding model loaded");
        Ok(Self { runtime: Arc::new(BertRuntime { model, tokenizer, device, max_len }), id, dim })
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        let weights = candle_core::pickle::read_all(&pickle)?;
        return Ok(weights.into_iter().collect());
    }
    Err(anyhow!("No model.safetensors or pytorch_model.bin in {}", model_dir.display()))
}

#[async_trait]
impl Embedder for LocalEmbedder {
    fn embedder_id(&self) -> &str { &self.id }

    fn dim(&self) -> usize { self.dim }

    async fn embed(&self, text: &str, _api_key: Option<&str>) -> Result<Vec<f32>, EmbedError> {
        let runtime = Arc::clone(&self.runtime);
        let text = text.to_string();
        let emb = tokio::task::spawn_blocking(move || runtime.embed_text(&text))
            .await
            .map_err(|e| EmbedError::Model(format!("embedding worker failed: {e}")))?
            .map_err(|e| EmbedError::Model(e.to_string()))?;
        if emb.len() != self.dim {
            return Err(EmbedError::Dimension { expected: self.dim, got: emb.len() });
        }
        Ok(emb)
    }
}
