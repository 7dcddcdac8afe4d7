//! Embedding providers.
//!
//! `LocalModel` runs an XLM-RoBERTa-style encoder with candle from a local
//! model directory; `FakeEmbedder` hashes words into a deterministic vector
//! for tests and development. Both are L2-normalized so cosine similarity
//! reduces to a dot product downstream. Set `RAGDB_USE_FAKE_EMBEDDINGS=1`
//! to make `default_provider` return the fake.

pub mod device;
pub mod pool;
pub mod tokenize;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use ragdb_core::EmbedProvider;

/// Dimension used by the fake provider; matches the reference deployment's
/// text-embedding model.
pub const DEFAULT_EMBEDDING_DIM: usize = 768;

const MODEL_MAX_LEN: usize = 256;

pub struct LocalModel {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    id: String,
}

impl LocalModel {
    /// Load tokenizer, config, and weights from the local model directory
    /// (`RAGDB_MODEL_DIR`, falling back to `models/embedding`).
    pub fn load() -> Result<Self> {
        let device = device::select_device();
        let model_dir = resolve_model_dir()?;
        info!(dir = %model_dir.display(), "loading embedding model");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("failed to load tokenizer from {}: {e}", tokenizer_path.display()))?;

        let config_path = model_dir.join("config.json");
        let config: XLMRobertaConfig =
            serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;

        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)?;
        let weights_map: std::collections::HashMap<String, Tensor> =
            weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;

        let dim = config.hidden_size;
        let id = format!("local:xlm-roberta:d{dim}");
        info!(%id, "embedding model ready");
        Ok(Self { model, tokenizer, device, dim, id })
    }

    fn forward(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) =
            tokenize::encode_on_device(&self.tokenizer, text, MODEL_MAX_LEN, &self.device)?;
        let token_type_ids = Tensor::zeros((1, MODEL_MAX_LEN), DType::I64, &self.device)?;
        let hidden = self.model.forward(
            &input_ids,
            &attention_mask,
            &token_type_ids,
            None,
            None,
            None,
        )?;
        let pooled = pool::masked_mean_normalize(&hidden, &attention_mask)?;
        let vector: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if vector.len() != self.dim {
            return Err(anyhow!(
                "model returned {} dims, expected {}",
                vector.len(),
                self.dim
            ));
        }
        let elapsed = start.elapsed();
        if elapsed.as_millis() > 100 {
            warn!(ms = elapsed.as_millis() as u64, "slow embedding");
        } else {
            debug!(ms = elapsed.as_millis() as u64, "embedded text");
        }
        Ok(vector)
    }
}

impl EmbedProvider for LocalModel {
    fn embedder_id(&self) -> &str {
        &self.id
    }
    fn dim(&self) -> usize {
        self.dim
    }
    fn max_len(&self) -> usize {
        MODEL_MAX_LEN
    }
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.forward(text)
    }
}

/// Deterministic hash-based embedder for tests and development. Tokens are
/// hashed into bucket positions, so identical texts map to identical vectors
/// and word overlap yields high cosine similarity.
pub struct FakeEmbedder {
    dim: usize,
    id: String,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        let id = format!("fake:xxhash:d{dim}");
        Self { dim, id }
    }
}

impl EmbedProvider for FakeEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }
    fn dim(&self) -> usize {
        self.dim
    }
    fn max_len(&self) -> usize {
        MODEL_MAX_LEN
    }
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;

        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }
}

/// Provider selection for binaries and tests: `RAGDB_USE_FAKE_EMBEDDINGS=1`
/// picks the fake, anything else loads the local model.
pub fn default_provider() -> Result<Box<dyn EmbedProvider>> {
    let use_fake = std::env::var("RAGDB_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        info!("using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(DEFAULT_EMBEDDING_DIM)));
    }
    Ok(Box::new(LocalModel::load()?))
}

fn resolve_model_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("RAGDB_MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            return Ok(p);
        }
    }
    let default = Path::new("models/embedding");
    if default.exists() {
        return Ok(default.to_path_buf());
    }
    Err(anyhow!(
        "could not locate embedding model directory; set RAGDB_MODEL_DIR"
    ))
}
