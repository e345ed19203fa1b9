//! Embedding providers behind the [`kbqa_core::traits::Embedder`] contract.
//!
//! `build_embedder` picks one from configuration. `APP_USE_FAKE_EMBEDDINGS=1`
//! forces the deterministic [`HashEmbedder`] for fast runs without model files.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kbqa_core::config::{expand_path, EmbedderConfig, EmbedderKind};
use kbqa_core::traits::Embedder;

pub mod device;
pub mod hash;
pub mod local;
pub mod pool;
pub mod remote;
pub mod tokenize;

pub use hash::HashEmbedder;
pub use local::LocalEmbedder;
pub use pool::masked_mean_l2;
pub use remote::RemoteEmbedder;

pub fn build_embedder(cfg: &EmbedderConfig) -> Result<Arc<dyn Embedder>> {
    if use_fake_embeddings() {
        tracing::info!(dim = cfg.dim, "APP_USE_FAKE_EMBEDDINGS set, using HashEmbedder");
        return Ok(Arc::new(HashEmbedder::new(cfg.dim)?));
    }
    match cfg.kind {
        EmbedderKind::Hash => Ok(Arc::new(HashEmbedder::new(cfg.dim)?)),
        EmbedderKind::Remote => Ok(Arc::new(RemoteEmbedder::new(cfg)?)),
        EmbedderKind::Local => {
            let dir = resolve_model_dir(cfg)?;
            Ok(Arc::new(LocalEmbedder::load(&dir, &cfg.model_name, cfg.max_len)?))
        }
    }
}

fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Locate the local model directory: `embedder.model_dir`, then
/// `APP_MODEL_DIR`, `MODEL_DIR`, and finally `models/<model_name>`.
pub fn resolve_model_dir(cfg: &EmbedderConfig) -> Result<PathBuf> {
    let candidates = cfg
        .model_dir
        .iter()
        .cloned()
        .chain(std::env::var("APP_MODEL_DIR").ok())
        .chain(std::env::var("MODEL_DIR").ok())
        .map(expand_path)
        .chain(std::iter::once(Path::new("models").join(&cfg.model_name)));
    for dir in candidates {
        if dir.exists() {
            tracing::debug!(dir = %dir.display(), "using model dir");
            return Ok(dir);
        }
    }
    Err(anyhow!("Could not locate model directory for '{}'", cfg.model_name))
}
