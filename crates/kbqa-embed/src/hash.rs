//! Deterministic token-hashing embedder.
//!
//! No model files and no network: each whitespace token is hashed with
//! xxHash64 into one of `dim` buckets and the result is L2-normalized. Good
//! enough for development corpora and for tests that need stable vectors.

use async_trait::async_trait;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use kbqa_core::error::{ConfigError, EmbedError};
use kbqa_core::traits::Embedder;

pub struct HashEmbedder {
    dim: usize,
    id: String,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Result<Self, ConfigError> {
        if dim == 0 {
            return Err(ConfigError::Invalid("hash embedder dimension must be positive".to_string()));
        }
        Ok(Self { dim, id: format!("hash:xxh64:d{dim}") })
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let token = token.to_lowercase();
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn embedder_id(&self) -> &str { &self.id }

    fn dim(&self) -> usize { self.dim }

    async fn embed(&self, text: &str, _api_key: Option<&str>) -> Result<Vec<f32>, EmbedError> {
        Ok(self.embed_text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::HashEmbedder;

    #[test]
    fn blank_text_is_zero_vector() {
        let v = HashEmbedder::new(8).unwrap().embed_text("   ");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(HashEmbedder::new(0).is_err());
    }

    #[test]
    fn case_does_not_change_the_vector() {
        let e = HashEmbedder::new(32).unwrap();
        assert_eq!(e.embed_text("Banana Split"), e.embed_text("banana split"));
    }
}
