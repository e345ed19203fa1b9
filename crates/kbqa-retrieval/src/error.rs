use thiserror::Error;

use kbqa_core::error::{EmbedError, IndexError};

/// Per-request retrieval failure. Recoverable: reported to the caller.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("top_k must be a positive integer")]
    InvalidTopK,

    #[error("Query embedding failed: {0}")]
    Embed(#[from] EmbedError),

    #[error("Query embedding has {got} dims but the index expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Index search failed: {0}")]
    Index(#[from] IndexError),
}

impl RetrievalError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Embed(e) if e.is_timeout())
    }
}
