use thiserror::Error;

/// Startup-time misconfiguration. Fatal: the service must not serve traffic.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Embedding dimension mismatch: embedder '{embedder_id}' produces {embedder} dims, index stores {index}")]
    DimensionMismatch { embedder_id: String, embedder: usize, index: usize },

    #[error("Index and chunk store are misaligned: {chunks} chunks vs {rows} index rows")]
    Misaligned { chunks: usize, rows: usize },
}

/// Failure of an embedding call.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("No API key supplied for the embedding service")]
    MissingApiKey,

    #[error("Embedding service rejected the API key ({0})")]
    Unauthorized(u16),

    #[error("Embedding service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Embedding request timed out")]
    Timeout,

    #[error("Embedding request failed: {0}")]
    Transport(String),

    #[error("Malformed embedding response: {0}")]
    MalformedResponse(String),

    #[error("Embedding produced {got} dims, expected {expected}")]
    Dimension { expected: usize, got: usize },

    #[error("Embedding model failed: {0}")]
    Model(String),
}

impl EmbedError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Failure loading or querying the vector index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Index file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt index: {0}")]
    Corrupt(String),

    #[error("Query vector has {got} dims, index has {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("k must be a positive integer")]
    InvalidK,

    #[error("Index backend error: {0}")]
    Backend(String),
}

/// Failure loading the chunk store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Chunk file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chunk file is not a JSON list of strings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported chunk file format: {0}")]
    UnsupportedFormat(String),
}
