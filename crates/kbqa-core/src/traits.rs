use async_trait::async_trait;

use crate::error::{EmbedError, IndexError};
use crate::types::Neighbor;

/// Maps text to a fixed-dimension dense vector.
///
/// Local implementations ignore `api_key`; remote ones resolve it against
/// their configured key and fail with [`EmbedError::MissingApiKey`] when
/// neither is present.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `local:all-MiniLM-L6-v2:d384`).
    fn embedder_id(&self) -> &str;
    /// Embedding dimensionality (D).
    fn dim(&self) -> usize;
    async fn embed(&self, text: &str, api_key: Option<&str>) -> Result<Vec<f32>, EmbedError>;
}

/// Read-only nearest-neighbor index over the chunk vectors.
///
/// `search` returns up to `k` slots in ascending distance order. When `k`
/// exceeds `row_count()`, trailing slots are padding (see
/// [`Neighbor::padding`]), at most `row_count()` of them.
pub trait VectorIndex: Send + Sync {
    fn dim(&self) -> usize;
    fn row_count(&self) -> usize;
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError>;
}
