use std::sync::Arc;

use kbqa_core::error::ConfigError;
use kbqa_core::traits::{Embedder, VectorIndex};
use kbqa_core::types::SearchResult;
use kbqa_vector::ChunkStore;

use crate::error::RetrievalError;

/// Embedder → vector index → chunk store.
///
/// Construction checks that the three parts agree (embedding dimension and
/// row/chunk count); after that the retriever is read-only and can be shared
/// across requests.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    store: Arc<ChunkStore>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>, store: Arc<ChunkStore>) -> Result<Self, ConfigError> {
        if embedder.dim() != index.dim() {
            return Err(ConfigError::DimensionMismatch {
                embedder_id: embedder.embedder_id().to_string(),
                embedder: embedder.dim(),
                index: index.dim(),
            });
        }
        if store.len() != index.row_count() {
            return Err(ConfigError::Misaligned { chunks: store.len(), rows: index.row_count() });
        }
        Ok(Self { embedder, index, store })
    }

    pub fn embedder(&self) -> &dyn Embedder { self.embedder.as_ref() }

    pub fn index(&self) -> &dyn VectorIndex { self.index.as_ref() }

    pub fn store(&self) -> &ChunkStore { &self.store }

    /// Up to `k` chunks nearest to `query`, closest first.
    ///
    /// Index slots whose id falls outside the chunk store (padding, or a
    /// stale index) are dropped, so the result may be shorter than `k`.
    pub async fn retrieve(&self, query: &str, k: usize, api_key: Option<&str>) -> Result<Vec<SearchResult>, RetrievalError> {
        if k == 0 {
            return Err(RetrievalError::InvalidTopK);
        }
        let vector = self.embedder.embed(query, api_key).await?;
        if vector.len() != self.index.dim() {
            return Err(RetrievalError::DimensionMismatch { expected: self.index.dim(), got: vector.len() });
        }

        let neighbors = self.index.search(&vector, k)?;
        let results: Vec<SearchResult> = neighbors
            .iter()
            .filter_map(|n| {
                let Some(id) = n.chunk_id(self.store.len()) else {
                    tracing::trace!(id = n.id, "dropping out-of-range index slot");
                    return None;
                };
                let chunk = self.store.get(id)?;
                Some(SearchResult { chunk: chunk.to_string(), distance: n.distance, index: id })
            })
            .collect();
        tracing::debug!(requested = k, kept = results.len(), "retrieved chunks");
        Ok(results)
    }
}
