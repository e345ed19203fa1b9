//! Domain types shared by the embedder, index and retrieval crates.

use serde::{Deserialize, Serialize};

/// Positional chunk identifier: row `i` of the vector index is chunk `i`
/// of the chunk store.
pub type ChunkId = usize;

/// Identifier slot returned by a vector index for a padded (empty) result.
pub const PADDING_ID: i64 = -1;

/// One slot of a nearest-neighbor search.
///
/// `id` is signed because indexes pad missing slots with [`PADDING_ID`];
/// callers must bounds-check it against the chunk store before use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub distance: f32,
    pub id: i64,
}

impl Neighbor {
    pub fn padding() -> Self {
        Self { distance: f32::INFINITY, id: PADDING_ID }
    }

    /// Resolve the slot against a store of `len` chunks.
    pub fn chunk_id(&self, len: usize) -> Option<ChunkId> {
        usize::try_from(self.id).ok().filter(|&id| id < len)
    }
}

/// A retrieved chunk, as returned to callers of `/search`.
///
/// `distance` is the index metric (squared L2, lower is closer).
/// `index` is the chunk's position in the chunk store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: String,
    pub distance: f32,
    pub index: ChunkId,
}
