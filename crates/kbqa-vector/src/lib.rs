//! Read-only vector index and index-aligned chunk store.

use std::path::Path;

use kbqa_core::config::IndexFormat;
use kbqa_core::error::IndexError;
use kbqa_core::traits::VectorIndex;

pub mod flat;
pub mod format;
pub mod lance;
pub mod store;

pub use flat::FlatIndex;
pub use format::{read_flat_index, write_flat_index};
pub use lance::{load_lance_index, write_lance_index};
pub use store::ChunkStore;

/// Load the persisted index artifact. `table` is only used by the lance format.
pub async fn load_index(format: IndexFormat, path: &Path, table: &str) -> Result<FlatIndex, IndexError> {
    let index = match format {
        IndexFormat::Flat => read_flat_index(path)?,
        IndexFormat::Lance => load_lance_index(path, table).await?,
    };
    tracing::info!(path = %path.display(), ?format, rows = index.row_count(), dim = index.dim(), "vector index loaded");
    Ok(index)
}
