//! Process-wide, read-only state shared by every request.

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

use kbqa_answer::{GeminiGenerator, Generator};
use kbqa_core::config::{resolve_with_base, Settings};
use kbqa_core::traits::{Embedder, VectorIndex};
use kbqa_embed::build_embedder;
use kbqa_retrieval::{ContextComposer, Retriever};
use kbqa_vector::{load_index, ChunkStore};

pub struct ServiceContext {
    pub retriever: Retriever,
    pub composer: ContextComposer,
    pub generator: Arc<dyn Generator>,
    pub default_top_k: usize,
}

impl ServiceContext {
    pub fn new(retriever: Retriever, composer: ContextComposer, generator: Arc<dyn Generator>, default_top_k: usize) -> Self {
        Self { retriever, composer, generator, default_top_k }
    }

    /// Load the index and chunk artifacts and wire up the configured
    /// embedder and generator. Any failure here must stop startup.
    pub async fn from_settings(settings: &Settings, base: &Path) -> anyhow::Result<Self> {
        let data = &settings.data;
        let index_path = resolve_with_base(base, &data.index_path);
        let chunks_path = resolve_with_base(base, &data.chunks_path);

        let index = load_index(data.index_format, &index_path, &data.lance_table)
            .await
            .with_context(|| format!("loading vector index from {}", index_path.display()))?;
        let store = ChunkStore::load(&chunks_path)
            .with_context(|| format!("loading chunks from {}", chunks_path.display()))?;
        tracing::info!(path = %chunks_path.display(), chunks = store.len(), "chunk store loaded");

        let embedder = build_embedder(&settings.embedder).context("initializing embedder")?;
        tracing::info!(embedder = embedder.embedder_id(), dim = embedder.dim(), "embedder ready");

        let retriever = Retriever::new(embedder, Arc::new(index), Arc::new(store))?;
        let generator = GeminiGenerator::new(&settings.generator).context("initializing generator")?;
        tracing::info!(model = generator.model(), "generator ready");

        Ok(Self::new(
            retriever,
            ContextComposer::new(settings.retrieval.max_context_chars),
            Arc::new(generator),
            settings.retrieval.default_top_k,
        ))
    }

    pub fn chunks_loaded(&self) -> usize { self.retriever.store().len() }

    pub fn index_size(&self) -> usize { self.retriever.index().row_count() }
}
