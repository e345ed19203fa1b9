use thiserror::Error;

use kbqa_answer::{build_prompt, GenerateError};
use kbqa_core::types::SearchResult;
use kbqa_retrieval::{RetrievalContext, RetrievalError};

use crate::context::ServiceContext;

pub const NO_RELEVANT_INFO: &str = "No relevant information found in the knowledge base.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    Answered { answer: String, chunks_used: usize },
    /// Nothing usable was retrieved; the generator was not called.
    NoGrounding,
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

impl ServiceContext {
    pub async fn search(&self, query: &str, top_k: usize, api_key: Option<&str>) -> Result<Vec<SearchResult>, RetrievalError> {
        self.retriever.retrieve(query, top_k, api_key).await
    }

    /// Retrieve, compose and, only when grounding exists, generate.
    pub async fn chat(&self, query: &str, top_k: usize, api_key: Option<&str>) -> Result<ChatOutcome, ChatError> {
        let results = self.search(query, top_k, api_key).await?;
        let (context, chunks_used) = match self.composer.compose(&results) {
            RetrievalContext::Empty => {
                tracing::info!(top_k, "no grounding for query");
                return Ok(ChatOutcome::NoGrounding);
            }
            RetrievalContext::Grounded { text, chunks_used } => (text, chunks_used),
        };
        tracing::debug!(chunks_used, context = %context, "composed context");

        let prompt = build_prompt(&context, query);
        let answer = self.generator.generate(&prompt, api_key).await?;
        Ok(ChatOutcome::Answered { answer, chunks_used })
    }
}
