use kbqa_core::types::SearchResult;

pub const CHUNK_SEPARATOR: &str = "\n\n";

/// Grounding text for the generator, or the explicit absence of any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalContext {
    Grounded { text: String, chunks_used: usize },
    Empty,
}

impl RetrievalContext {
    pub fn is_empty(&self) -> bool { matches!(self, Self::Empty) }
}

/// Joins retrieved chunks, in ranking order, into one context block.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextComposer {
    max_chars: Option<usize>,
}

impl ContextComposer {
    pub fn new(max_chars: Option<usize>) -> Self { Self { max_chars } }

    /// With a budget, chunks are added while they fit; the first chunk is
    /// always kept (cut at a char boundary if it alone is over budget).
    pub fn compose(&self, results: &[SearchResult]) -> RetrievalContext {
        let Some(first) = results.first() else {
            return RetrievalContext::Empty;
        };
        let Some(budget) = self.max_chars else {
            let text = results.iter().map(|r| r.chunk.as_str()).collect::<Vec<_>>().join(CHUNK_SEPARATOR);
            return RetrievalContext::Grounded { text, chunks_used: results.len() };
        };

        let mut text: String = first.chunk.chars().take(budget).collect();
        let mut used_chars = text.chars().count();
        let mut chunks_used = 1;
        for r in &results[1..] {
            let cost = CHUNK_SEPARATOR.len() + r.chunk.chars().count();
            if used_chars + cost > budget {
                break;
            }
            text.push_str(CHUNK_SEPARATOR);
            text.push_str(&r.chunk);
            used_chars += cost;
            chunks_used += 1;
        }
        RetrievalContext::Grounded { text, chunks_used }
    }
}

/// Unbounded composition: every chunk joined with a blank line.
pub fn compose(results: &[SearchResult]) -> RetrievalContext {
    ContextComposer::default().compose(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(chunk: &str, index: usize) -> SearchResult {
        SearchResult { chunk: chunk.to_string(), distance: index as f32, index }
    }

    #[test]
    fn empty_results_are_not_grounded() {
        assert_eq!(compose(&[]), RetrievalContext::Empty);
        assert!(ContextComposer::new(Some(10)).compose(&[]).is_empty());
    }

    #[test]
    fn joins_with_blank_line_in_order() {
        let ctx = compose(&[hit("banana", 1), hit("cherry", 2)]);
        assert_eq!(ctx, RetrievalContext::Grounded { text: "banana\n\ncherry".to_string(), chunks_used: 2 });
    }

    #[test]
    fn budget_stops_before_overflow() {
        let ctx = ContextComposer::new(Some(14)).compose(&[hit("banana", 1), hit("cherry", 2), hit("date", 3)]);
        assert_eq!(ctx, RetrievalContext::Grounded { text: "banana\n\ncherry".to_string(), chunks_used: 2 });
    }

    #[test]
    fn oversized_first_chunk_is_cut_on_char_boundary() {
        let ctx = ContextComposer::new(Some(3)).compose(&[hit("ééééé", 0), hit("x", 1)]);
        assert_eq!(ctx, RetrievalContext::Grounded { text: "ééé".to_string(), chunks_used: 1 });
    }
}
