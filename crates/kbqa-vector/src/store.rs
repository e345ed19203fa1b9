use std::fs;
use std::path::Path;

use kbqa_core::error::StoreError;
use kbqa_core::types::ChunkId;

/// Ordered chunk texts. Position `i` is the text of index row `i`.
#[derive(Debug, Clone, Default)]
pub struct ChunkStore {
    chunks: Vec<String>,
}

impl ChunkStore {
    pub fn new(chunks: Vec<String>) -> Self { Self { chunks } }

    /// One chunk per line; lines are trimmed and blank lines skipped.
    pub fn from_lines(text: &str) -> Self {
        let chunks = text.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect();
        Self { chunks }
    }

    /// Load `*.txt` (one chunk per line) or `*.json` (array of strings).
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("txt") => Ok(Self::from_lines(&fs::read_to_string(path)?)),
            Some("json") => {
                let chunks: Vec<String> = serde_json::from_str(&fs::read_to_string(path)?)?;
                Ok(Self { chunks })
            }
            _ => Err(StoreError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn get(&self, id: ChunkId) -> Option<&str> { self.chunks.get(id).map(String::as_str) }

    pub fn len(&self) -> usize { self.chunks.len() }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &str> { self.chunks.iter().map(String::as_str) }
}
