//! Fixed-size text chunking.

use crate::error::Result;
use crate::types::{ChunkMeta, Document};

use super::{Chunker, DEFAULT_MAX_CHARS, make_chunk, normalize_whitespace};

/// Chunks text into fixed-size pieces with no sentence awareness.
///
/// The normalized text is split at hard character boundaries, so a chunk may
/// end mid-word. Chunks do not overlap; concatenating them in order
/// reproduces the normalized input exactly.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    /// Maximum size of each chunk in characters.
    max_chars: usize,
}

impl FixedSizeChunker {
    /// Creates a new fixed-size chunker with the given character budget.
    ///
    /// # Panics
    /// Panics if `max_chars` is zero.
    #[must_use]
    pub fn new(max_chars: usize) -> Self {
        assert!(max_chars > 0, "chunk budget must be positive");
        Self { max_chars }
    }
}

impl Default for FixedSizeChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, doc: &Document) -> Result<Vec<ChunkMeta>> {
        let text = normalize_whitespace(&doc.text);
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let mut chunks = Vec::new();
        let mut remaining = text.as_str();
        let mut chunk_idx = 0;

        while !remaining.is_empty() {
            let split_at = remaining
                .char_indices()
                .nth(self.max_chars)
                .map_or(remaining.len(), |(byte_idx, _)| byte_idx);
            let (head, tail) = remaining.split_at(split_at);
            chunks.push(make_chunk(doc, chunk_idx, head.to_string()));
            chunk_idx += 1;
            remaining = tail;
        }

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "fixed_size"
    }
}
