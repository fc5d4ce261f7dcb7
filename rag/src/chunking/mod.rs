//! Text chunking strategies.
//!
//! Chunkers split a document into bounded passages that can be individually
//! embedded and retrieved. Both strategies share the same contract:
//!
//! - input whitespace is normalized (runs collapsed to single spaces) before
//!   anything is measured or split;
//! - chunks are ordered, non-overlapping, and jointly lossless: no unit of
//!   the normalized text is dropped or duplicated;
//! - every chunk stays within the character budget, except a single sentence
//!   that individually exceeds it, which is emitted whole rather than lost.
//!
//! The budget unit is **characters** (Unicode scalar values). The default of
//! 1500 approximates 500 tokens for English prose.

mod fixed;
mod sentence;

pub use fixed::FixedSizeChunker;
pub use sentence::SentenceChunker;

use crate::error::Result;
use crate::types::{ChunkMeta, Document};

/// Default chunk budget in characters.
pub const DEFAULT_MAX_CHARS: usize = 1500;

/// Trait for text chunking strategies.
pub trait Chunker: Send + Sync {
    /// Splits a document into chunks, stamping the document's metadata onto
    /// each one and assigning fresh `{doc_id}#chunk_{n}` identifiers.
    ///
    /// Empty or whitespace-only text produces no chunks.
    fn chunk(&self, doc: &Document) -> Result<Vec<ChunkMeta>>;

    /// Returns the name of this chunking strategy.
    fn name(&self) -> &'static str;
}

/// Collapses all whitespace runs to single spaces and trims the ends.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn make_chunk(doc: &Document, index: usize, text: String) -> ChunkMeta {
    ChunkMeta {
        id: format!("{}#chunk_{}", doc.id, index),
        text,
        source: doc.source,
        url: doc.url.clone(),
        title: doc.title.clone(),
        created_at: doc.created_at.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_collapses_runs() {
        assert_eq!(
            normalize_whitespace("  a\t\tb\n\n  c  "),
            "a b c".to_string()
        );
    }

    #[test]
    fn normalization_of_blank_text_is_empty() {
        assert_eq!(normalize_whitespace("   \n\t "), "");
    }
}
