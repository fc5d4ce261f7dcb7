//! Sentence-based text chunking.

use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;
use crate::types::{ChunkMeta, Document};

use super::{Chunker, DEFAULT_MAX_CHARS, make_chunk, normalize_whitespace};

/// Chunks text by sentence boundaries.
///
/// Sentences are grouped until adding the next one would exceed the budget,
/// so chunks never break mid-sentence. A single sentence longer than the
/// budget becomes its own oversized chunk; bounded splitting must never
/// silently discard content.
///
/// # Example
///
/// ```rust
/// use lectern_rag::chunking::{Chunker, SentenceChunker};
/// use lectern_rag::types::{Document, SourceType};
///
/// let chunker = SentenceChunker::new(200);
/// let doc = Document {
///     id: "doc1".into(),
///     text: "First sentence. Second sentence.".into(),
///     source: SourceType::Page,
///     url: None,
///     title: "doc1".into(),
///     created_at: None,
/// };
/// let chunks = chunker.chunk(&doc).unwrap();
/// assert_eq!(chunks.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    /// Maximum size of each chunk in characters.
    max_chars: usize,
}

impl SentenceChunker {
    /// Creates a new sentence chunker with the given character budget.
    #[must_use]
    pub const fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Default for SentenceChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}

impl Chunker for SentenceChunker {
    fn chunk(&self, doc: &Document) -> Result<Vec<ChunkMeta>> {
        let text = normalize_whitespace(&doc.text);
        if text.is_empty() {
            return Ok(Vec::new());
        }
        if text.chars().count() <= self.max_chars {
            return Ok(vec![make_chunk(doc, 0, text)]);
        }

        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_chars = 0usize;
        let mut chunk_idx = 0;

        for sentence in text.unicode_sentences() {
            let sentence = sentence.trim_end();
            if sentence.is_empty() {
                continue;
            }
            let sentence_chars = sentence.chars().count();

            // +1 accounts for the joining space.
            if !current.is_empty() && current_chars + 1 + sentence_chars > self.max_chars {
                chunks.push(make_chunk(doc, chunk_idx, current.clone()));
                chunk_idx += 1;
                current.clear();
                current_chars = 0;
            }

            if !current.is_empty() {
                current.push(' ');
                current_chars += 1;
            }
            current.push_str(sentence);
            current_chars += sentence_chars;
        }

        if !current.is_empty() {
            chunks.push(make_chunk(doc, chunk_idx, current));
        }

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "sentence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceType;

    fn doc(text: &str) -> Document {
        Document {
            id: "doc1".into(),
            text: text.into(),
            source: SourceType::Page,
            url: Some("https://example.com/doc1".into()),
            title: "doc1".into(),
            created_at: None,
        }
    }

    #[test]
    fn small_text_single_chunk() {
        let chunker = SentenceChunker::new(500);
        let chunks = chunker.chunk(&doc("Short sentence.")).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "doc1#chunk_0");
        assert_eq!(chunks[0].text, "Short sentence.");
        assert_eq!(chunks[0].url.as_deref(), Some("https://example.com/doc1"));
    }

    #[test]
    fn empty_text_no_chunks() {
        let chunker = SentenceChunker::new(100);
        assert!(chunker.chunk(&doc("")).unwrap().is_empty());
        assert!(chunker.chunk(&doc("   \n\t  ")).unwrap().is_empty());
    }

    #[test]
    fn multiple_sentences_split_under_budget() {
        let chunker = SentenceChunker::new(50);
        let chunks = chunker
            .chunk(&doc(
                "First sentence here. Second sentence here. Third sentence here.",
            ))
            .unwrap();

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.id, format!("doc1#chunk_{i}"));
            assert!(chunk.text.chars().count() <= 50);
        }
    }

    #[test]
    fn coverage_is_lossless_under_normalization() {
        let chunker = SentenceChunker::new(40);
        let text = "One sentence here.  Another   one follows.\nAnd a third. Plus a fourth one.";
        let chunks = chunker.chunk(&doc(text)).unwrap();

        let rejoined = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rejoined, normalize_whitespace(text));
    }

    #[test]
    fn oversized_sentence_emitted_whole() {
        let chunker = SentenceChunker::new(20);
        let long = "This single sentence is far longer than the twenty character budget.";
        let chunks = chunker.chunk(&doc(&format!("Tiny one. {long}"))).unwrap();

        assert!(chunks.iter().any(|c| c.text.contains("character budget")));
        let oversized = chunks.iter().find(|c| c.text.chars().count() > 20).unwrap();
        assert_eq!(oversized.text, long);
    }

    #[test]
    fn default_budget() {
        let chunker = SentenceChunker::default();
        assert_eq!(chunker.max_chars, super::DEFAULT_MAX_CHARS);
    }
}
