//! Core types for the retrieval engine.

use serde::{Deserialize, Serialize};

/// Where a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// A standalone page of reference material.
    Page,
    /// A discussion thread.
    Thread,
}

/// A document to be chunked and indexed.
///
/// Produced by ingestion from on-disk files; immutable once read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier, used to derive chunk ids.
    pub id: String,
    /// Raw text content.
    pub text: String,
    /// Source kind stamped onto every derived chunk.
    pub source: SourceType,
    /// Canonical URL, if known.
    pub url: Option<String>,
    /// Human-readable title.
    pub title: String,
    /// Creation timestamp, if known.
    pub created_at: Option<String>,
}

/// Metadata record for one chunk.
///
/// One of these is persisted per index row; record `i` describes vector row
/// `i`, and keeping that alignment intact is the central invariant of the
/// persisted index unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMeta {
    /// Unique identifier (format: `{doc_id}#chunk_{n}`).
    pub id: String,
    /// Chunk text, non-empty and bounded by the configured budget.
    pub text: String,
    /// Source kind inherited from the parent document.
    pub source: SourceType,
    /// URL inherited from the parent document. Chunks without one are still
    /// retrieved for context but excluded from citations.
    pub url: Option<String>,
    /// Title inherited from the parent document.
    pub title: String,
    /// Creation timestamp inherited from the parent document.
    #[serde(rename = "date")]
    pub created_at: Option<String>,
}

/// One line of the chunk-stream artifact: a chunk's embedding plus its
/// metadata, produced by ingestion and consumed by the index build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Embedding vector for the chunk text.
    pub embedding: Vec<f32>,
    /// Metadata persisted alongside the vector.
    #[serde(flatten)]
    pub meta: ChunkMeta,
}

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// The matching chunk's metadata.
    pub meta: ChunkMeta,
    /// Raw squared L2 distance to the query vector (smaller = closer).
    ///
    /// Deliberately unnormalized: the value is exactly what the index
    /// computes, so results are reproducible against a brute-force
    /// reference. It is a distance, not a bounded similarity.
    pub distance: f32,
}

/// A citation attached to an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// URL of the cited chunk's source.
    pub url: String,
    /// Shortened excerpt of the chunk text.
    pub excerpt: String,
}

/// A grounded answer with citations in retrieval rank order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Generated answer text.
    pub text: String,
    /// Citations for the retrieved chunks that carried a URL.
    pub citations: Vec<Citation>,
}
