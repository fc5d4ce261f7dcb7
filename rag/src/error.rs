//! Error types for the retrieval engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur across chunking, indexing, and retrieval.
#[derive(Debug, Error)]
pub enum RagError {
    /// The embedding service failed or timed out.
    #[error("embedding service unavailable: {0}")]
    EmbeddingUnavailable(#[source] anyhow::Error),

    /// The generation service failed or timed out.
    #[error("generation service unavailable: {0}")]
    GenerationUnavailable(#[source] anyhow::Error),

    /// Vector length differs from the index's fixed dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension provided.
        actual: usize,
    },

    /// An index build was attempted with no vectors.
    #[error("cannot build an index from an empty embedding set")]
    EmptyInput,

    /// The query text was blank after trimming.
    #[error("query is empty")]
    EmptyQuery,

    /// A persisted index unit failed integrity verification.
    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    /// No index unit has been loaded yet.
    #[error("index is not loaded")]
    IndexUnavailable,

    /// Writing or reading a persisted artifact failed.
    #[error("persistence error at {path}: {source}")]
    Persistence {
        /// Path where the error occurred.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for retrieval-engine operations.
pub type Result<T> = std::result::Result<T, RagError>;

/// Pipeline stage in which an [`answer`](crate::engine::Engine::answer) call
/// failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Embedding the query text.
    Embedding,
    /// Searching the index and mapping rows to metadata.
    Retrieval,
    /// Generating the grounded reply.
    Generation,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Embedding => "embedding",
            Self::Retrieval => "retrieval",
            Self::Generation => "generation",
        };
        f.write_str(name)
    }
}

/// A stage-tagged pipeline failure.
///
/// The engine never retries; the tag lets callers distinguish an embedding
/// failure from a retrieval or generation failure and decide for themselves.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    /// The stage that failed.
    pub stage: Stage,
    /// The underlying error.
    #[source]
    pub source: RagError,
}

impl PipelineError {
    /// Tags an error with the stage it occurred in.
    #[must_use]
    pub const fn new(stage: Stage, source: RagError) -> Self {
        Self { stage, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_display() {
        assert_eq!(Stage::Embedding.to_string(), "embedding");
        assert_eq!(Stage::Retrieval.to_string(), "retrieval");
        assert_eq!(Stage::Generation.to_string(), "generation");
    }

    #[test]
    fn pipeline_error_carries_original_message() {
        let err = PipelineError::new(Stage::Embedding, RagError::EmptyQuery);
        assert_eq!(err.to_string(), "embedding stage failed: query is empty");
    }
}
