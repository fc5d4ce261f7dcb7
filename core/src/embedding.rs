//! Text embeddings.
//!
//! An embedding model turns text into a dense vector whose geometry captures
//! semantic meaning; similar texts map to nearby vectors. The trait here
//! abstracts over concrete providers so the indexing and query paths can share
//! one implementation while staying testable against in-process mocks.

use core::future::Future;

/// A type alias for an embedding vector of 32-bit floats.
///
/// The vector length is fixed by the model's architecture and must equal
/// [`EmbeddingModel::dim`] for every call.
pub type Embedding = Vec<f32>;

/// Converts text to vector representations.
///
/// # Implementation Requirements
///
/// - [`embed`](EmbeddingModel::embed) must return vectors with length equal to
///   [`dim`](EmbeddingModel::dim); callers treat a mismatch as a contract
///   violation, not a retryable condition.
/// - Transport failures (network, rate limits, timeouts) are reported through
///   the error channel, never by hanging indefinitely.
///
/// # Example
///
/// ```rust
/// use lectern_core::EmbeddingModel;
///
/// struct Constant;
///
/// impl EmbeddingModel for Constant {
///     fn dim(&self) -> usize {
///         4
///     }
///
///     async fn embed(&self, _text: &str) -> lectern_core::Result<Vec<f32>> {
///         Ok(vec![0.0; self.dim()])
///     }
/// }
/// ```
pub trait EmbeddingModel: Send + Sync {
    /// Returns the embedding vector dimension.
    ///
    /// This value is a fixed contract for the lifetime of any index built from
    /// this model's output; changing models means rebuilding the index.
    fn dim(&self) -> usize;

    /// Converts text to an embedding vector of length [`Self::dim`].
    fn embed(&self, text: &str) -> impl Future<Output = crate::Result<Vec<f32>>> + Send;
}
