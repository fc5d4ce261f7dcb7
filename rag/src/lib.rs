//! Retrieval engine for grounded question answering.
//!
//! This crate turns raw documents into an exact nearest-neighbor index and
//! serves top-k similarity queries over it:
//!
//! - [`chunking`] splits documents into bounded, lossless passages;
//! - [`ingest`] embeds chunks through any [`EmbeddingModel`](lectern_core::EmbeddingModel)
//!   and produces the chunk-record artifact;
//! - [`index`] is the flat squared-L2 index, exhaustive by design, so
//!   results are exact and reproducible;
//! - [`persistence`] owns the on-disk unit (binary vectors + row-aligned
//!   metadata) and the atomically swappable [`IndexHandle`](persistence::IndexHandle);
//! - [`engine`] runs the query pipeline: embed, retrieve, compose a grounded
//!   prompt, generate, and cite.
//!
//! The row-alignment invariant (vector row `i` and metadata record `i`
//! describe the same chunk) is checked wherever the two meet: at unit
//! construction, at save, and again at load. A misaligned pair is rejected
//! with [`RagError::CorruptIndex`], never served.

pub mod chunking;
pub mod config;
pub mod engine;
pub mod error;
pub mod excerpt;
pub mod index;
pub mod ingest;
pub mod persistence;
pub mod types;

#[doc(inline)]
pub use config::RagConfig;
#[doc(inline)]
pub use engine::Engine;
#[doc(inline)]
pub use error::{PipelineError, RagError, Result, Stage};
#[doc(inline)]
pub use index::FlatIndex;
#[doc(inline)]
pub use persistence::{IndexHandle, IndexUnit};
#[doc(inline)]
pub use types::{Answer, ChunkMeta, ChunkRecord, Citation, Document, RetrievedChunk, SourceType};
