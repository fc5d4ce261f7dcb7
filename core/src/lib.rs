//! # lectern-core
//!
//! Capability traits shared by the lectern workspace. The retrieval engine in
//! `lectern-rag` is written against these traits, so any provider that can
//! turn text into vectors and messages into text can power it; the bundled
//! `lectern-openai` crate is one such provider.
//!
//! Two capabilities are modeled:
//!
//! - [`EmbeddingModel`] converts text to a fixed-dimension vector.
//! - [`ChatModel`] generates a textual reply to a sequence of [`Message`]s,
//!   optionally carrying an [`ImageAttachment`] as a separate multimodal part.

pub mod attachment;
pub mod chat;
pub mod embedding;

#[doc(inline)]
pub use attachment::ImageAttachment;
#[doc(inline)]
pub use chat::{ChatModel, Message};
#[doc(inline)]
pub use embedding::EmbeddingModel;

/// Result type used throughout the workspace for capability calls.
///
/// Type alias for [`anyhow::Result<T>`](anyhow::Result) with [`String`] as the
/// default success type, matching the shape of a generated reply.
pub type Result<T = String> = anyhow::Result<T>;

pub use anyhow::Error;
