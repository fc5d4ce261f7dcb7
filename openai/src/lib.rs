//! OpenAI-compatible provider for lectern.
//!
//! Implements the [`EmbeddingModel`](lectern_core::EmbeddingModel) and
//! [`ChatModel`](lectern_core::ChatModel) capability traits against any
//! endpoint that speaks the OpenAI embeddings and chat-completions wire
//! format. Every call carries a client-side timeout; a slow upstream surfaces
//! as an error instead of hanging the request. This layer never retries;
//! that decision belongs to whoever owns the transport.

mod chat;
mod client;
mod embedding;
mod error;

pub use client::{OpenAi, OpenAiConfig};
pub use error::OpenAiError;
