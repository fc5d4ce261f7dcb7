//! The health/status endpoint.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lectern_core::{ChatModel, EmbeddingModel};
use lectern_rag::Engine;
use serde::Serialize;

use super::json_error::{ErrorToResponse, JsonError};

/// Success body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the index is loaded.
    pub status: &'static str,
    /// Number of vectors in the served index.
    pub vectors: usize,
    /// Number of metadata records (equal to `vectors` by invariant).
    pub metadata_entries: usize,
}

/// Reports whether the index loaded and its row counts.
pub async fn health<M, G>(State(engine): State<Engine<M, G>>) -> Response
where
    M: EmbeddingModel + 'static,
    G: ChatModel + 'static,
{
    match engine.index_handle().current() {
        Ok(unit) => Json(HealthResponse {
            status: "ok",
            vectors: unit.len(),
            metadata_entries: unit.metadata().len(),
        })
        .into_response(),
        Err(err) => {
            JsonError::new(err.to_string()).to_response(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
