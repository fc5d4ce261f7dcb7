//! Structured JSON error responses.

use axum::{extract::Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// Serializes `self` as a JSON body with the given status code.
pub trait ErrorToResponse: Serialize {
    /// Builds the response.
    fn to_response(&self, code: StatusCode) -> axum::response::Response {
        let mut r = Json(self).into_response();
        *r.status_mut() = code;
        r
    }
}

/// JSON error body: the message plus, for pipeline failures, the stage tag
/// that distinguishes an embedding failure from a generation failure.
#[derive(Debug, Serialize)]
pub struct JsonError {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<String>,
}

impl JsonError {
    /// Creates an error body without a stage tag.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            stage: None,
        }
    }

    /// Attaches the pipeline stage that failed.
    #[must_use]
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }
}

impl ErrorToResponse for JsonError {}
