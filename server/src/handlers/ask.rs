//! The query endpoint.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lectern_core::{ChatModel, EmbeddingModel, ImageAttachment};
use lectern_rag::{Engine, PipelineError, RagError};
use serde::{Deserialize, Serialize};

use super::json_error::{ErrorToResponse, JsonError};

/// Request body for `POST /api/`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// The question to answer. Required, non-empty after trimming.
    pub question: String,
    /// Optional base64-encoded image attached to the question.
    #[serde(default)]
    pub image: Option<String>,
}

/// Success body for `POST /api/`.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// Generated answer text.
    pub answer: String,
    /// Cited sources in retrieval rank order.
    pub links: Vec<Link>,
}

/// One cited source.
#[derive(Debug, Serialize)]
pub struct Link {
    /// Source URL.
    pub url: String,
    /// Shortened excerpt of the cited chunk.
    pub text: String,
}

/// Answers a question grounded in the indexed corpus.
///
/// Validation failures (blank question, malformed or oversized image) are
/// rejected with 400 before any model call; pipeline failures come back with
/// the stage that failed.
pub async fn ask<M, G>(
    State(engine): State<Engine<M, G>>,
    Json(request): Json<AskRequest>,
) -> Response
where
    M: EmbeddingModel + 'static,
    G: ChatModel + 'static,
{
    let question = request.question.trim();
    if question.is_empty() {
        return JsonError::new("'question' must be a non-empty string")
            .to_response(StatusCode::BAD_REQUEST);
    }

    let image = match decode_image(request.image.as_deref()) {
        Ok(image) => image,
        Err(message) => return JsonError::new(message).to_response(StatusCode::BAD_REQUEST),
    };

    match engine.answer(question, image).await {
        Ok(answer) => {
            let links = answer
                .citations
                .into_iter()
                .map(|citation| Link {
                    url: citation.url,
                    text: citation.excerpt,
                })
                .collect();
            Json(AskResponse {
                answer: answer.text,
                links,
            })
            .into_response()
        }
        Err(err) => pipeline_error_response(&err),
    }
}

/// Decodes and validates an optional base64 image payload.
fn decode_image(encoded: Option<&str>) -> Result<Option<ImageAttachment>, String> {
    match encoded {
        None => Ok(None),
        Some(b64) if b64.trim().is_empty() => Ok(None),
        Some(b64) => ImageAttachment::from_base64(b64)
            .map(Some)
            .map_err(|e| format!("image processing failed: {e}")),
    }
}

fn pipeline_error_response(err: &PipelineError) -> Response {
    tracing::error!(stage = %err.stage, error = %err, "answer pipeline failed");
    let status = match err.source {
        RagError::EmptyQuery => StatusCode::BAD_REQUEST,
        RagError::IndexUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    };
    JsonError::new(err.source.to_string())
        .with_stage(err.stage.to_string())
        .to_response(status)
}
