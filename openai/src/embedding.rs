//! [`EmbeddingModel`] implementation.

use lectern_core::{EmbeddingModel, Result as CoreResult};
use serde::{Deserialize, Serialize};

use crate::client::OpenAi;
use crate::error::OpenAiError;

impl EmbeddingModel for OpenAi {
    fn dim(&self) -> usize {
        self.config().embedding_dimensions
    }

    async fn embed(&self, text: &str) -> CoreResult<Vec<f32>> {
        let vector = self.embed_once(text).await?;
        Ok(vector)
    }
}

impl OpenAi {
    async fn embed_once(&self, input: &str) -> Result<Vec<f32>, OpenAiError> {
        let request = EmbeddingRequest {
            model: &self.config().embedding_model,
            input,
        };

        let response: EmbeddingResponse = self
            .http()
            .post(self.endpoint("/embeddings"))
            .bearer_auth(&self.config().api_key)
            .timeout(self.config().embed_timeout)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| OpenAiError::Api("embedding response missing vector data".into()))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}
