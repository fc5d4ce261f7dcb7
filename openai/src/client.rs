//! Client configuration and construction.

use std::sync::Arc;
use std::time::Duration;

/// Default public OpenAI API base.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Configuration for an [`OpenAi`] client.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL of the OpenAI-compatible endpoint, without a trailing slash.
    pub api_base: String,
    /// Bearer token sent with every request.
    pub api_key: String,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Dimension the embedding model returns; a fixed contract shared with
    /// any index built from its output.
    pub embedding_dimensions: usize,
    /// Chat model identifier.
    pub chat_model: String,
    /// Client-side timeout for embedding calls.
    pub embed_timeout: Duration,
    /// Client-side timeout for chat calls.
    pub chat_timeout: Duration,
    /// Token cap for generated replies.
    pub max_tokens: u32,
    /// Sampling temperature for generated replies.
    pub temperature: f32,
}

impl OpenAiConfig {
    /// Creates a configuration with the given key and the stock defaults:
    /// `text-embedding-3-small` (1536 dimensions), `gpt-4o-mini`, 30 s/60 s
    /// timeouts.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimensions: 1536,
            chat_model: "gpt-4o-mini".to_string(),
            embed_timeout: Duration::from_secs(30),
            chat_timeout: Duration::from_secs(60),
            max_tokens: 1000,
            temperature: 0.1,
        }
    }

    /// Overrides the API base URL (e.g. a proxy or self-hosted endpoint).
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Overrides the embedding model and its dimension together; they are
    /// one contract and must change together.
    #[must_use]
    pub fn with_embedding_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.embedding_model = model.into();
        self.embedding_dimensions = dimensions;
        self
    }

    /// Overrides the chat model.
    #[must_use]
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }
}

/// Client for an OpenAI-compatible API.
///
/// Cheap to clone; the underlying HTTP client pools connections.
#[derive(Debug, Clone)]
pub struct OpenAi {
    config: Arc<OpenAiConfig>,
    http: reqwest::Client,
}

impl OpenAi {
    /// Creates a client from a configuration.
    #[must_use]
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }

    /// Creates a client from the `OPENAI_API_KEY` environment variable,
    /// honoring `OPENAI_BASE_URL` when set.
    ///
    /// # Errors
    /// Fails if `OPENAI_API_KEY` is unset.
    pub fn from_env() -> lectern_core::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow_env("OPENAI_API_KEY environment variable not set"))?;
        let mut config = OpenAiConfig::new(api_key);
        if let Ok(base) = std::env::var("OPENAI_BASE_URL") {
            config = config.with_api_base(base);
        }
        Ok(Self::new(config))
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base.trim_end_matches('/'))
    }
}

fn anyhow_env(message: &str) -> lectern_core::Error {
    lectern_core::Error::msg(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_embedding_contract() {
        let config = OpenAiConfig::new("sk-test");
        assert_eq!(config.embedding_model, "text-embedding-3-small");
        assert_eq!(config.embedding_dimensions, 1536);
        assert_eq!(config.embed_timeout, Duration::from_secs(30));
        assert_eq!(config.chat_timeout, Duration::from_secs(60));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = OpenAi::new(OpenAiConfig::new("k").with_api_base("https://proxy.test/v1/"));
        assert_eq!(client.endpoint("/embeddings"), "https://proxy.test/v1/embeddings");
    }
}
