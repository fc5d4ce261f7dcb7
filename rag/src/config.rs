//! Configuration for the retrieval engine.

use crate::chunking::DEFAULT_MAX_CHARS;

/// Tunable parameters shared by ingestion and the query path.
#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Character budget per chunk.
    pub max_chunk_chars: usize,
    /// Number of chunks retrieved per query.
    pub top_k: usize,
    /// Hard cap on citation excerpt length, in characters.
    pub excerpt_max_chars: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHARS,
            top_k: 5,
            excerpt_max_chars: 150,
        }
    }
}

impl RagConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for custom configuration.
    #[must_use]
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::new()
    }
}

/// Builder for [`RagConfig`].
#[derive(Debug, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Creates a builder seeded with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RagConfig::default(),
        }
    }

    /// Sets the character budget per chunk.
    #[must_use]
    pub const fn max_chunk_chars(mut self, chars: usize) -> Self {
        self.config.max_chunk_chars = chars;
        self
    }

    /// Sets the number of chunks retrieved per query.
    #[must_use]
    pub const fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Sets the citation excerpt cap.
    #[must_use]
    pub const fn excerpt_max_chars(mut self, chars: usize) -> Self {
        self.config.excerpt_max_chars = chars;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> RagConfig {
        self.config
    }
}
