//! Request handlers for the query API.

mod ask;
mod health;
mod json_error;

pub use ask::{AskRequest, AskResponse, Link, ask};
pub use health::{HealthResponse, health};
pub use json_error::{ErrorToResponse, JsonError};

#[cfg(test)]
pub(crate) mod testing {
    use lectern_core::{ChatModel, EmbeddingModel, Message};
    use lectern_rag::{
        ChunkMeta, Engine, FlatIndex, IndexHandle, IndexUnit, RagConfig, SourceType,
    };
    use std::sync::Arc;

    pub struct MockEmbedder;

    impl EmbeddingModel for MockEmbedder {
        fn dim(&self) -> usize {
            2
        }

        async fn embed(&self, _text: &str) -> lectern_core::Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }
    }

    pub struct MockGenerator;

    impl ChatModel for MockGenerator {
        async fn generate(&self, _messages: &[Message]) -> lectern_core::Result {
            Ok("a grounded answer".to_string())
        }
    }

    fn meta(id: &str) -> ChunkMeta {
        ChunkMeta {
            id: id.into(),
            text: format!("chunk text for {id}"),
            source: SourceType::Page,
            url: Some(format!("https://example.com/{id}")),
            title: id.into(),
            created_at: None,
        }
    }

    pub fn engine() -> Engine<MockEmbedder, MockGenerator> {
        let index = FlatIndex::build(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let unit = IndexUnit::new(index, vec![meta("a"), meta("b")]).unwrap();
        let handle = Arc::new(IndexHandle::new());
        handle.swap(unit);
        Engine::new(MockEmbedder, MockGenerator, handle, RagConfig::default()).unwrap()
    }

    pub fn engine_without_index() -> Engine<MockEmbedder, MockGenerator> {
        let handle = Arc::new(IndexHandle::new());
        Engine::new(MockEmbedder, MockGenerator, handle, RagConfig::default()).unwrap()
    }
}
