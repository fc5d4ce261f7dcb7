//! Grounded question answering over a loaded index unit.
//!
//! [`Engine`] is the explicitly constructed service object that request
//! handlers receive: it owns the embedding and chat models behind their
//! capability traits, a shared [`IndexHandle`], and the configuration. It is
//! immutable after construction; index rebuilds go through the handle's
//! atomic swap.

use std::sync::Arc;

use lectern_core::{ChatModel, EmbeddingModel, ImageAttachment, Message};

use crate::config::RagConfig;
use crate::error::{PipelineError, RagError, Result, Stage};
use crate::excerpt::shorten;
use crate::persistence::IndexHandle;
use crate::types::{Answer, Citation, RetrievedChunk, SourceType};

const SYSTEM_PROMPT: &str = "You are a helpful assistant answering questions about a fixed \
    document collection. Use the provided context to answer accurately and concisely. If the \
    context does not contain the relevant information, say so clearly.";

/// The retrieval engine: embed, search, compose, generate, cite.
pub struct Engine<M, G> {
    embedder: Arc<M>,
    generator: Arc<G>,
    index: Arc<IndexHandle>,
    config: RagConfig,
}

impl<M, G> Clone for Engine<M, G> {
    fn clone(&self) -> Self {
        Self {
            embedder: Arc::clone(&self.embedder),
            generator: Arc::clone(&self.generator),
            index: Arc::clone(&self.index),
            config: self.config.clone(),
        }
    }
}

impl<M, G> std::fmt::Debug for Engine<M, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<M, G> Engine<M, G>
where
    M: EmbeddingModel + 'static,
    G: ChatModel + 'static,
{
    /// Creates an engine over an index handle.
    ///
    /// # Errors
    /// [`RagError::DimensionMismatch`] if a unit is already installed and its
    /// dimension differs from the embedder's: the two are a fixed contract,
    /// and serving with a mismatch would fail every query.
    pub fn new(
        embedder: M,
        generator: G,
        index: Arc<IndexHandle>,
        config: RagConfig,
    ) -> Result<Self> {
        if let Ok(unit) = index.current() {
            let index_dim = unit.index().dimension();
            if embedder.dim() != index_dim {
                return Err(RagError::DimensionMismatch {
                    expected: index_dim,
                    actual: embedder.dim(),
                });
            }
        }
        Ok(Self {
            embedder: Arc::new(embedder),
            generator: Arc::new(generator),
            index,
            config,
        })
    }

    /// Embeds a query string.
    ///
    /// # Errors
    /// [`RagError::EmptyQuery`] if `text` is blank after trimming (checked
    /// before any external call); [`RagError::EmbeddingUnavailable`] on service failure;
    /// [`RagError::DimensionMismatch`] if the returned vector's length
    /// violates the embedder's declared dimension.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RagError::EmptyQuery);
        }

        let vector = self
            .embedder
            .embed(trimmed)
            .await
            .map_err(RagError::EmbeddingUnavailable)?;

        if vector.len() != self.embedder.dim() {
            return Err(RagError::DimensionMismatch {
                expected: self.embedder.dim(),
                actual: vector.len(),
            });
        }
        Ok(vector)
    }

    /// Searches the index and maps rows back to metadata records.
    ///
    /// Results are ascending by raw squared L2 distance, at most `k` of them.
    ///
    /// # Errors
    /// [`RagError::IndexUnavailable`] if no unit is installed;
    /// [`RagError::DimensionMismatch`] on query vector length.
    pub fn retrieve(&self, query_vector: &[f32], k: usize) -> Result<Vec<RetrievedChunk>> {
        let unit = self.index.current()?;
        let hits = unit.index().search(query_vector, k)?;

        let retrieved = hits
            .into_iter()
            .filter_map(|hit| {
                unit.meta(hit.row).map(|meta| RetrievedChunk {
                    meta: meta.clone(),
                    distance: hit.distance,
                })
            })
            .collect::<Vec<_>>();

        tracing::debug!(returned = retrieved.len(), k, "retrieval complete");
        Ok(retrieved)
    }

    /// Composes the grounded generation request.
    ///
    /// Retrieved chunk texts become labeled context blocks in rank order
    /// (rank 1 first); an attached image rides as a separate multimodal part
    /// on the user message and is never merged into the text body.
    #[must_use]
    pub fn compose_prompt(
        &self,
        question: &str,
        retrieved: &[RetrievedChunk],
        image: Option<ImageAttachment>,
    ) -> Vec<Message> {
        let mut context = String::new();
        for (rank, chunk) in retrieved.iter().enumerate() {
            if rank > 0 {
                context.push_str("\n\n");
            }
            context.push_str(&format!("[Source {}]: {}", rank + 1, chunk.meta.text));
            if let Some(url) = &chunk.meta.url {
                context.push_str(&format!("\nURL: {url}"));
            }
            context.push_str(&format!("\nTitle: {}", chunk.meta.title));
            let source = match chunk.meta.source {
                SourceType::Page => "page",
                SourceType::Thread => "thread",
            };
            context.push_str(&format!("\nSource Type: {source}"));
        }

        let user_text = format!("Context:\n{context}\n\nQuestion: {question}");
        let mut user = Message::user(user_text);
        if let Some(attachment) = image {
            user = user.with_image(attachment);
        }

        vec![Message::system(SYSTEM_PROMPT), user]
    }

    /// Runs the full pipeline: embed, retrieve, compose, generate, cite.
    ///
    /// Citations pair each retrieved chunk's URL with a shortened excerpt of
    /// its text; chunks without a URL are used for context but not cited.
    ///
    /// # Errors
    /// A [`PipelineError`] tagging the failing stage with the original error;
    /// no stage is retried here.
    pub async fn answer(
        &self,
        question: &str,
        image: Option<ImageAttachment>,
    ) -> std::result::Result<Answer, PipelineError> {
        let vector = self
            .embed_query(question)
            .await
            .map_err(|e| PipelineError::new(Stage::Embedding, e))?;

        let retrieved = self
            .retrieve(&vector, self.config.top_k)
            .map_err(|e| PipelineError::new(Stage::Retrieval, e))?;

        let messages = self.compose_prompt(question, &retrieved, image);
        let text = self
            .generator
            .generate(&messages)
            .await
            .map_err(|e| PipelineError::new(Stage::Generation, RagError::GenerationUnavailable(e)))?;

        let citations = retrieved
            .iter()
            .filter_map(|chunk| {
                chunk.meta.url.as_ref().map(|url| Citation {
                    url: url.clone(),
                    excerpt: shorten(&chunk.meta.text, self.config.excerpt_max_chars),
                })
            })
            .collect();

        Ok(Answer {
            text: text.trim().to_string(),
            citations,
        })
    }

    /// Returns the shared index handle (for health reporting and swaps).
    #[must_use]
    pub fn index_handle(&self) -> &Arc<IndexHandle> {
        &self.index
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &RagConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::FlatIndex;
    use crate::persistence::IndexUnit;
    use crate::types::ChunkMeta;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed vector for every query, letting tests place the
    /// query at a known distance from each indexed chunk.
    struct MockEmbedder {
        dimension: usize,
        calls: Arc<AtomicUsize>,
        fallback: Vec<f32>,
    }

    impl EmbeddingModel for MockEmbedder {
        fn dim(&self) -> usize {
            self.dimension
        }

        async fn embed(&self, _text: &str) -> lectern_core::Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.fallback.clone())
        }
    }

    struct MockGenerator {
        calls: Arc<AtomicUsize>,
        reply: &'static str,
    }

    impl ChatModel for MockGenerator {
        async fn generate(&self, messages: &[Message]) -> lectern_core::Result {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(!messages.is_empty());
            Ok(self.reply.to_string())
        }
    }

    fn meta(id: &str, text: &str, url: Option<&str>) -> ChunkMeta {
        ChunkMeta {
            id: id.into(),
            text: text.into(),
            source: SourceType::Page,
            url: url.map(Into::into),
            title: id.into(),
            created_at: None,
        }
    }

    fn animal_unit() -> IndexUnit {
        // A and B close together, C far away.
        let index = FlatIndex::build(vec![
            vec![1.0, 0.0],  // A: cats
            vec![0.9, 0.1],  // B: dogs
            vec![0.0, 10.0], // C: stock market
        ])
        .unwrap();
        IndexUnit::new(
            index,
            vec![
                meta("a", "cats are mammals", Some("https://example.com/cats")),
                meta("b", "dogs are mammals", Some("https://example.com/dogs")),
                meta("c", "the stock market fell", None),
            ],
        )
        .unwrap()
    }

    fn engine_over(
        unit: IndexUnit,
        reply: &'static str,
    ) -> (
        Engine<MockEmbedder, MockGenerator>,
        Arc<AtomicUsize>,
        Arc<AtomicUsize>,
    ) {
        let handle = Arc::new(IndexHandle::new());
        handle.swap(unit);

        let embed_calls = Arc::new(AtomicUsize::new(0));
        let generate_calls = Arc::new(AtomicUsize::new(0));
        let embedder = MockEmbedder {
            dimension: 2,
            calls: Arc::clone(&embed_calls),
            fallback: vec![0.92, 0.08],
        };
        let generator = MockGenerator {
            calls: Arc::clone(&generate_calls),
            reply,
        };
        let engine =
            Engine::new(embedder, generator, handle, RagConfig::default()).unwrap();
        (engine, embed_calls, generate_calls)
    }

    #[tokio::test]
    async fn answers_with_nearest_chunks_and_citations() {
        let (engine, _, _) = engine_over(animal_unit(), "Yes, dogs are mammals.");

        let vector = engine.embed_query("are dogs mammals?").await.unwrap();
        let retrieved = engine.retrieve(&vector, 2).unwrap();

        // Query vector (0.92, 0.08) sits nearest B, then A; C is excluded.
        let ids: Vec<&str> = retrieved.iter().map(|c| c.meta.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let answer = engine.answer("are dogs mammals?", None).await.unwrap();
        assert_eq!(answer.text, "Yes, dogs are mammals.");
        // C has no URL and ranks last anyway; both cited chunks carry URLs.
        assert_eq!(answer.citations.len(), 2);
        assert_eq!(answer.citations[0].url, "https://example.com/dogs");
    }

    #[tokio::test]
    async fn empty_query_fails_before_any_external_call() {
        let (engine, embed_calls, generate_calls) = engine_over(animal_unit(), "unused");

        for query in ["", "   "] {
            let err = engine.answer(query, None).await.unwrap_err();
            assert_eq!(err.stage, Stage::Embedding);
            assert!(matches!(err.source, RagError::EmptyQuery));
        }
        assert_eq!(embed_calls.load(Ordering::SeqCst), 0);
        assert_eq!(generate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn urlless_chunks_are_not_cited() {
        // Make the query land nearest C (no URL).
        let handle = Arc::new(IndexHandle::new());
        handle.swap(animal_unit());
        let embedder = MockEmbedder {
            dimension: 2,
            calls: Arc::new(AtomicUsize::new(0)),
            fallback: vec![0.0, 9.0],
        };
        let generator = MockGenerator {
            calls: Arc::new(AtomicUsize::new(0)),
            reply: "The market fell.",
        };
        let engine = Engine::new(
            embedder,
            generator,
            handle,
            RagConfig::builder().top_k(1).build(),
        )
        .unwrap();

        let answer = engine.answer("what happened to stocks?", None).await.unwrap();
        assert!(answer.citations.is_empty());
    }

    #[tokio::test]
    async fn citation_excerpts_are_capped() {
        let long_text = "market ".repeat(43); // ~300 chars
        let index = FlatIndex::build(vec![vec![1.0, 0.0]]).unwrap();
        let unit = IndexUnit::new(
            index,
            vec![meta("long", long_text.trim_end(), Some("https://example.com/long"))],
        )
        .unwrap();
        let (engine, _, _) = engine_over(unit, "ok");

        let answer = engine.answer("anything", None).await.unwrap();
        let excerpt = &answer.citations[0].excerpt;
        assert!(excerpt.chars().count() <= 150);
        assert!(excerpt.ends_with("..."));
        // The stored chunk text is unaffected.
        let unit = engine.index_handle().current().unwrap();
        assert_eq!(unit.meta(0).unwrap().text.len(), long_text.trim_end().len());
    }

    #[tokio::test]
    async fn prompt_carries_ranked_context_and_separate_image_part() {
        let (engine, _, _) = engine_over(animal_unit(), "unused");

        let vector = engine.embed_query("are dogs mammals?").await.unwrap();
        let retrieved = engine.retrieve(&vector, 2).unwrap();
        let image = ImageAttachment::from_bytes(b"\x89PNG\r\n\x1a\nfake".to_vec());
        let messages = engine.compose_prompt("are dogs mammals?", &retrieved, Some(image));

        assert_eq!(messages.len(), 2);
        let user = &messages[1];
        let text = user.content();
        assert!(text.contains("[Source 1]: dogs are mammals"));
        assert!(text.contains("[Source 2]: cats are mammals"));
        assert!(text.contains("Question: are dogs mammals?"));
        // The image is a separate part, never inlined into the text.
        assert!(user.image().is_some());
        assert!(!text.contains("base64"));
    }

    #[tokio::test]
    async fn generation_failures_are_stage_tagged() {
        struct FailingGenerator;
        impl ChatModel for FailingGenerator {
            async fn generate(&self, _messages: &[Message]) -> lectern_core::Result {
                Err(anyhow::anyhow!("upstream 500"))
            }
        }

        let handle = Arc::new(IndexHandle::new());
        handle.swap(animal_unit());
        let embedder = MockEmbedder {
            dimension: 2,
            calls: Arc::new(AtomicUsize::new(0)),
            fallback: vec![1.0, 0.0],
        };
        let engine =
            Engine::new(embedder, FailingGenerator, handle, RagConfig::default()).unwrap();

        let err = engine.answer("why?", None).await.unwrap_err();
        assert_eq!(err.stage, Stage::Generation);
        assert!(err.to_string().contains("upstream 500"));
    }

    #[tokio::test]
    async fn unloaded_index_reports_retrieval_unavailable() {
        let handle = Arc::new(IndexHandle::new());
        let embedder = MockEmbedder {
            dimension: 2,
            calls: Arc::new(AtomicUsize::new(0)),
            fallback: vec![1.0, 0.0],
        };
        let generator = MockGenerator {
            calls: Arc::new(AtomicUsize::new(0)),
            reply: "unused",
        };
        let engine =
            Engine::new(embedder, generator, handle, RagConfig::default()).unwrap();

        let err = engine.answer("anything", None).await.unwrap_err();
        assert_eq!(err.stage, Stage::Retrieval);
        assert!(matches!(err.source, RagError::IndexUnavailable));
    }

    #[test]
    fn construction_rejects_dimension_mismatch() {
        let handle = Arc::new(IndexHandle::new());
        handle.swap(animal_unit()); // dimension 2
        let embedder = MockEmbedder {
            dimension: 1536,
            calls: Arc::new(AtomicUsize::new(0)),
            fallback: vec![0.0; 1536],
        };
        let generator = MockGenerator {
            calls: Arc::new(AtomicUsize::new(0)),
            reply: "unused",
        };

        let err = Engine::new(embedder, generator, handle, RagConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            RagError::DimensionMismatch {
                expected: 2,
                actual: 1536
            }
        ));
    }
}
