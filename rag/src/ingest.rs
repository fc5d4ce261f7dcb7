//! Ingestion: document folders → embedded chunk records → index unit.
//!
//! Documents arrive as one `.txt` file per document with an optional
//! same-stem `.json` sidecar carrying `url`, `title`, and `date`/`created_at`
//! (`date` preferred when both are present). The ingestor cleans and chunks
//! each document, embeds every chunk, and emits [`ChunkRecord`]s plus a
//! report that makes partial embedding failures countable instead of letting
//! them silently shrink the output.

use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use lectern_core::EmbeddingModel;
use serde::Deserialize;

use crate::chunking::{Chunker, SentenceChunker};
use crate::error::{RagError, Result};
use crate::index::FlatIndex;
use crate::persistence::IndexUnit;
use crate::types::{ChunkRecord, Document, SourceType};

/// Counts from one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents read.
    pub documents: usize,
    /// Chunks produced by the chunker.
    pub chunks: usize,
    /// Chunks successfully embedded into records.
    pub embedded: usize,
    /// Chunks whose embedding call failed (logged, not retried here).
    pub failed: usize,
}

/// Optional sidecar metadata next to a document file.
#[derive(Debug, Default, Deserialize)]
struct Sidecar {
    url: Option<String>,
    title: Option<String>,
    date: Option<String>,
    created_at: Option<String>,
}

/// Reads all `*.txt` documents under `dir`, in file-name order.
///
/// Missing sidecars yield defaults (no URL, stem-derived title, no
/// timestamp); an unreadable text file or malformed sidecar is an error, not
/// a silent skip.
pub fn read_documents(dir: &Path, source: SourceType) -> Result<Vec<Document>> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path).map_err(|e| RagError::Persistence {
            path: path.clone(),
            source: e,
        })?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let sidecar_path = path.with_extension("json");
        let sidecar = if sidecar_path.exists() {
            let raw = fs::read_to_string(&sidecar_path).map_err(|e| RagError::Persistence {
                path: sidecar_path.clone(),
                source: e,
            })?;
            serde_json::from_str::<Sidecar>(&raw).map_err(|e| {
                RagError::Serialization(format!("sidecar {}: {e}", sidecar_path.display()))
            })?
        } else {
            Sidecar::default()
        };

        documents.push(Document {
            id: stem.clone(),
            text,
            source,
            url: sidecar.url,
            title: sidecar.title.unwrap_or(stem),
            created_at: sidecar.date.or(sidecar.created_at),
        });
    }

    tracing::info!(count = documents.len(), dir = %dir.display(), "documents read");
    Ok(documents)
}

/// Chunks and embeds documents into chunk records.
pub struct Ingestor<M> {
    embedder: Arc<M>,
    chunker: Box<dyn Chunker>,
}

impl<M> std::fmt::Debug for Ingestor<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("chunker", &self.chunker.name())
            .finish_non_exhaustive()
    }
}

impl<M> Ingestor<M>
where
    M: EmbeddingModel + 'static,
{
    /// Creates an ingestor with sentence chunking under the given budget.
    #[must_use]
    pub fn new(embedder: M, max_chunk_chars: usize) -> Self {
        Self {
            embedder: Arc::new(embedder),
            chunker: Box::new(SentenceChunker::new(max_chunk_chars)),
        }
    }

    /// Replaces the chunking strategy.
    #[must_use]
    pub fn with_chunker(mut self, chunker: impl Chunker + 'static) -> Self {
        self.chunker = Box::new(chunker);
        self
    }

    /// Chunks and embeds `documents` in order.
    ///
    /// Record order follows document order, then chunk order within each
    /// document, the same order the index build will use for its rows. A
    /// failed embedding drops only that chunk and is counted in the report.
    pub async fn ingest(&self, documents: &[Document]) -> Result<(Vec<ChunkRecord>, IngestReport)> {
        let mut records = Vec::new();
        let mut report = IngestReport::default();

        for doc in documents {
            report.documents += 1;
            let chunks = self.chunker.chunk(doc)?;
            report.chunks += chunks.len();

            for meta in chunks {
                match self.embedder.embed(&meta.text).await {
                    Ok(embedding) => {
                        records.push(ChunkRecord { embedding, meta });
                        report.embedded += 1;
                    }
                    Err(err) => {
                        report.failed += 1;
                        tracing::warn!(chunk = %meta.id, error = %err, "embedding failed, chunk dropped");
                    }
                }
            }
        }

        tracing::info!(
            documents = report.documents,
            chunks = report.chunks,
            embedded = report.embedded,
            failed = report.failed,
            "ingestion complete"
        );
        Ok((records, report))
    }
}

/// Writes chunk records as one JSON object per line.
pub fn write_records(path: &Path, records: &[ChunkRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path).map_err(|e| RagError::Persistence {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);
    for record in records {
        let line =
            serde_json::to_string(record).map_err(|e| RagError::Serialization(e.to_string()))?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a chunk-record artifact back.
///
/// A malformed line is an error: the artifact feeds the index build, where a
/// silently skipped line would shift every following row out of alignment.
pub fn read_records(path: &Path) -> Result<Vec<ChunkRecord>> {
    let file = fs::File::open(path).map_err(|e| RagError::Persistence {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ChunkRecord = serde_json::from_str(&line).map_err(|e| {
            RagError::Serialization(format!("chunk record line {}: {e}", line_no + 1))
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Builds an index unit from chunk records, preserving record order as row
/// order so vectors and metadata stay aligned by construction.
pub fn build_unit(records: Vec<ChunkRecord>) -> Result<IndexUnit> {
    let mut vectors = Vec::with_capacity(records.len());
    let mut metadata = Vec::with_capacity(records.len());
    for record in records {
        vectors.push(record.embedding);
        metadata.push(record.meta);
    }
    let index = FlatIndex::build(vectors)?;
    IndexUnit::new(index, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct MockEmbedder {
        dimension: usize,
        fail_on: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl MockEmbedder {
        fn new(dimension: usize) -> Self {
            Self {
                dimension,
                fail_on: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl EmbeddingModel for MockEmbedder {
        fn dim(&self) -> usize {
            self.dimension
        }

        #[allow(clippy::cast_precision_loss)]
        async fn embed(&self, text: &str) -> lectern_core::Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.is_some_and(|needle| text.contains(needle)) {
                return Err(anyhow::anyhow!("simulated outage"));
            }
            let mut vector = vec![0.0; self.dimension];
            for (i, value) in vector.iter_mut().enumerate() {
                *value = ((text.len() + i) % 10) as f32;
            }
            Ok(vector)
        }
    }

    #[test]
    fn reads_documents_with_and_without_sidecars() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("alpha.txt"), "alpha text").unwrap();
        fs::write(
            dir.path().join("alpha.json"),
            r#"{"url": "https://example.com/alpha", "title": "Alpha", "date": "2025-03-01"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("beta.txt"), "beta text").unwrap();

        let docs = read_documents(dir.path(), SourceType::Page).unwrap();
        assert_eq!(docs.len(), 2);

        assert_eq!(docs[0].id, "alpha");
        assert_eq!(docs[0].url.as_deref(), Some("https://example.com/alpha"));
        assert_eq!(docs[0].title, "Alpha");
        assert_eq!(docs[0].created_at.as_deref(), Some("2025-03-01"));

        assert_eq!(docs[1].id, "beta");
        assert!(docs[1].url.is_none());
        assert_eq!(docs[1].title, "beta");
        assert!(docs[1].created_at.is_none());
    }

    #[test]
    fn date_preferred_over_created_at() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("doc.txt"), "text").unwrap();
        fs::write(
            dir.path().join("doc.json"),
            r#"{"date": "2025-01-01", "created_at": "2024-12-31"}"#,
        )
        .unwrap();

        let docs = read_documents(dir.path(), SourceType::Thread).unwrap();
        assert_eq!(docs[0].created_at.as_deref(), Some("2025-01-01"));
    }

    #[test]
    fn malformed_sidecar_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("doc.txt"), "text").unwrap();
        fs::write(dir.path().join("doc.json"), "{not json").unwrap();

        let err = read_documents(dir.path(), SourceType::Page).unwrap_err();
        assert!(matches!(err, RagError::Serialization(_)));
    }

    fn doc(id: &str, text: &str) -> Document {
        Document {
            id: id.into(),
            text: text.into(),
            source: SourceType::Page,
            url: Some(format!("https://example.com/{id}")),
            title: id.into(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn ingests_documents_into_ordered_records() {
        let ingestor = Ingestor::new(MockEmbedder::new(4), 1500);
        let docs = vec![doc("one", "First document."), doc("two", "Second document.")];

        let (records, report) = ingestor.ingest(&docs).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].meta.id, "one#chunk_0");
        assert_eq!(records[1].meta.id, "two#chunk_0");
        assert_eq!(report.documents, 2);
        assert_eq!(report.embedded, 2);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn embedding_failures_are_counted_not_hidden() {
        let embedder = MockEmbedder {
            dimension: 4,
            fail_on: Some("poison"),
            calls: AtomicUsize::new(0),
        };
        let ingestor = Ingestor::new(embedder, 1500);
        let docs = vec![doc("ok", "Fine text."), doc("bad", "poison text.")];

        let (records, report) = ingestor.ingest(&docs).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(report.chunks, 2);
        assert_eq!(report.embedded, 1);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn records_round_trip_and_build_an_aligned_unit() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("chunks.jsonl");

        let ingestor = Ingestor::new(MockEmbedder::new(4), 1500);
        let docs = vec![doc("one", "First document."), doc("two", "Second document.")];
        let (records, _) = ingestor.ingest(&docs).await.unwrap();

        write_records(&artifact, &records).unwrap();
        let loaded = read_records(&artifact).unwrap();
        assert_eq!(loaded.len(), 2);

        let unit = build_unit(loaded).unwrap();
        assert_eq!(unit.len(), 2);
        assert_eq!(unit.meta(1).unwrap().id, "two#chunk_0");
    }

    #[test]
    fn malformed_record_line_is_an_error() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("chunks.jsonl");
        fs::write(&artifact, "{\"embedding\": [1.0]\n").unwrap();

        let err = read_records(&artifact).unwrap_err();
        assert!(matches!(err, RagError::Serialization(_)));
    }

    #[test]
    fn build_unit_rejects_empty_records() {
        assert!(matches!(
            build_unit(Vec::new()).unwrap_err(),
            RagError::EmptyInput
        ));
    }
}
