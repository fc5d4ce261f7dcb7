//! lectern command-line tools.
//!
//! Three batch commands mirror the offline half of the pipeline:
//!
//! ```bash
//! # Chunk and embed document folders into the chunk-record artifact
//! OPENAI_API_KEY=... lectern ingest --pages scraped_pages --threads forum_threads --out chunks.jsonl
//!
//! # Build and persist the index unit from the artifact
//! lectern build --chunks chunks.jsonl --out index_data
//!
//! # Ask a one-shot question against a persisted index
//! OPENAI_API_KEY=... lectern ask --index-dir index_data "how do deadlines work?"
//! ```
//!
//! Rebuilds are offline by design: `build` writes a wholly new unit and
//! atomically replaces the previous one, so a serving process never observes
//! a half-written index.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use lectern_core::ImageAttachment;
use lectern_openai::OpenAi;
use lectern_rag::ingest::{Ingestor, build_unit, read_documents, read_records, write_records};
use lectern_rag::{Document, Engine, IndexHandle, RagConfig, SourceType};

#[derive(Debug, Parser)]
#[command(name = "lectern", about = "Grounded question answering over a fixed corpus")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Chunk and embed document folders into a chunk-record artifact.
    Ingest {
        /// Folder of page documents (`*.txt` + optional `*.json` sidecars).
        #[arg(long)]
        pages: Option<PathBuf>,

        /// Folder of thread documents.
        #[arg(long)]
        threads: Option<PathBuf>,

        /// Output path for the chunk-record artifact.
        #[arg(long, default_value = "chunks.jsonl")]
        out: PathBuf,

        /// Character budget per chunk.
        #[arg(long, default_value_t = 1500)]
        max_chunk_chars: usize,
    },

    /// Build and persist an index unit from a chunk-record artifact.
    Build {
        /// Chunk-record artifact produced by `ingest`.
        #[arg(long, default_value = "chunks.jsonl")]
        chunks: PathBuf,

        /// Directory to write the index unit into.
        #[arg(long, default_value = "index_data")]
        out: PathBuf,
    },

    /// Answer a single question against a persisted index.
    Ask {
        /// The question to answer.
        question: String,

        /// Directory holding the persisted index unit.
        #[arg(long, default_value = "index_data")]
        index_dir: PathBuf,

        /// Image file to attach to the question.
        #[arg(long)]
        image: Option<PathBuf>,

        /// Number of chunks to retrieve.
        #[arg(long, default_value_t = 5)]
        top_k: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    match Cli::parse().command {
        Command::Ingest {
            pages,
            threads,
            out,
            max_chunk_chars,
        } => ingest(pages, threads, out, max_chunk_chars).await,
        Command::Build { chunks, out } => build(chunks, out),
        Command::Ask {
            question,
            index_dir,
            image,
            top_k,
        } => ask(question, index_dir, image, top_k).await,
    }
}

async fn ingest(
    pages: Option<PathBuf>,
    threads: Option<PathBuf>,
    out: PathBuf,
    max_chunk_chars: usize,
) -> Result<()> {
    if pages.is_none() && threads.is_none() {
        bail!("nothing to ingest: pass --pages and/or --threads");
    }

    let mut documents: Vec<Document> = Vec::new();
    if let Some(dir) = pages {
        documents.extend(read_documents(&dir, SourceType::Page)?);
    }
    if let Some(dir) = threads {
        documents.extend(read_documents(&dir, SourceType::Thread)?);
    }

    let client = OpenAi::from_env()?;
    let ingestor = Ingestor::new(client, max_chunk_chars);
    let (records, report) = ingestor.ingest(&documents).await?;

    write_records(&out, &records)?;
    println!(
        "{} documents -> {} chunks, {} embedded, {} failed; wrote {}",
        report.documents,
        report.chunks,
        report.embedded,
        report.failed,
        out.display()
    );
    Ok(())
}

fn build(chunks: PathBuf, out: PathBuf) -> Result<()> {
    let records = read_records(&chunks)
        .with_context(|| format!("reading chunk records from {}", chunks.display()))?;
    let unit = build_unit(records).context("index build rejected")?;
    unit.save(&out)?;
    println!(
        "index unit written to {}: {} vectors of dimension {}",
        out.display(),
        unit.len(),
        unit.index().dimension()
    );
    Ok(())
}

async fn ask(
    question: String,
    index_dir: PathBuf,
    image: Option<PathBuf>,
    top_k: usize,
) -> Result<()> {
    let handle = IndexHandle::load(&index_dir)
        .with_context(|| format!("loading index unit from {}", index_dir.display()))?;

    let client = OpenAi::from_env()?;
    let config = RagConfig::builder().top_k(top_k).build();
    let engine = Engine::new(client.clone(), client, Arc::new(handle), config)?;

    let attachment = match image {
        Some(path) => {
            let bytes =
                fs::read(&path).with_context(|| format!("reading image {}", path.display()))?;
            Some(ImageAttachment::from_bytes(bytes))
        }
        None => None,
    };

    let answer = engine
        .answer(&question, attachment)
        .await
        .map_err(|err| anyhow::anyhow!("{err}"))?;

    println!("{}", answer.text);
    if !answer.citations.is_empty() {
        println!();
        for citation in &answer.citations {
            println!("  [{}] {}", citation.url, citation.excerpt);
        }
    }
    Ok(())
}
