//! Persisted index units and the shared handle that serves them.
//!
//! A unit is one directory holding two row-aligned artifacts:
//!
//! - `vectors.bin`: header (`LVEC` magic, format version, dimension, row
//!   count) followed by the little-endian `f32` payload in row order;
//! - `metadata.jsonl`: one [`ChunkMeta`] JSON object per line, line `i`
//!   describing vector row `i`.
//!
//! The two are written and replaced as one: saves stage into a sibling
//! temporary directory and rename into place, and loads re-verify the header,
//! the payload length, and the row/record alignment before anything is
//! served. A unit that fails any of these checks is rejected with
//! [`RagError::CorruptIndex`] rather than loaded partially.

use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{RagError, Result};
use crate::index::FlatIndex;
use crate::types::ChunkMeta;

const VECTORS_FILE: &str = "vectors.bin";
const METADATA_FILE: &str = "metadata.jsonl";

const MAGIC: [u8; 4] = *b"LVEC";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// A flat index and its row-aligned metadata, owned jointly as one unit.
#[derive(Debug, Clone)]
pub struct IndexUnit {
    index: FlatIndex,
    metadata: Vec<ChunkMeta>,
}

impl IndexUnit {
    /// Joins an index with its metadata sequence.
    ///
    /// # Errors
    /// [`RagError::CorruptIndex`] if the row counts differ; a misaligned
    /// pair must be rejected, never persisted or served.
    pub fn new(index: FlatIndex, metadata: Vec<ChunkMeta>) -> Result<Self> {
        if index.len() != metadata.len() {
            return Err(RagError::CorruptIndex(format!(
                "{} vectors but {} metadata records",
                index.len(),
                metadata.len()
            )));
        }
        Ok(Self { index, metadata })
    }

    /// Returns the flat index.
    #[must_use]
    pub const fn index(&self) -> &FlatIndex {
        &self.index
    }

    /// Returns the metadata sequence, row-aligned with the index.
    #[must_use]
    pub fn metadata(&self) -> &[ChunkMeta] {
        &self.metadata
    }

    /// Returns the metadata record for `row`, if in bounds.
    #[must_use]
    pub fn meta(&self, row: usize) -> Option<&ChunkMeta> {
        self.metadata.get(row)
    }

    /// Returns the number of stored vectors (equal to metadata records).
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the unit holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Persists the unit into `dir`, replacing any previous unit there.
    ///
    /// Both artifacts are staged into a temporary sibling directory and
    /// renamed into place, so a crash mid-save leaves the previous unit
    /// intact and readers never observe a half-written directory.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let parent = match dir.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let staging = tempdir_in(parent)?;
        write_vectors(&staging.join(VECTORS_FILE), &self.index)?;
        write_metadata(&staging.join(METADATA_FILE), &self.metadata)?;

        if dir.exists() {
            let retired = dir.with_extension("old");
            if retired.exists() {
                fs::remove_dir_all(&retired)?;
            }
            fs::rename(dir, &retired)?;
            fs::rename(&staging, dir)?;
            fs::remove_dir_all(&retired)?;
        } else {
            fs::rename(&staging, dir)?;
        }

        tracing::info!(
            rows = self.len(),
            dimension = self.index.dimension(),
            path = %dir.display(),
            "index unit persisted"
        );
        Ok(())
    }

    /// Loads and verifies a unit from `dir`.
    ///
    /// # Errors
    /// [`RagError::CorruptIndex`] if the header, payload length, metadata,
    /// or row alignment fail verification; [`RagError::Persistence`] if the
    /// artifacts cannot be read.
    pub fn load(dir: &Path) -> Result<Self> {
        let index = read_vectors(&dir.join(VECTORS_FILE))?;
        let metadata = read_metadata(&dir.join(METADATA_FILE))?;

        if index.len() != metadata.len() {
            return Err(RagError::CorruptIndex(format!(
                "{} vectors but {} metadata records",
                index.len(),
                metadata.len()
            )));
        }

        tracing::info!(
            rows = index.len(),
            dimension = index.dimension(),
            path = %dir.display(),
            "index unit loaded"
        );
        Ok(Self { index, metadata })
    }
}

/// Shared, atomically swappable pointer to the current [`IndexUnit`].
///
/// Queries clone the `Arc` under a brief read lock and then run lock-free
/// against an immutable unit; a rebuild swaps the pointer in one step, so
/// in-flight queries keep the unit they started with and later queries see
/// the complete replacement.
#[derive(Debug, Default)]
pub struct IndexHandle {
    current: RwLock<Option<Arc<IndexUnit>>>,
}

impl IndexHandle {
    /// Creates an empty handle; [`current`](Self::current) fails until a
    /// unit is installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a unit from `dir` and installs it.
    pub fn load(dir: &Path) -> Result<Self> {
        let handle = Self::new();
        handle.swap(IndexUnit::load(dir)?);
        Ok(handle)
    }

    /// Returns the current unit.
    ///
    /// # Errors
    /// [`RagError::IndexUnavailable`] if no unit has been installed.
    pub fn current(&self) -> Result<Arc<IndexUnit>> {
        self.current
            .read()
            .clone()
            .ok_or(RagError::IndexUnavailable)
    }

    /// Atomically replaces the served unit.
    pub fn swap(&self, unit: IndexUnit) {
        *self.current.write() = Some(Arc::new(unit));
    }
}

fn tempdir_in(parent: &Path) -> Result<PathBuf> {
    let staging = parent.join(format!(".staging-{}", std::process::id()));
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;
    Ok(staging)
}

fn write_vectors(path: &Path, index: &FlatIndex) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| persistence_error(path, e))?;
    let mut writer = BufWriter::new(file);

    let dimension = u32::try_from(index.dimension())
        .map_err(|_| RagError::Serialization("dimension overflows u32".to_string()))?;
    let rows = u64::try_from(index.len())
        .map_err(|_| RagError::Serialization("row count overflows u64".to_string()))?;

    writer.write_all(&MAGIC)?;
    writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
    writer.write_all(&dimension.to_le_bytes())?;
    writer.write_all(&rows.to_le_bytes())?;
    for value in index.data() {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

fn read_vectors(path: &Path) -> Result<FlatIndex> {
    let bytes = fs::read(path).map_err(|e| persistence_error(path, e))?;
    if bytes.len() < HEADER_LEN {
        return Err(RagError::CorruptIndex(format!(
            "vector artifact truncated: {} bytes",
            bytes.len()
        )));
    }

    if bytes[0..4] != MAGIC {
        return Err(RagError::CorruptIndex(
            "vector artifact has wrong magic bytes".to_string(),
        ));
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != FORMAT_VERSION {
        return Err(RagError::CorruptIndex(format!(
            "unsupported vector artifact version {version}"
        )));
    }
    let dimension = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let rows = u64::from_le_bytes([
        bytes[12], bytes[13], bytes[14], bytes[15], bytes[16], bytes[17], bytes[18], bytes[19],
    ]);
    let rows = usize::try_from(rows)
        .map_err(|_| RagError::CorruptIndex(format!("row count {rows} overflows usize")))?;

    let payload = &bytes[HEADER_LEN..];
    let expected = dimension
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(std::mem::size_of::<f32>()))
        .ok_or_else(|| RagError::CorruptIndex("vector payload size overflows".to_string()))?;
    if payload.len() != expected {
        return Err(RagError::CorruptIndex(format!(
            "vector payload is {} bytes, expected {expected}",
            payload.len()
        )));
    }

    let mut data = Vec::with_capacity(dimension * rows);
    for chunk in payload.chunks_exact(4) {
        data.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    FlatIndex::from_raw(dimension, data)
}

fn write_metadata(path: &Path, metadata: &[ChunkMeta]) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| persistence_error(path, e))?;
    let mut writer = BufWriter::new(file);
    for meta in metadata {
        let line = serde_json::to_string(meta).map_err(|e| RagError::Serialization(e.to_string()))?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

fn read_metadata(path: &Path) -> Result<Vec<ChunkMeta>> {
    let file = fs::File::open(path).map_err(|e| persistence_error(path, e))?;
    let reader = BufReader::new(file);
    let mut metadata = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let meta: ChunkMeta = serde_json::from_str(&line).map_err(|e| {
            RagError::CorruptIndex(format!("metadata line {}: {e}", line_no + 1))
        })?;
        metadata.push(meta);
    }
    Ok(metadata)
}

fn persistence_error(path: &Path, source: std::io::Error) -> RagError {
    RagError::Persistence {
        path: path.to_path_buf(),
        source,
    }
}
