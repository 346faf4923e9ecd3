//! On-disk index format.
//!
//! An index directory holds two files:
//! - `index.sqlite`: one row per chunk (text, metadata JSON, little-endian f32 embedding)
//! - `manifest.json`: what built the index plus the SHA-256 of `index.sqlite`
//!
//! Loading only parses data. The manifest version and checksum are verified
//! before the database is opened, and the database is opened read-only.

use crate::embeddings::EmbeddingSpec;
use crate::types::{ChunkMetadata, DocumentChunk};
use crate::vector_index::{FlatIndex, VectorIndex};
use chrono::{DateTime, Utc};
use pdfqa_core::{AppError, AppResult};
use rusqlite::{params, Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const DATA_FILE: &str = "index.sqlite";

/// Bumped whenever the directory layout or table schema changes.
pub const FORMAT_VERSION: u32 = 1;

/// Sidecar describing an index directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    /// File name of the ingested PDF
    pub source: String,
    pub embedding: EmbeddingSpec,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub page_count: u32,
    pub chunk_count: usize,
    /// Hex SHA-256 of `index.sqlite`
    pub checksum: String,
}

/// Everything the manifest records except what `save_index` derives itself.
#[derive(Debug, Clone)]
pub struct IndexInfo {
    pub source: String,
    pub embedding: EmbeddingSpec,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub page_count: u32,
}

/// Write `index` into `dir`, which must not already hold an index.
pub fn save_index(dir: &Path, index: &FlatIndex, info: IndexInfo) -> AppResult<IndexManifest> {
    let data_path = dir.join(DATA_FILE);
    if data_path.exists() || dir.join(MANIFEST_FILE).exists() {
        return Err(AppError::Index(format!(
            "Refusing to overwrite existing index at {:?}",
            dir
        )));
    }

    if info.embedding.dimensions != index.dimensions() {
        return Err(AppError::Index(format!(
            "Embedder reports {} dimensions but the index holds {}",
            info.embedding.dimensions,
            index.dimensions()
        )));
    }

    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::Index(format!("Failed to create index directory {:?}: {}", dir, e)))?;

    write_chunks(&data_path, index)?;

    let manifest = IndexManifest {
        format_version: FORMAT_VERSION,
        created_at: Utc::now(),
        source: info.source,
        embedding: info.embedding,
        chunk_size: info.chunk_size,
        chunk_overlap: info.chunk_overlap,
        page_count: info.page_count,
        chunk_count: index.len(),
        checksum: file_checksum(&data_path)?,
    };

    // Written last: a directory without a manifest is an incomplete index.
    let manifest_json = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(dir.join(MANIFEST_FILE), manifest_json)?;

    tracing::debug!(
        "Saved index with {} chunks to {:?}",
        manifest.chunk_count,
        dir
    );

    Ok(manifest)
}

/// Load and verify an index directory.
pub fn load_index(dir: &Path) -> AppResult<(FlatIndex, IndexManifest)> {
    let manifest = read_manifest(dir)?;

    if manifest.format_version != FORMAT_VERSION {
        return Err(AppError::Index(format!(
            "Unsupported index format version {} (expected {})",
            manifest.format_version, FORMAT_VERSION
        )));
    }

    let data_path = dir.join(DATA_FILE);
    if !data_path.exists() {
        return Err(AppError::Index(format!(
            "Index data file missing: {:?}",
            data_path
        )));
    }

    let checksum = file_checksum(&data_path)?;
    if checksum != manifest.checksum {
        return Err(AppError::Index(format!(
            "Index checksum mismatch for {:?}; the data file was modified after it was written",
            data_path
        )));
    }

    let index = read_chunks(&data_path, manifest.embedding.dimensions)?;

    if index.len() != manifest.chunk_count {
        return Err(AppError::Index(format!(
            "Index holds {} chunks but manifest lists {}",
            index.len(),
            manifest.chunk_count
        )));
    }

    tracing::debug!("Loaded index with {} chunks from {:?}", index.len(), dir);
    Ok((index, manifest))
}

/// Parse `manifest.json` from an index directory.
pub fn read_manifest(dir: &Path) -> AppResult<IndexManifest> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Err(AppError::Index(format!(
            "No index found at {:?} (missing {})",
            dir, MANIFEST_FILE
        )));
    }

    let contents = std::fs::read_to_string(&manifest_path)?;
    serde_json::from_str(&contents)
        .map_err(|e| AppError::Index(format!("Invalid manifest {:?}: {}", manifest_path, e)))
}

fn write_chunks(path: &Path, index: &FlatIndex) -> AppResult<()> {
    let mut conn = Connection::open(path)
        .map_err(|e| AppError::Index(format!("Failed to create SQLite index: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE chunks (
            id TEXT PRIMARY KEY,
            position INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            metadata TEXT NOT NULL
        );
        "#,
    )
    .map_err(|e| AppError::Index(format!("Failed to create tables: {}", e)))?;

    let tx = conn
        .transaction()
        .map_err(|e| AppError::Index(format!("Failed to begin transaction: {}", e)))?;

    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO chunks (id, position, text, embedding, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .map_err(|e| AppError::Index(format!("Failed to prepare insert: {}", e)))?;

        for entry in index.entries() {
            let metadata_json = serde_json::to_string(&entry.chunk.metadata)?;
            stmt.execute(params![
                entry.chunk.id,
                entry.chunk.position as i64,
                entry.chunk.text,
                embedding_to_bytes(&entry.embedding),
                metadata_json,
            ])
            .map_err(|e| AppError::Index(format!("Failed to insert chunk: {}", e)))?;
        }
    }

    tx.commit()
        .map_err(|e| AppError::Index(format!("Failed to commit index: {}", e)))?;

    conn.close()
        .map_err(|(_, e)| AppError::Index(format!("Failed to close SQLite index: {}", e)))?;

    Ok(())
}

fn read_chunks(path: &Path, dimensions: usize) -> AppResult<FlatIndex> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| AppError::Index(format!("Failed to open SQLite index: {}", e)))?;

    let mut stmt = conn
        .prepare("SELECT id, position, text, embedding, metadata FROM chunks ORDER BY position")
        .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Vec<u8>>(3)?,
                row.get::<_, String>(4)?,
            ))
        })
        .map_err(|e| AppError::Index(format!("Failed to query chunks: {}", e)))?;

    let mut index = FlatIndex::new(dimensions);
    for row in rows {
        let (id, position, text, embedding_bytes, metadata_json) =
            row.map_err(|e| AppError::Index(format!("Failed to read chunk: {}", e)))?;

        let metadata: ChunkMetadata = serde_json::from_str(&metadata_json)
            .map_err(|e| AppError::Index(format!("Invalid metadata for chunk {}: {}", id, e)))?;
        let position = u32::try_from(position)
            .map_err(|_| AppError::Index(format!("Invalid position for chunk {}", id)))?;
        let embedding = bytes_to_embedding(&embedding_bytes)?;

        index.add(
            DocumentChunk {
                id,
                position,
                text,
                metadata,
            },
            embedding,
        )?;
    }

    Ok(index)
}

fn file_checksum(path: &Path) -> AppResult<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Index(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
