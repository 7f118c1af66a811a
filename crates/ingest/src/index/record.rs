use std::path::Path;

use docstruct_core::{Chunk, Metadata, MetadataError, MetadataSchema, MetadataValue};
use serde::{Deserialize, Serialize};

use crate::merge::{chunk_text, strip_structure_tags};

/// One document submitted to a vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
}

impl IndexRecord {
    /// Deterministic id of a chunk, so re-submitting a file overwrites its
    /// earlier records instead of duplicating them.
    pub fn record_id(file_id: &str, chunk_index: usize) -> String {
        format!("{file_id}_{chunk_index}")
    }

    pub fn from_chunk(file_id: &str, chunk_index: usize, chunk: &Chunk) -> Self {
        let page_numbers = chunk
            .page_numbers
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let mut metadata = Metadata::new();
        metadata.insert("source".into(), file_id.into());
        metadata.insert("chunk_index".into(), (chunk_index as i64).into());
        metadata.insert("tokens".into(), (chunk.tokens as i64).into());
        metadata.insert("page_numbers".into(), page_numbers.into());

        Self {
            id: Self::record_id(file_id, chunk_index),
            document: strip_structure_tags(&chunk_text(chunk)),
            metadata,
        }
    }
}

/// Identifier of a source file: its canonical path, or the path as given
/// when it cannot be resolved. Same-named files in different directories get
/// different ids.
pub fn file_id(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

/// Records for every chunk of one file, indexed in chunk order.
pub fn records_for_chunks(file_id: &str, chunks: &[Chunk]) -> Vec<IndexRecord> {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| IndexRecord::from_chunk(file_id, i, chunk))
        .collect()
}

/// A search match as returned by an index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    /// Cosine distance, 0 for identical direction.
    pub distance: f64,
    pub document: String,
    pub metadata: Metadata,
}

impl SearchHit {
    pub fn score(&self) -> f64 {
        1.0 - self.distance
    }

    /// Flatten into a result row after checking the metadata against `schema`.
    pub fn into_row(self, schema: &MetadataSchema) -> Result<SearchRow, MetadataError> {
        schema.validate(&self.metadata)?;
        Ok(SearchRow {
            score: self.score(),
            id: self.id,
            text: self.document,
            fields: self.metadata,
        })
    }
}

/// One row of a search result table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRow {
    pub id: String,
    pub score: f64,
    pub text: String,
    pub fields: Metadata,
}

impl SearchRow {
    pub fn field(&self, name: &str) -> Option<&MetadataValue> {
        self.fields.get(name)
    }
}
