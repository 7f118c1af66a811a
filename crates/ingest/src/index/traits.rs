use async_trait::async_trait;
use docstruct_core::MetadataError;
use thiserror::Error;

use super::record::{IndexRecord, SearchHit};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Index backend error: {0}")]
    Backend(String),

    #[error("Invalid record metadata: {0}")]
    Metadata(#[from] MetadataError),
}

/// Result of submitting one batch of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub success: bool,
    /// Human-readable reason when `success` is false.
    pub cause: Option<String>,
}

impl BatchOutcome {
    pub fn committed() -> Self {
        Self {
            success: true,
            cause: None,
        }
    }

    pub fn failed(cause: impl Into<String>) -> Self {
        Self {
            success: false,
            cause: Some(cause.into()),
        }
    }
}

/// Trait for vector store backends (Chroma, in-memory, etc.)
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Add a batch of records. Records whose id already exists replace the
    /// stored one.
    async fn add(&self, records: &[IndexRecord]) -> BatchOutcome;

    /// Top `n` records for `query`, best first.
    async fn search(&self, query: &str, n: usize) -> Result<Vec<SearchHit>, IndexError>;

    /// Name of the collection records are written to.
    fn collection(&self) -> &str;
}
