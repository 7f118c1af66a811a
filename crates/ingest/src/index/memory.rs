//! In-process vector index using bag-of-words vectors.

use std::collections::HashMap;

use async_trait::async_trait;
use docstruct_core::MetadataSchema;
use tokio::sync::RwLock;
use tracing::debug;

use super::record::{IndexRecord, SearchHit};
use super::traits::{BatchOutcome, IndexError, VectorIndex};

type TermVector = HashMap<String, f64>;

fn term_vector(text: &str) -> TermVector {
    let mut terms = TermVector::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        *terms.entry(word.to_lowercase()).or_default() += 1.0;
    }
    terms
}

fn norm(v: &TermVector) -> f64 {
    v.values().map(|x| x * x).sum::<f64>().sqrt()
}

/// Cosine similarity, 0 when either side has no terms.
fn cosine(a: &TermVector, b: &TermVector) -> f64 {
    let denominator = norm(a) * norm(b);
    if denominator == 0.0 {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .filter_map(|(term, x)| b.get(term).map(|y| x * y))
        .sum();
    dot / denominator
}

struct StoredRecord {
    record: IndexRecord,
    vector: TermVector,
}

/// Vector index held in memory, with records ordered by first insertion.
pub struct MemoryIndex {
    collection: String,
    schema: Option<MetadataSchema>,
    records: RwLock<Vec<StoredRecord>>,
}

impl MemoryIndex {
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            schema: None,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Reject batches whose metadata does not match `schema`.
    pub fn with_schema(mut self, schema: MetadataSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<IndexRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|stored| stored.record.id == id)
            .map(|stored| stored.record.clone())
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn add(&self, records: &[IndexRecord]) -> BatchOutcome {
        // Validate the whole batch before writing any of it.
        if let Some(schema) = &self.schema {
            for record in records {
                if let Err(e) = schema.validate(&record.metadata) {
                    return BatchOutcome::failed(format!("record {}: {e}", record.id));
                }
            }
        }

        let mut stored = self.records.write().await;
        for record in records {
            let entry = StoredRecord {
                vector: term_vector(&record.document),
                record: record.clone(),
            };
            match stored.iter_mut().find(|s| s.record.id == record.id) {
                Some(existing) => *existing = entry,
                None => stored.push(entry),
            }
        }
        debug!(
            collection = %self.collection,
            added = records.len(),
            total = stored.len(),
            "added records"
        );
        BatchOutcome::committed()
    }

    async fn search(&self, query: &str, n: usize) -> Result<Vec<SearchHit>, IndexError> {
        let query_vector = term_vector(query);
        let stored = self.records.read().await;
        let mut hits: Vec<SearchHit> = stored
            .iter()
            .map(|s| SearchHit {
                id: s.record.id.clone(),
                distance: 1.0 - cosine(&query_vector, &s.vector),
                document: s.record.document.clone(),
                metadata: s.record.metadata.clone(),
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(n);
        Ok(hits)
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}
