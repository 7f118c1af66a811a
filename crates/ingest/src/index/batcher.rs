use std::time::Instant;

use tracing::{info, warn};

use super::record::IndexRecord;
use super::traits::VectorIndex;

/// The batch that stopped an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// 1-based batch number.
    pub batch: usize,
    pub cause: String,
}

/// Summary of one batched ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub batches_total: usize,
    pub batches_committed: usize,
    pub failure: Option<BatchFailure>,
}

impl IngestReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.batches_committed == self.batches_total
    }
}

/// Submit `records` to `index` in order, `batch_size` at a time. Stops at the
/// first failed batch; later batches are not attempted.
pub async fn add_batched(
    index: &dyn VectorIndex,
    records: &[IndexRecord],
    batch_size: usize,
) -> IngestReport {
    let batch_size = batch_size.max(1);
    let batches_total = records.len().div_ceil(batch_size);
    let start = Instant::now();
    let mut report = IngestReport {
        batches_total,
        batches_committed: 0,
        failure: None,
    };

    for (i, batch) in records.chunks(batch_size).enumerate() {
        let number = i + 1;
        info!(
            collection = index.collection(),
            batch = number,
            batches = batches_total,
            records = batch.len(),
            "submitting batch"
        );
        let outcome = index.add(batch).await;
        if !outcome.success {
            let cause = outcome
                .cause
                .unwrap_or_else(|| "unknown error".to_string());
            warn!(batch = number, %cause, "batch failed, stopping ingestion");
            report.failure = Some(BatchFailure {
                batch: number,
                cause,
            });
            break;
        }
        report.batches_committed += 1;
    }

    info!(
        committed = report.batches_committed,
        total = batches_total,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "batched ingestion finished"
    );
    report
}
