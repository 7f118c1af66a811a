//! Indexing of chunks into a vector store.
//!
//! No store client ships here: [`VectorIndex`] is the seam, with
//! [`MemoryIndex`] as the in-process implementation.

pub mod batcher;
pub mod memory;
pub mod record;
pub mod traits;

pub use batcher::{add_batched, BatchFailure, IngestReport};
pub use memory::MemoryIndex;
pub use record::{file_id, records_for_chunks, IndexRecord, SearchHit, SearchRow};
pub use traits::{BatchOutcome, IndexError, VectorIndex};
