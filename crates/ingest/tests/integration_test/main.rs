/// Integration tests for document ingestion covering .docx and PDF extraction
/// from real packages, path dispatch, chunking and indexing.

mod docx;
mod helpers;
mod pdf;
mod pipeline;
