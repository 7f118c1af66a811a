use thiserror::Error;

/// Failure reported by a caller-supplied token counter.
#[derive(Error, Debug)]
#[error("token counting failed: {0}")]
pub struct TokenCountError(pub String);

/// Metadata that does not match the declared schema of a corpus.
#[derive(Error, Debug, PartialEq)]
pub enum MetadataError {
    #[error("Unknown metadata field: {0}")]
    UnknownField(String),

    #[error("Missing required metadata field: {0}")]
    MissingField(String),

    #[error("Field {field} expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}
