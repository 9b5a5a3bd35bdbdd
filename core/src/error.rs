//! Error taxonomy for the ingestion and search pipelines.
//!
//! Every variant here maps 1:1 to an error code surfaced in API responses
//! and in per-file `errors[]` entries. Components capture failures into an
//! [`IngestError`] at their boundary; callers decide whether to keep going.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("extraction failed: {0}")]
    ExtractFailed(String),

    #[error("encoding failed: {0}")]
    EncodeFailed(String),

    #[error("storage write failed: {0}")]
    StorageWriteFailed(String),

    #[error("metadata write failed: {0}")]
    MetadataWriteFailed(String),

    #[error("vector write failed: {0}")]
    VectorWriteFailed(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl IngestError {
    /// Stable machine-readable code, used both in per-file `errors[]` entries
    /// and as the `code` field of HTTP error responses.
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::UnsupportedType(_) => "UNSUPPORTED_TYPE",
            IngestError::ExtractFailed(_) => "EXTRACT_FAILED",
            IngestError::EncodeFailed(_) => "ENCODE_FAILED",
            IngestError::StorageWriteFailed(_) => "STORAGE_WRITE_FAILED",
            IngestError::MetadataWriteFailed(_) => "METADATA_WRITE_FAILED",
            IngestError::VectorWriteFailed(_) => "VECTOR_WRITE_FAILED",
            IngestError::QueryFailed(_) => "QUERY_FAILED",
            IngestError::InvalidPath(_) => "INVALID_PATH",
        }
    }

    /// Whether this error, if raised for the storage root itself or for a
    /// required document store, should abort the whole batch (§7).
    pub fn aborts_batch(&self) -> bool {
        matches!(
            self,
            IngestError::StorageWriteFailed(_) | IngestError::MetadataWriteFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(IngestError::UnsupportedType("x".into()).code(), "UNSUPPORTED_TYPE");
        assert_eq!(IngestError::InvalidPath("x".into()).code(), "INVALID_PATH");
    }

    #[test]
    fn only_storage_and_metadata_abort_batch() {
        assert!(IngestError::StorageWriteFailed("x".into()).aborts_batch());
        assert!(IngestError::MetadataWriteFailed("x".into()).aborts_batch());
        assert!(!IngestError::VectorWriteFailed("x".into()).aborts_batch());
        assert!(!IngestError::ExtractFailed("x".into()).aborts_batch());
    }
}
