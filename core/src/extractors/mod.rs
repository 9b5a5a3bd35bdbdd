//! Per-modality extractors (§4.A).
//!
//! Every extractor returns a payload plus an optional error string; none of
//! them raise across the component boundary — a failed extraction degrades
//! to an empty payload that the caller (the pipeline) must handle.

pub mod audio;
pub mod image;
pub mod text;
pub mod video;

use std::path::Path;

/// Outcome of an extraction step. `error` is `Some` only on failure; the
/// payload fields are left at their zero value in that case.
#[derive(Clone, Debug, Default)]
pub struct ExtractionOutcome<T> {
    pub payload: Option<T>,
    pub error: Option<String>,
}

impl<T> ExtractionOutcome<T> {
    pub fn ok(payload: T) -> Self {
        Self { payload: Some(payload), error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { payload: None, error: Some(error.into()) }
    }
}

pub const TEXT_EXTS: &[&str] = &[
    "pdf", "docx", "txt", "md", "log", "json", "csv", "xml", "yaml", "yml", "html", "htm", "ini", "cfg", "conf",
];

pub fn extension_of(path: &Path) -> String {
    path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase()
}
