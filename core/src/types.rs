//! The core data model (§3): files, modalities, file records, and
//! embedding records, plus the per-file/per-batch result shapes returned by
//! the ingestion coordinator.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const EMBEDDING_DIM: usize = 512;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Image,
    Video,
    Audio,
    Text,
    Unknown,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Image => "image",
            Modality::Video => "video",
            Modality::Audio => "audio",
            Modality::Text => "text",
            Modality::Unknown => "unknown",
        }
    }

    pub fn is_media(&self) -> bool {
        matches!(self, Modality::Image | Modality::Video | Modality::Audio)
    }

    /// Parses the `as_str()` spelling back into a `Modality`, used to accept
    /// an optional `modality` filter on the search endpoints (§4.I).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(Modality::Image),
            "video" => Some(Modality::Video),
            "audio" => Some(Modality::Audio),
            "text" => Some(Modality::Text),
            "unknown" => Some(Modality::Unknown),
            _ => None,
        }
    }
}

/// An upload prior to any processing. Immutable.
#[derive(Clone, Debug)]
pub struct FileInput {
    pub original_path: std::path::PathBuf,
    pub original_name: String,
    pub declared_mime: Option<String>,
    pub size_bytes: u64,
}

/// The embedding row type discriminator (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingKind {
    File,
    Chunk,
}

/// A durable metadata record, keyed by `file_id` (§3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_id: String,
    pub original_name: String,
    pub storage_uri: Option<String>,
    pub modality: Modality,
    pub collection: String,
    pub descriptive_text: String,
    pub summary_preview: String,
    pub size_bytes: u64,
    pub extra: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    /// Builds `summary_preview` from `descriptive_text`, honoring the
    /// ≤ 500-char invariant (§3).
    pub fn preview_of(descriptive_text: &str) -> String {
        let mut preview: String = descriptive_text.chars().take(500).collect();
        preview.truncate(preview.trim_end().len());
        preview
    }
}

/// A vector-store row (§3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub emb_id: String,
    pub file_id: String,
    pub chunk_index: Option<usize>,
    pub modality: Modality,
    pub collection: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: HashMap<String, String>,
}

impl EmbeddingRecord {
    pub fn kind(&self) -> EmbeddingKind {
        if self.chunk_index.is_some() {
            EmbeddingKind::Chunk
        } else {
            EmbeddingKind::File
        }
    }
}

/// Per-file outcome returned from `process_batch` (§4.H).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileResult {
    pub file_id: String,
    pub modality: Modality,
    pub collection: String,
    pub descriptive_text: String,
    pub storage_uri: Option<String>,
    pub embedding_count: usize,
    pub errors: Vec<String>,
}

/// Batch-level summary (§4.H).
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct BatchResult {
    pub total_files: usize,
    pub media_count: usize,
    pub text_count: usize,
    pub results: Vec<FileResult>,
    pub errors: Vec<String>,
}
