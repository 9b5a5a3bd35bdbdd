//! The ingestion coordinator (§4.H): the per-file driver that classifies,
//! routes, extracts, encodes, copies, and persists, then aggregates a
//! batch-level summary.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::classifier;
use crate::collection::derive_collection;
use crate::config::Settings;
use crate::document_store::DocumentStore;
use crate::error::IngestError;
use crate::extractors::text::TextExtractor;
use crate::pipeline::Pipeline;
use crate::storage;
use crate::types::{BatchResult, EmbeddingRecord, FileInput, FileRecord, Modality};
use crate::vector_store::VectorStore;

const MEDIA_COLLECTION: &str = "media_assets";

/// Signals a batch should stop before its next file (§5 cancellation).
#[derive(Default)]
pub struct CancellationToken(AtomicBool);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Deterministic `file_id`: SHA-256 of `(original_name || size_bytes ||
/// first 1 MiB of content)` (§4.F).
pub fn compute_file_id(original_name: &str, size_bytes: u64, first_mib: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(original_name.as_bytes());
    hasher.update(size_bytes.to_le_bytes());
    hasher.update(first_mib);
    format!("{:x}", hasher.finalize())
}

pub struct IngestionCoordinator<'a> {
    settings: &'a Settings,
    pipeline: &'a Pipeline<'a>,
    document_store: &'a dyn DocumentStore,
    vector_store: &'a dyn VectorStore,
    /// Serializes the embedding writer's delete-then-insert per `file_id`
    /// (§5 shared-resource policy).
    file_locks: Mutex<HashSet<String>>,
}

impl<'a> IngestionCoordinator<'a> {
    pub fn new(
        settings: &'a Settings,
        pipeline: &'a Pipeline<'a>,
        document_store: &'a dyn DocumentStore,
        vector_store: &'a dyn VectorStore,
    ) -> Self {
        Self { settings, pipeline, document_store, vector_store, file_locks: Mutex::new(HashSet::new()) }
    }

    /// `process_batch(files[]) → report` (§4.H). Files are processed
    /// sequentially within one batch (§5); `cancellation` is checked before
    /// each file starts.
    pub fn process_batch(&self, files: &[FileInput], cancellation: Option<&CancellationToken>) -> BatchResult {
        let mut report = BatchResult::default();
        report.total_files = files.len();

        for file in files {
            if cancellation.is_some_and(|c| c.is_cancelled()) {
                break;
            }

            match self.process_one(file) {
                Ok(result) => {
                    if result.modality.is_media() {
                        report.media_count += 1;
                    } else {
                        report.text_count += 1;
                    }
                    report.results.push(result);
                }
                Err(batch_abort) => {
                    report.errors.push(batch_abort.to_string());
                    break;
                }
            }
        }

        report
    }

    fn process_one(&self, file: &FileInput) -> Result<crate::types::FileResult, IngestError> {
        let mut errors: Vec<String> = Vec::new();

        // file_id only depends on the raw bytes, so it's computed up front
        // (rather than after storage/pipeline work) both to tag every log
        // line below and to let the storage step recognize a re-ingest of
        // the same file (§4.F, §3 "storage_uri set once").
        let raw_bytes = std::fs::read(&file.original_path).unwrap_or_default();
        let first_mib = &raw_bytes[..raw_bytes.len().min(1024 * 1024)];
        let file_id = compute_file_id(&file.original_name, file.size_bytes, first_mib);

        // Step 1: classify.
        let coarse_modality = classifier::classify_modality(&file.original_path);
        tracing::info!(file_id = %file_id, modality = %coarse_modality.as_str(), "classified file");

        let extracted_text = if coarse_modality == Modality::Text {
            let outcome = TextExtractor::extract(&file.original_path);
            if let Some(err) = &outcome.error {
                tracing::warn!(file_id = %file_id, modality = %coarse_modality.as_str(), error = %err, "text extraction failed");
                errors.push(err.clone());
            }
            outcome.payload.unwrap_or_default()
        } else {
            String::new()
        };

        let classification = classifier::classify(&file.original_path, Some(&extracted_text));

        // Step 2/3: route and encode, under the per-modality soft timeout
        // (§5). The coordinator runs one file at a time with no preemption
        // available, so the budget is checked after the call returns rather
        // than used to abort mid-encode; exceeding it is treated exactly
        // like an extractor failure (§5, §7 EXTRACT_FAILED).
        let timeout = if classification.modality.is_media() {
            Duration::from_secs(self.settings.timeouts.media_secs)
        } else {
            Duration::from_secs(self.settings.timeouts.text_secs)
        };
        let started = Instant::now();
        let mut pipeline_output = self.pipeline.encode_path(&file.original_path, classification.modality, Some(&extracted_text));
        if started.elapsed() > timeout {
            tracing::error!(file_id = %file_id, modality = %classification.modality.as_str(), timeout = ?timeout, "pipeline exceeded soft timeout");
            errors.push(IngestError::ExtractFailed(format!("exceeded soft timeout of {timeout:?}")).to_string());
            pipeline_output.embedding.clear();
            pipeline_output.embeddings_chunks.clear();
            pipeline_output.descriptive_text.clear();
            pipeline_output.clip_generated = false;
        } else {
            tracing::info!(file_id = %file_id, modality = %classification.modality.as_str(), "encoded file");
        }
        errors.extend(pipeline_output.errors.iter().cloned());

        let collection = if classification.is_media {
            MEDIA_COLLECTION.to_string()
        } else {
            derive_collection(&pipeline_output.descriptive_text)
        };

        // An extractor failure that also defeats captioning/transcription
        // falls back to `modality + dimensions`, or finally the original
        // file name, rather than aborting the file (§4.H partial failure
        // policy).
        let descriptive_text = if !pipeline_output.descriptive_text.is_empty() {
            pipeline_output.descriptive_text.clone()
        } else {
            file.original_name.clone()
        };

        // Step 4: copy into storage, unless a prior ingest of this exact
        // file_id already has a storage_uri — re-copying would suffix the
        // destination name and silently change storage_uri on every
        // re-ingest (§3 "storage_uri set once").
        let existing_storage_uri = self.document_store.get(&file_id).and_then(|r| r.storage_uri);
        let storage_uri = if let Some(uri) = existing_storage_uri {
            tracing::info!(file_id = %file_id, modality = %classification.modality.as_str(), storage_uri = %uri, "reusing storage_uri from prior ingest");
            Some(uri)
        } else {
            let modality_dir = classification.modality.as_str();
            let storage_result = storage::copy_into_storage(
                &self.settings.storage_root,
                &file.original_path,
                modality_dir,
                &collection,
                &file.original_name,
            );
            match storage_result {
                Ok(uri) => {
                    tracing::info!(file_id = %file_id, modality = %classification.modality.as_str(), storage_uri = %uri, "copied into storage");
                    Some(uri)
                }
                Err(e) => {
                    tracing::warn!(file_id = %file_id, modality = %classification.modality.as_str(), error = %e, "storage copy failed");
                    errors.push(e.to_string());
                    None
                }
            }
        };

        // Step 5: upsert metadata.
        let mut extra = pipeline_output.extra.clone();
        if pipeline_output.clip_generated {
            extra.insert("clip_generated".to_string(), serde_json::json!(true));
        }
        if !pipeline_output.embeddings_chunks.is_empty() {
            extra.insert("chunk_count".to_string(), serde_json::json!(pipeline_output.embeddings_chunks.len()));
        }

        let now = Utc::now();
        let record = FileRecord {
            file_id: file_id.clone(),
            original_name: file.original_name.clone(),
            storage_uri: storage_uri.clone(),
            modality: classification.modality,
            collection: collection.clone(),
            descriptive_text: descriptive_text.clone(),
            summary_preview: FileRecord::preview_of(&descriptive_text),
            size_bytes: file.size_bytes,
            extra,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.document_store.upsert(record) {
            tracing::warn!(file_id = %file_id, modality = %classification.modality.as_str(), error = %e, "metadata upsert failed");
            if e.aborts_batch() {
                return Err(e);
            }
            errors.push(e.to_string());
        } else {
            tracing::info!(file_id = %file_id, modality = %classification.modality.as_str(), "metadata upserted");
        }

        // Step 6: upsert embeddings, serialized per file_id (§5).
        let embedding_count = if !pipeline_output.embedding.is_empty() {
            self.upsert_embeddings(
                &file_id,
                &file.original_name,
                &classification,
                &collection,
                &descriptive_text,
                &storage_uri,
                &pipeline_output,
            )
        } else {
            tracing::warn!(file_id = %file_id, modality = %classification.modality.as_str(), "no embedding produced");
            errors.push(IngestError::EncodeFailed("no embedding produced".to_string()).to_string());
            0
        };

        Ok(crate::types::FileResult {
            file_id,
            modality: classification.modality,
            collection,
            descriptive_text,
            storage_uri,
            embedding_count,
            errors,
        })
    }

    fn upsert_embeddings(
        &self,
        file_id: &str,
        original_name: &str,
        classification: &classifier::ClassificationReport,
        collection: &str,
        descriptive_text: &str,
        storage_uri: &Option<String>,
        pipeline_output: &crate::pipeline::PipelineOutput,
    ) -> usize {
        if !self.vector_store.available() {
            return 0;
        }

        // Hold the per-file_id lock for the whole delete-then-insert
        // sequence (§5: two concurrent re-ingests of the same file_id
        // would otherwise race).
        let _guard = self.lock_file(file_id);

        let mut metadata: HashMap<String, String> = HashMap::new();
        metadata.insert("original_name".to_string(), original_name.to_string());
        if let Some(uri) = storage_uri {
            metadata.insert("storage_uri".to_string(), uri.clone());
        }
        metadata.insert("type".to_string(), "file".to_string());

        let mut entries = vec![EmbeddingRecord {
            emb_id: file_id.to_string(),
            file_id: file_id.to_string(),
            chunk_index: None,
            modality: classification.modality,
            collection: collection.to_string(),
            text: descriptive_text.to_string(),
            embedding: pipeline_output.embedding.clone(),
            metadata,
        }];

        for chunk in &pipeline_output.embeddings_chunks {
            let mut chunk_metadata: HashMap<String, String> = HashMap::new();
            chunk_metadata.insert("original_name".to_string(), original_name.to_string());
            if let Some(uri) = storage_uri {
                chunk_metadata.insert("storage_uri".to_string(), uri.clone());
            }
            chunk_metadata.insert("type".to_string(), "chunk".to_string());

            entries.push(EmbeddingRecord {
                emb_id: format!("{file_id}:c{}", chunk.chunk_index),
                file_id: file_id.to_string(),
                chunk_index: Some(chunk.chunk_index),
                modality: classification.modality,
                collection: collection.to_string(),
                text: chunk.text.clone(),
                embedding: chunk.embedding.clone(),
                metadata: chunk_metadata,
            });
        }

        let count = entries.len();
        tracing::info!(file_id = %file_id, modality = %classification.modality.as_str(), count, "upserted embeddings");
        self.vector_store.upsert_embeddings(file_id, entries);
        count
    }

    fn lock_file(&self, file_id: &str) -> FileLockGuard<'_, 'a> {
        loop {
            let mut locks = self.file_locks.lock();
            if !locks.contains(file_id) {
                locks.insert(file_id.to_string());
                return FileLockGuard { coordinator: self, file_id: file_id.to_string() };
            }
            drop(locks);
            std::thread::yield_now();
        }
    }
}

struct FileLockGuard<'b, 'a> {
    coordinator: &'b IngestionCoordinator<'a>,
    file_id: String,
}

impl Drop for FileLockGuard<'_, '_> {
    fn drop(&mut self) {
        self.coordinator.file_locks.lock().remove(&self.file_id);
    }
}
