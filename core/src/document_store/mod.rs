//! The metadata writer (§4.F) and its default in-process backend.
//!
//! The document store is an external collaborator by contract (§1): any
//! `collection → documents` mapping with `insert`/`update`/`find` by key and
//! by substring satisfies it. [`InMemoryDocumentStore`] is the concrete
//! default used whenever `MONGO_URI`/`MONGO_DB` are unset (§6) — a genuine
//! embedded store, not a test double, grounded on the `RwLock`-guarded
//! in-process cache pattern used for the vector side in
//! `muhammad-fiaz-OpenDB`'s `VectorManager`.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;

use crate::error::IngestError;
use crate::types::FileRecord;

pub trait DocumentStore: Send + Sync {
    /// Inserts a new record or merges into an existing one keyed by
    /// `file_id` (§4.F): `extra` is merged key-by-key, `descriptive_text`
    /// and `summary_preview` are replaced, `updated_at` is bumped, and
    /// `file_id`/`original_name`/`size_bytes`/`created_at` are never
    /// overwritten once set.
    fn upsert(&self, record: FileRecord) -> Result<(), IngestError>;

    fn get(&self, file_id: &str) -> Option<FileRecord>;

    fn all(&self) -> Vec<FileRecord>;

    /// Deterministic substring scoring fallback for search (§4.I step 2):
    /// for each record, counts how many of `terms` appear as substrings in
    /// `descriptive_text ∪ summary_preview ∪ original_name`.
    fn search_by_terms(&self, terms: &[String], k: usize) -> Vec<(FileRecord, usize)>;
}

#[derive(Default)]
pub struct InMemoryDocumentStore {
    records: RwLock<HashMap<String, FileRecord>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn upsert(&self, mut record: FileRecord) -> Result<(), IngestError> {
        let mut records = self.records.write();
        if let Some(existing) = records.get(&record.file_id) {
            record.created_at = existing.created_at;
            record.original_name = existing.original_name.clone();
            record.size_bytes = existing.size_bytes;
            let mut merged_extra = existing.extra.clone();
            merged_extra.extend(record.extra.clone());
            record.extra = merged_extra;
        }
        record.updated_at = Utc::now();
        records.insert(record.file_id.clone(), record);
        Ok(())
    }

    fn get(&self, file_id: &str) -> Option<FileRecord> {
        self.records.read().get(file_id).cloned()
    }

    fn all(&self) -> Vec<FileRecord> {
        self.records.read().values().cloned().collect()
    }

    fn search_by_terms(&self, terms: &[String], k: usize) -> Vec<(FileRecord, usize)> {
        let records = self.records.read();
        let mut scored: Vec<(FileRecord, usize)> = records
            .values()
            .filter_map(|record| {
                let haystack = format!(
                    "{} {} {}",
                    record.descriptive_text.to_ascii_lowercase(),
                    record.summary_preview.to_ascii_lowercase(),
                    record.original_name.to_ascii_lowercase()
                );
                let score = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
                (score > 0).then(|| (record.clone(), score))
            })
            .collect();

        // Highest score first; ties break by file_id ascending (§4.I).
        scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.file_id.cmp(&b.0.file_id)));
        scored.truncate(k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn sample_record(file_id: &str, descriptive_text: &str) -> FileRecord {
        FileRecord {
            file_id: file_id.to_string(),
            original_name: format!("{file_id}.txt"),
            storage_uri: None,
            modality: crate::types::Modality::Text,
            collection: "documents".to_string(),
            descriptive_text: descriptive_text.to_string(),
            summary_preview: FileRecord::preview_of(descriptive_text),
            size_bytes: 10,
            extra: Map::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn upsert_then_get_round_trips() {
        let store = InMemoryDocumentStore::new();
        store.upsert(sample_record("f1", "a caching scheme")).unwrap();
        let fetched = store.get("f1").unwrap();
        assert_eq!(fetched.descriptive_text, "a caching scheme");
    }

    #[test]
    fn reupsert_preserves_created_at_and_identity_fields() {
        let store = InMemoryDocumentStore::new();
        store.upsert(sample_record("f1", "first text")).unwrap();
        let first = store.get("f1").unwrap();

        let mut second = sample_record("f1", "second text");
        second.original_name = "renamed.txt".to_string();
        second.size_bytes = 999;
        store.upsert(second).unwrap();

        let after = store.get("f1").unwrap();
        assert_eq!(after.created_at, first.created_at);
        assert_eq!(after.original_name, first.original_name);
        assert_eq!(after.size_bytes, first.size_bytes);
        assert!(after.updated_at >= first.updated_at);
        assert_eq!(after.descriptive_text, "second text");
    }

    #[test]
    fn search_by_terms_ranks_by_match_count_then_file_id() {
        let store = InMemoryDocumentStore::new();
        store.upsert(sample_record("b", "caching scheme paper")).unwrap();
        store.upsert(sample_record("a", "caching scheme paper")).unwrap();
        store.upsert(sample_record("c", "unrelated content")).unwrap();

        let hits = store.search_by_terms(&["caching".to_string(), "scheme".to_string()], 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0.file_id, "a");
        assert_eq!(hits[1].0.file_id, "b");
    }
}
