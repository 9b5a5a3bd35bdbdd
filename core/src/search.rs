//! Semantic search (§4.I): vector path when the store is available,
//! metadata-substring fallback otherwise.

use serde::Serialize;

use crate::document_store::DocumentStore;
use crate::encoders::TextEncoder;
use crate::error::IngestError;
use crate::types::Modality;
use crate::vector_store::VectorStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    Semantic,
    Metadata,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    pub path: Option<String>,
    pub modality: Modality,
    pub similarity: f32,
    pub description: String,
    pub metadata: serde_json::Value,
    pub is_chunk: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub source: SearchSource,
}

pub struct SemanticSearch<'a> {
    text_encoder: &'a dyn TextEncoder,
    document_store: &'a dyn DocumentStore,
    vector_store: &'a dyn VectorStore,
}

impl<'a> SemanticSearch<'a> {
    pub fn new(text_encoder: &'a dyn TextEncoder, document_store: &'a dyn DocumentStore, vector_store: &'a dyn VectorStore) -> Self {
        Self { text_encoder, document_store, vector_store }
    }

    pub fn search(&self, query: &str, k: usize, modality_filter: Option<Modality>) -> Result<SearchResponse, IngestError> {
        if query.trim().is_empty() {
            return Err(IngestError::QueryFailed("empty query".to_string()));
        }

        if self.vector_store.available() {
            Ok(self.search_semantic(query, k, modality_filter))
        } else {
            Ok(self.search_fallback(query, k))
        }
    }

    /// Vector path (§4.I step 1): query `3k` candidates, dedupe by
    /// `file_id` keeping the best-scoring row per file, then cap at `k`.
    fn search_semantic(&self, query: &str, k: usize, modality_filter: Option<Modality>) -> SearchResponse {
        let query_vector = self.text_encoder.encode_text(query);
        let candidates = self.vector_store.query(&query_vector, k.saturating_mul(3).max(k), modality_filter);

        let mut best_per_file: std::collections::HashMap<String, (crate::vector_store::VectorHit, bool)> = std::collections::HashMap::new();
        for hit in candidates {
            let is_chunk = hit.record.chunk_index.is_some();
            let entry = best_per_file.entry(hit.record.file_id.clone());
            entry
                .and_modify(|existing| {
                    if hit.similarity > existing.0.similarity {
                        *existing = (clone_hit(&hit), is_chunk);
                    }
                })
                .or_insert_with(|| (hit, is_chunk));
        }

        let mut ranked: Vec<_> = best_per_file.into_values().collect();
        ranked.sort_by(|a, b| b.0.similarity.partial_cmp(&a.0.similarity).unwrap().then_with(|| a.0.record.file_id.cmp(&b.0.record.file_id)));
        ranked.truncate(k);

        let results = ranked
            .into_iter()
            .map(|(hit, is_chunk)| {
                let metadata_record = self.document_store.get(&hit.record.file_id);
                // The file's descriptive_text, not the winning row's own
                // text, since a chunk can win the per-file dedupe above and
                // its `text` is only that chunk's slice (§4.I step 3).
                let description = metadata_record.as_ref().map(|r| r.descriptive_text.clone()).unwrap_or_else(|| hit.record.text.clone());
                SearchHit {
                    id: hit.record.file_id.clone(),
                    name: metadata_record.as_ref().map(|r| r.original_name.clone()).unwrap_or_default(),
                    path: metadata_record.as_ref().and_then(|r| r.storage_uri.clone()),
                    modality: hit.record.modality,
                    similarity: hit.similarity,
                    description,
                    metadata: metadata_record.map(|r| serde_json::to_value(r.extra).unwrap_or_default()).unwrap_or_default(),
                    is_chunk,
                }
            })
            .collect();

        SearchResponse { results, source: SearchSource::Semantic }
    }

    /// Metadata-substring fallback (§4.I step 2): a pure function of the
    /// current metadata table (§8 P7).
    fn search_fallback(&self, query: &str, k: usize) -> SearchResponse {
        let terms: Vec<String> = query
            .split(|c: char| !c.is_alphanumeric())
            .map(|t| t.to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        let hits = self.document_store.search_by_terms(&terms, k);
        let max_terms = terms.len().max(1) as f32;

        let results = hits
            .into_iter()
            .map(|(record, score)| SearchHit {
                id: record.file_id.clone(),
                name: record.original_name.clone(),
                path: record.storage_uri.clone(),
                modality: record.modality,
                similarity: score as f32 / max_terms,
                description: record.descriptive_text.clone(),
                metadata: serde_json::to_value(record.extra).unwrap_or_default(),
                is_chunk: false,
            })
            .collect();

        SearchResponse { results, source: SearchSource::Metadata }
    }
}

fn clone_hit(hit: &crate::vector_store::VectorHit) -> crate::vector_store::VectorHit {
    crate::vector_store::VectorHit { record: hit.record.clone(), similarity: hit.similarity }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::InMemoryDocumentStore;
    use crate::encoders::hashing::HashEncoder;
    use crate::types::{EmbeddingRecord, FileRecord};
    use crate::vector_store::{InMemoryVectorStore, UnavailableVectorStore};
    use chrono::Utc;
    use std::collections::HashMap;

    fn seed_file(doc_store: &InMemoryDocumentStore, vec_store: &InMemoryVectorStore, encoder: &HashEncoder, file_id: &str, text: &str) {
        doc_store
            .upsert(FileRecord {
                file_id: file_id.to_string(),
                original_name: format!("{file_id}.txt"),
                storage_uri: Some(format!("text/documents/{file_id}.txt")),
                modality: Modality::Text,
                collection: "documents".to_string(),
                descriptive_text: text.to_string(),
                summary_preview: FileRecord::preview_of(text),
                size_bytes: text.len() as u64,
                extra: HashMap::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .unwrap();

        vec_store.upsert_embeddings(
            file_id,
            vec![EmbeddingRecord {
                emb_id: file_id.to_string(),
                file_id: file_id.to_string(),
                chunk_index: None,
                modality: Modality::Text,
                collection: "documents".to_string(),
                text: text.to_string(),
                embedding: encoder.encode_text(text),
                metadata: HashMap::new(),
            }],
        );
    }

    #[test]
    fn semantic_search_returns_the_matching_row_as_top_hit() {
        let encoder = HashEncoder::new();
        let doc_store = InMemoryDocumentStore::new();
        let vec_store = InMemoryVectorStore::new();
        seed_file(&doc_store, &vec_store, &encoder, "paper", "a new caching scheme for distributed systems");
        seed_file(&doc_store, &vec_store, &encoder, "other", "an unrelated recipe for bread");

        let search = SemanticSearch::new(&encoder, &doc_store, &vec_store);
        let response = search.search("a new caching scheme for distributed systems", 1, None).unwrap();

        assert_eq!(response.source, SearchSource::Semantic);
        assert_eq!(response.results[0].id, "paper");
        assert!(response.results[0].similarity >= 0.9);
    }

    #[test]
    fn fallback_search_is_deterministic_given_the_same_table() {
        let encoder = HashEncoder::new();
        let doc_store = InMemoryDocumentStore::new();
        let vec_store = InMemoryVectorStore::new();
        seed_file(&doc_store, &vec_store, &encoder, "paper", "we propose a new caching scheme");

        let unavailable = UnavailableVectorStore;
        let search = SemanticSearch::new(&encoder, &doc_store, &unavailable);
        let first = search.search("caching scheme", 5, None).unwrap();
        let second = search.search("caching scheme", 5, None).unwrap();

        assert_eq!(first.source, SearchSource::Metadata);
        assert_eq!(first.results.len(), second.results.len());
        assert_eq!(first.results[0].id, second.results[0].id);
    }

    #[test]
    fn description_is_the_files_descriptive_text_even_when_a_chunk_wins_the_dedupe() {
        let encoder = HashEncoder::new();
        let doc_store = InMemoryDocumentStore::new();
        let vec_store = InMemoryVectorStore::new();

        let file_id = "paper";
        let descriptive_text = "a survey of distributed caching schemes";
        let chunk_text = "section 3: cache eviction policies";
        doc_store
            .upsert(FileRecord {
                file_id: file_id.to_string(),
                original_name: "paper.txt".to_string(),
                storage_uri: Some("text/documents/paper.txt".to_string()),
                modality: Modality::Text,
                collection: "documents".to_string(),
                descriptive_text: descriptive_text.to_string(),
                summary_preview: FileRecord::preview_of(descriptive_text),
                size_bytes: descriptive_text.len() as u64,
                extra: HashMap::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .unwrap();

        // Only the chunk row is indexed, so it's the one that wins the
        // per-file dedupe in search_semantic.
        vec_store.upsert_embeddings(
            file_id,
            vec![EmbeddingRecord {
                emb_id: format!("{file_id}:c0"),
                file_id: file_id.to_string(),
                chunk_index: Some(0),
                modality: Modality::Text,
                collection: "documents".to_string(),
                text: chunk_text.to_string(),
                embedding: encoder.encode_text(chunk_text),
                metadata: HashMap::new(),
            }],
        );

        let search = SemanticSearch::new(&encoder, &doc_store, &vec_store);
        let response = search.search(chunk_text, 1, None).unwrap();

        assert_eq!(response.results[0].id, file_id);
        assert!(response.results[0].is_chunk);
        assert_eq!(response.results[0].description, descriptive_text);
    }

    #[test]
    fn empty_query_fails_rather_than_returning_everything() {
        let encoder = HashEncoder::new();
        let doc_store = InMemoryDocumentStore::new();
        let vec_store = InMemoryVectorStore::new();
        let search = SemanticSearch::new(&encoder, &doc_store, &vec_store);
        assert!(search.search("   ", 5, None).is_err());
    }
}
