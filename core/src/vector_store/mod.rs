//! The embedding writer (§4.G) and its default in-process backend.
//!
//! Grounded on `muhammad-fiaz-OpenDB`'s `VectorManager`: a `RwLock`-guarded
//! cache of `(id, embedding)` pairs searched by brute force. That store
//! ranks by Euclidean distance; here, since every vector is L2-normalized
//! (§3), cosine similarity reduces to a plain dot product, so the search
//! loop is a dot-product max-heap rather than a distance min-heap.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::types::{EmbeddingRecord, Modality};

pub struct VectorHit {
    pub record: EmbeddingRecord,
    pub similarity: f32,
}

pub trait VectorStore: Send + Sync {
    /// Whether the store is reachable. When `false`, the embedding writer
    /// is a no-op and semantic search must fall back to metadata (§4.G).
    fn available(&self) -> bool;

    /// Deletes every row for `file_id`, then inserts `entries` — the
    /// delete-then-insert sequence that keeps a file's chunk set atomic
    /// (§4.G). Must be serialized per `file_id` (§5); callers are expected
    /// to hold a per-`file_id` lock before calling this.
    fn upsert_embeddings(&self, file_id: &str, entries: Vec<EmbeddingRecord>);

    fn query(&self, query_vector: &[f32], top_n: usize, modality_filter: Option<Modality>) -> Vec<VectorHit>;
}

#[derive(Default)]
pub struct InMemoryVectorStore {
    rows: RwLock<HashMap<String, EmbeddingRecord>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

impl VectorStore for InMemoryVectorStore {
    fn available(&self) -> bool {
        true
    }

    fn upsert_embeddings(&self, file_id: &str, entries: Vec<EmbeddingRecord>) {
        let mut rows = self.rows.write();
        rows.retain(|_, row| row.file_id != file_id);
        for entry in entries {
            rows.insert(entry.emb_id.clone(), entry);
        }
    }

    fn query(&self, query_vector: &[f32], top_n: usize, modality_filter: Option<Modality>) -> Vec<VectorHit> {
        let rows = self.rows.read();
        let mut hits: Vec<VectorHit> = rows
            .values()
            .filter(|row| modality_filter.map_or(true, |m| row.modality == m))
            .map(|row| VectorHit { record: row.clone(), similarity: dot(query_vector, &row.embedding) })
            .collect();

        hits.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap().then_with(|| a.record.file_id.cmp(&b.record.file_id)));
        hits.truncate(top_n);
        hits
    }
}

/// A vector store that reports itself unavailable, used to exercise the
/// metadata fallback path (§4.I) without an environment flag.
#[derive(Default)]
pub struct UnavailableVectorStore;

impl VectorStore for UnavailableVectorStore {
    fn available(&self) -> bool {
        false
    }

    fn upsert_embeddings(&self, _file_id: &str, _entries: Vec<EmbeddingRecord>) {}

    fn query(&self, _query_vector: &[f32], _top_n: usize, _modality_filter: Option<Modality>) -> Vec<VectorHit> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn row(emb_id: &str, file_id: &str, embedding: Vec<f32>) -> EmbeddingRecord {
        EmbeddingRecord {
            emb_id: emb_id.to_string(),
            file_id: file_id.to_string(),
            chunk_index: None,
            modality: Modality::Text,
            collection: "documents".to_string(),
            text: "sample".to_string(),
            embedding,
            metadata: Map::new(),
        }
    }

    #[test]
    fn query_ranks_by_dot_product_descending() {
        let store = InMemoryVectorStore::new();
        store.upsert_embeddings("f1", vec![row("f1", "f1", vec![1.0, 0.0])]);
        store.upsert_embeddings("f2", vec![row("f2", "f2", vec![0.0, 1.0])]);

        let hits = store.query(&[1.0, 0.0], 5, None);
        assert_eq!(hits[0].record.file_id, "f1");
        assert!(hits[0].similarity > hits[1].similarity);
    }

    #[test]
    fn reupsert_replaces_the_whole_chunk_set_atomically() {
        let store = InMemoryVectorStore::new();
        store.upsert_embeddings(
            "f1",
            vec![row("f1", "f1", vec![1.0, 0.0]), row("f1:c0", "f1", vec![0.9, 0.1])],
        );
        store.upsert_embeddings("f1", vec![row("f1", "f1", vec![0.0, 1.0])]);

        let hits = store.query(&[0.0, 1.0], 5, None);
        let f1_hits: Vec<_> = hits.iter().filter(|h| h.record.file_id == "f1").collect();
        assert_eq!(f1_hits.len(), 1);
    }

    #[test]
    fn unavailable_store_reports_itself_and_returns_nothing() {
        let store = UnavailableVectorStore;
        assert!(!store.available());
        assert!(store.query(&[1.0, 0.0], 5, None).is_empty());
    }
}
