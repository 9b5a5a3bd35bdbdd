//! `GET /api/database/state` and `GET /api/visualization` (§6).

use actix_web::{get, web, HttpResponse};
use ingest_core::config::Settings;
use ingest_core::document_store::DocumentStore;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::state::AppState;

#[derive(Serialize, Clone)]
pub struct DatabaseState {
    pub tables: Vec<String>,
    pub collections: Vec<String>,
    #[serde(rename = "mediaDirectories")]
    pub media_directories: Vec<String>,
}

/// The SQL branch is disabled downstream (§4.D), so `tables` is always
/// empty; it stays in the response shape for forward compatibility.
pub fn build_database_state(document_store: &dyn DocumentStore, _settings: &Settings) -> DatabaseState {
    let records = document_store.all();
    let mut collections: Vec<String> = records.iter().map(|r| r.collection.clone()).collect();
    collections.sort();
    collections.dedup();

    let media_directories: Vec<String> = records
        .iter()
        .filter(|r| r.modality.is_media())
        .filter_map(|r| r.storage_uri.clone())
        .collect();

    DatabaseState { tables: Vec::new(), collections, media_directories }
}

#[get("/api/database/state")]
pub async fn database_state(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(build_database_state(state.document_store.as_ref(), &state.settings))
}

#[derive(Serialize)]
pub struct FolderNode {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FolderNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "mimeType")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "storagePath")]
    pub storage_path: Option<String>,
}

/// Builds the folder tree from document-store records, grouped by
/// collection. Falls back to walking the physical storage tree when the
/// document store has no records at all (§6).
#[get("/api/visualization")]
pub async fn visualization(state: web::Data<AppState>) -> HttpResponse {
    let records = state.document_store.all();

    if records.is_empty() {
        return HttpResponse::Ok().json(tree_from_storage_root(&state.settings.storage_root));
    }

    let mut by_collection: BTreeMap<String, Vec<FolderNode>> = BTreeMap::new();
    for record in &records {
        let node = FolderNode {
            name: record.original_name.clone(),
            node_type: "file",
            children: Vec::new(),
            size: Some(record.size_bytes),
            mime_type: None,
            storage_path: record.storage_uri.clone(),
        };
        by_collection.entry(record.collection.clone()).or_default().push(node);
    }

    let children = by_collection
        .into_iter()
        .map(|(collection, files)| FolderNode {
            name: collection,
            node_type: "folder",
            children: files,
            size: None,
            mime_type: None,
            storage_path: None,
        })
        .collect();

    HttpResponse::Ok().json(FolderNode {
        name: "root".to_string(),
        node_type: "folder",
        children,
        size: None,
        mime_type: None,
        storage_path: None,
    })
}

fn tree_from_storage_root(root: &std::path::Path) -> FolderNode {
    fn walk(path: &std::path::Path, name: String) -> FolderNode {
        if path.is_dir() {
            let children = std::fs::read_dir(path)
                .map(|entries| {
                    entries
                        .filter_map(Result::ok)
                        .map(|entry| walk(&entry.path(), entry.file_name().to_string_lossy().to_string()))
                        .collect()
                })
                .unwrap_or_default();
            FolderNode { name, node_type: "folder", children, size: None, mime_type: None, storage_path: None }
        } else {
            let size = std::fs::metadata(path).map(|m| m.len()).ok();
            FolderNode { name, node_type: "file", children: Vec::new(), size, mime_type: None, storage_path: None }
        }
    }

    if root.exists() {
        walk(root, "root".to_string())
    } else {
        FolderNode { name: "root".to_string(), node_type: "folder", children: Vec::new(), size: None, mime_type: None, storage_path: None }
    }
}
