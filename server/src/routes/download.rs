//! `GET /api/download?path=<relative_uri>` (§6, §8 P8): rejects any path
//! escaping the storage root.

use actix_web::{get, web, HttpResponse};
use ingest_core::storage::resolve_download_path;
use serde::Deserialize;

use crate::error::to_response;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct DownloadQuery {
    path: String,
}

#[get("/api/download")]
pub async fn download(query: web::Query<DownloadQuery>, state: web::Data<AppState>) -> HttpResponse {
    let resolved = match resolve_download_path(&state.settings.storage_root, &query.path) {
        Ok(path) => path,
        Err(e) => return to_response(&e),
    };

    match std::fs::read(&resolved) {
        Ok(bytes) => HttpResponse::Ok().content_type("application/octet-stream").body(bytes),
        Err(_) => HttpResponse::NotFound().finish(),
    }
}
