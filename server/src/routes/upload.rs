//! `POST /api/upload` (§6): multipart upload, ingested through the
//! coordinator, responding with the current `databaseState`.

use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use futures_util::TryStreamExt;
use ingest_core::coordinator::IngestionCoordinator;
use ingest_core::pipeline::Pipeline;
use ingest_core::types::FileInput;
use serde::Serialize;
use std::io::Write;

use super::db_state::{build_database_state, DatabaseState};
use crate::state::AppState;

#[derive(Serialize)]
struct UploadResponse {
    success: bool,
    message: String,
    #[serde(rename = "databaseState")]
    database_state: DatabaseState,
}

#[derive(Serialize)]
struct UploadError {
    success: bool,
    error: String,
    code: String,
}

#[post("/api/upload")]
pub async fn upload(mut payload: Multipart, state: web::Data<AppState>) -> HttpResponse {
    let mut files: Vec<FileInput> = Vec::new();

    while let Ok(Some(mut field)) = payload.try_next().await {
        let Some(content_disposition) = field.content_disposition().cloned() else { continue };
        let field_name = content_disposition.get_name().unwrap_or("").to_string();
        if field_name != "files" {
            // Drain non-file fields (e.g. the optional `metadata` string)
            // without persisting them.
            while field.try_next().await.ok().flatten().is_some() {}
            continue;
        }

        let original_name = content_disposition.get_filename().unwrap_or("upload").to_string();

        let mut temp_file = match tempfile::NamedTempFile::new() {
            Ok(f) => f,
            Err(e) => {
                return HttpResponse::InternalServerError().json(UploadError {
                    success: false,
                    error: format!("failed to stage upload: {e}"),
                    code: "STORAGE_WRITE_FAILED".to_string(),
                })
            }
        };

        let mut size_bytes: u64 = 0;
        while let Ok(Some(chunk)) = field.try_next().await {
            size_bytes += chunk.len() as u64;
            if temp_file.write_all(&chunk).is_err() {
                return HttpResponse::InternalServerError().json(UploadError {
                    success: false,
                    error: "failed to persist uploaded bytes".to_string(),
                    code: "STORAGE_WRITE_FAILED".to_string(),
                });
            }
        }

        let (_file, path) = match temp_file.keep() {
            Ok(kept) => kept,
            Err(e) => {
                return HttpResponse::InternalServerError().json(UploadError {
                    success: false,
                    error: format!("failed to finalize upload: {e}"),
                    code: "STORAGE_WRITE_FAILED".to_string(),
                })
            }
        };

        files.push(FileInput { original_path: path, original_name, declared_mime: None, size_bytes });
    }

    if files.is_empty() {
        return HttpResponse::BadRequest().json(UploadError {
            success: false,
            error: "no files were uploaded".to_string(),
            code: "UNSUPPORTED_TYPE".to_string(),
        });
    }

    let pipeline = Pipeline::new(
        &state.encoder,
        &state.encoder,
        &state.transcriber,
        state.settings.text.clone(),
        state.settings.video.clone(),
    );
    let coordinator = IngestionCoordinator::new(&state.settings, &pipeline, state.document_store.as_ref(), state.vector_store.as_ref());

    let report = coordinator.process_batch(&files, None);

    for file in &files {
        let _ = std::fs::remove_file(&file.original_path);
    }

    HttpResponse::Ok().json(UploadResponse {
        success: true,
        message: format!("ingested {} of {} files", report.results.len(), report.total_files),
        database_state: build_database_state(state.document_store.as_ref(), &state.settings),
    })
}
