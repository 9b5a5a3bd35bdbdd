//! Maps the core's error taxonomy onto the §6 HTTP error envelope
//! (`{ success: false, error, code }`).

use actix_web::HttpResponse;
use ingest_core::IngestError;
use serde::Serialize;

#[derive(Serialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
    pub code: String,
}

pub fn to_response(err: &IngestError) -> HttpResponse {
    let body = ApiError { success: false, error: err.to_string(), code: err.code().to_string() };
    match err {
        IngestError::InvalidPath(_) => HttpResponse::BadRequest().json(body),
        IngestError::UnsupportedType(_) => HttpResponse::BadRequest().json(body),
        IngestError::StorageWriteFailed(_) | IngestError::MetadataWriteFailed(_) => HttpResponse::InternalServerError().json(body),
        IngestError::ExtractFailed(_) | IngestError::EncodeFailed(_) | IngestError::VectorWriteFailed(_) | IngestError::QueryFailed(_) => {
            HttpResponse::InternalServerError().json(body)
        }
    }
}
