//! `GET /api/search?q=…` and `POST /api/search/semantic` (§6).

use actix_web::{get, post, web, HttpResponse};
use ingest_core::search::SemanticSearch;
use ingest_core::types::Modality;
use serde::{Deserialize, Serialize};

use crate::error::to_response;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    q: String,
    k: Option<usize>,
    modality: Option<String>,
}

#[derive(Deserialize)]
pub struct SemanticSearchBody {
    query: String,
    k: Option<usize>,
    modality: Option<String>,
}

#[derive(Serialize)]
struct SearchResponseBody {
    success: bool,
    results: Vec<ResultItem>,
    source: &'static str,
}

#[derive(Serialize)]
struct ResultItem {
    id: String,
    text: String,
    modality: String,
    similarity: f32,
    metadata: serde_json::Value,
}

fn run_search(state: &AppState, query: &str, k: usize, modality_filter: Option<Modality>) -> HttpResponse {
    let search = SemanticSearch::new(&state.encoder, state.document_store.as_ref(), state.vector_store.as_ref());
    match search.search(query, k, modality_filter) {
        Ok(response) => HttpResponse::Ok().json(SearchResponseBody {
            success: true,
            results: response
                .results
                .into_iter()
                .map(|hit| ResultItem {
                    id: hit.id,
                    text: hit.description,
                    modality: hit.modality.as_str().to_string(),
                    similarity: hit.similarity,
                    metadata: hit.metadata,
                })
                .collect(),
            source: match response.source {
                ingest_core::search::SearchSource::Semantic => "semantic",
                ingest_core::search::SearchSource::Metadata => "metadata",
            },
        }),
        Err(e) => to_response(&e),
    }
}

#[get("/api/search")]
pub async fn search_get(query: web::Query<SearchQuery>, state: web::Data<AppState>) -> HttpResponse {
    let modality_filter = query.modality.as_deref().and_then(Modality::parse);
    run_search(&state, &query.q, query.k.unwrap_or(10), modality_filter)
}

#[post("/api/search/semantic")]
pub async fn search_semantic(body: web::Json<SemanticSearchBody>, state: web::Data<AppState>) -> HttpResponse {
    let modality_filter = body.modality.as_deref().and_then(Modality::parse);
    run_search(&state, &body.query, body.k.unwrap_or(10), modality_filter)
}
