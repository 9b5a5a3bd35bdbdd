//! The HTTP upload, search, and download surface (§6), kept as an external
//! collaborator around the ingestion core (§1): this crate only wires
//! requests to `ingest-core` and serializes the results.

pub mod error;
pub mod routes;
pub mod state;

use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{get, web, App, HttpResponse, HttpServer};

use state::AppState;

#[get("/health_check")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}

pub fn run(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<Server> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(state.clone()))
            .service(health_check)
            .service(routes::upload::upload)
            .service(routes::db_state::database_state)
            .service(routes::db_state::visualization)
            .service(routes::search::search_get)
            .service(routes::search::search_semantic)
            .service(routes::download::download)
    })
    .listen(listener)?
    .run();
    Ok(server)
}
