use std::net::TcpListener;
use std::sync::Arc;

use ingest_core::config::Settings;
use ingest_server::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = Settings::from_env();
    let state = Arc::new(AppState::from_settings(settings));

    let listener = TcpListener::bind("0.0.0.0:8080")?;
    tracing::info!(addr = %listener.local_addr().unwrap(), "listening");
    ingest_server::run(listener, state)?.await
}
