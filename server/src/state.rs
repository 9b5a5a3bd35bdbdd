//! Process-wide application state: the encoder handle, the document and
//! vector store handles, and settings, all constructed once at startup (§9
//! "Global model handles") and shared behind `web::Data`.

use ingest_core::config::Settings;
use ingest_core::document_store::{DocumentStore, InMemoryDocumentStore};
use ingest_core::encoders::hashing::{HashEncoder, StubTranscriber};
use ingest_core::vector_store::{InMemoryVectorStore, VectorStore};

pub struct AppState {
    pub settings: Settings,
    pub encoder: HashEncoder,
    pub transcriber: StubTranscriber,
    pub document_store: Box<dyn DocumentStore>,
    pub vector_store: Box<dyn VectorStore>,
}

impl AppState {
    pub fn from_settings(settings: Settings) -> Self {
        std::fs::create_dir_all(&settings.storage_root).ok();
        Self {
            settings,
            encoder: HashEncoder::new(),
            transcriber: StubTranscriber,
            document_store: Box::new(InMemoryDocumentStore::new()),
            vector_store: Box::new(InMemoryVectorStore::new()),
        }
    }
}
