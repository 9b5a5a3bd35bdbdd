//! Runtime configuration.
//!
//! Mirrors the shape of the teacher crate's `TextEmbedConfig`/`ImageEmbedConfig`:
//! plain structs with a `Default` impl and a constructor, not a lazily
//! initialized global. [`Settings`] additionally reads the environment once
//! at startup (the way `hf_hub::api::sync::ApiBuilder::from_env()` does) and
//! is then passed around by value/reference — never re-read mid-batch.

use std::path::PathBuf;

/// Chunking and batching knobs for the text branch of the multimodal pipeline.
#[derive(Clone, Debug)]
pub struct TextEmbedConfig {
    pub chunk_size: usize,
    pub overlap: usize,
    pub batch_size: usize,
}

impl Default for TextEmbedConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            overlap: 64,
            batch_size: 32,
        }
    }
}

impl TextEmbedConfig {
    pub fn new(chunk_size: usize, overlap: usize, batch_size: usize) -> Self {
        Self {
            chunk_size,
            overlap,
            batch_size,
        }
    }
}

/// Frame-sampling knobs for the video branch.
#[derive(Clone, Debug)]
pub struct VideoEmbedConfig {
    pub fps_factor: f64,
    pub max_frames: Option<usize>,
}

impl Default for VideoEmbedConfig {
    fn default() -> Self {
        Self {
            fps_factor: 0.3,
            max_frames: None,
        }
    }
}

/// Soft per-file timeouts (§5). Treated as an extraction failure on expiry.
#[derive(Clone, Debug)]
pub struct Timeouts {
    pub media_secs: u64,
    pub text_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            media_secs: 120,
            text_secs: 30,
        }
    }
}

/// Process-wide settings assembled once from the environment (§6).
#[derive(Clone, Debug)]
pub struct Settings {
    pub storage_root: PathBuf,
    pub mongo_uri: Option<String>,
    pub mongo_db: Option<String>,
    pub chroma_persist_path: PathBuf,
    pub chroma_collection: String,
    pub enable_audio: bool,
    pub clip_model_name: String,
    pub clip_pretrained: String,
    pub text: TextEmbedConfig,
    pub video: VideoEmbedConfig,
    pub timeouts: Timeouts,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("../storage"),
            mongo_uri: None,
            mongo_db: None,
            chroma_persist_path: PathBuf::from("./chroma_db"),
            chroma_collection: "nosql_graph_embeddings".to_string(),
            enable_audio: true,
            clip_model_name: "ViT-B-32".to_string(),
            clip_pretrained: "openai".to_string(),
            text: TextEmbedConfig::default(),
            video: VideoEmbedConfig::default(),
            timeouts: Timeouts::default(),
        }
    }
}

impl Settings {
    /// Reads the §6 environment keys, falling back to their documented
    /// defaults, and resolves relative paths (storage root, Chroma persist
    /// directory) to absolute ones.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(root) = std::env::var("LOCAL_ROOT_REPO") {
            settings.storage_root = PathBuf::from(root);
        }
        settings.storage_root = std::env::current_dir()
            .map(|cwd| cwd.join(&settings.storage_root))
            .unwrap_or(settings.storage_root);

        settings.mongo_uri = std::env::var("MONGO_URI").ok();
        settings.mongo_db = std::env::var("MONGO_DB").ok();

        if let Ok(path) = std::env::var("CHROMA_PERSIST_PATH") {
            settings.chroma_persist_path = PathBuf::from(path);
        }
        settings.chroma_persist_path = std::env::current_dir()
            .map(|cwd| cwd.join(&settings.chroma_persist_path))
            .unwrap_or(settings.chroma_persist_path);

        if let Ok(collection) = std::env::var("CHROMA_NOSQL_COLLECTION") {
            settings.chroma_collection = collection;
        }

        if let Ok(enable_audio) = std::env::var("ENABLE_AUDIO") {
            settings.enable_audio = enable_audio != "false" && enable_audio != "0";
        }

        if let Ok(model) = std::env::var("CLIP_MODEL_NAME") {
            settings.clip_model_name = model;
        }
        if let Ok(pretrained) = std::env::var("CLIP_PRETRAINED") {
            settings.clip_pretrained = pretrained;
        }

        settings
    }

    /// Whether the document store degrades to the in-process default (§10.5).
    pub fn document_store_is_external(&self) -> bool {
        self.mongo_uri.is_some() && self.mongo_db.is_some()
    }
}
