//! The multimodal pipeline (§4.C): the single public operation
//! `encode_path`, dispatching on modality as a tagged union (§9) with one
//! handler per case, each returning the same record shape.

mod audio;
mod image;
mod text;
mod video;

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::chunking::TextChunker;
use crate::config::{TextEmbedConfig, VideoEmbedConfig};
use crate::encoders::{Embedding, ImageEncoder, TextEncoder, Transcriber};
use crate::types::Modality;

#[derive(Clone, Debug)]
pub struct ChunkEmbedding {
    pub chunk_index: usize,
    pub text: String,
    pub embedding: Embedding,
}

#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub modality: Modality,
    pub descriptive_text: String,
    pub embedding: Embedding,
    pub embeddings_chunks: Vec<ChunkEmbedding>,
    pub extra: HashMap<String, Value>,
    /// Set when the canonical vector came from the image or audio path
    /// (§4.H step 5 — `clip_generated` on the metadata record).
    pub clip_generated: bool,
    pub errors: Vec<String>,
}

impl PipelineOutput {
    fn failed(modality: Modality, descriptive_text: String, errors: Vec<String>) -> Self {
        Self {
            modality,
            descriptive_text,
            embedding: Vec::new(),
            embeddings_chunks: Vec::new(),
            extra: HashMap::new(),
            clip_generated: false,
            errors,
        }
    }
}

/// Collapses whitespace and truncates to ≤ 500 chars, preferring to cut on
/// a sentence boundary when one falls within the window (§4.C).
pub fn build_summary(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let char_count = collapsed.chars().count();
    let truncated: String = collapsed.chars().take(500).collect();

    if char_count > 500 {
        if let Some(byte_idx) = truncated.rfind(['.', '!', '?']) {
            if byte_idx > 0 {
                return truncated[..=byte_idx].to_string();
            }
        }
    }
    truncated
}

pub struct Pipeline<'a> {
    pub image_encoder: &'a dyn ImageEncoder,
    pub text_encoder: &'a dyn TextEncoder,
    pub transcriber: &'a dyn Transcriber,
    pub text_config: TextEmbedConfig,
    pub video_config: VideoEmbedConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        image_encoder: &'a dyn ImageEncoder,
        text_encoder: &'a dyn TextEncoder,
        transcriber: &'a dyn Transcriber,
        text_config: TextEmbedConfig,
        video_config: VideoEmbedConfig,
    ) -> Self {
        Self { image_encoder, text_encoder, transcriber, text_config, video_config }
    }

    fn chunker(&self) -> TextChunker {
        TextChunker::new(self.text_config.chunk_size, self.text_config.overlap)
    }

    /// `encode_path` (§4.C): extracts, encodes, and produces
    /// `(descriptive_text, embedding, embeddings_chunks?, extra)` for one
    /// file, already classified into `modality`.
    pub fn encode_path(&self, path: &Path, modality: Modality, raw_text: Option<&str>) -> PipelineOutput {
        match modality {
            Modality::Image => image::handle(self, path),
            Modality::Video => video::handle(self, path),
            Modality::Audio => audio::handle(self, path),
            Modality::Text | Modality::Unknown => text::handle(self, raw_text.unwrap_or("")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_summary_collapses_whitespace() {
        let text = "Hello   world\n\nhow  are you";
        assert_eq!(build_summary(text), "Hello world how are you");
    }

    #[test]
    fn build_summary_cuts_on_sentence_boundary_past_500_chars() {
        let sentence = "The quick brown fox jumps over the lazy dog. ";
        let long_text = sentence.repeat(20);
        let summary = build_summary(&long_text);
        assert!(summary.len() <= 500);
        assert!(summary.ends_with('.'));
    }
}
