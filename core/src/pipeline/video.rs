use std::path::Path;

use serde_json::json;

use super::{ChunkEmbedding, Pipeline, PipelineOutput};
use crate::encoders::mean_and_renormalize;
use crate::extractors::video::VideoExtractor;
use crate::types::Modality;

pub fn handle(pipeline: &Pipeline, path: &Path) -> PipelineOutput {
    let outcome = VideoExtractor::extract(path, &pipeline.video_config);
    let Some(payload) = outcome.payload else {
        return PipelineOutput::failed(
            Modality::Video,
            String::new(),
            vec![outcome.error.unwrap_or_else(|| "video decode failed".to_string())],
        );
    };

    if payload.frames.is_empty() {
        return PipelineOutput::failed(
            Modality::Video,
            String::new(),
            vec!["no frames sampled from video".to_string()],
        );
    }

    let frame_vectors: Vec<_> = payload.frames.iter().map(|f| pipeline.image_encoder.encode_image(&f.rgb)).collect();
    let embedding = mean_and_renormalize(&frame_vectors);

    let middle_index = payload.frames.len() / 2;
    let middle_caption = pipeline.image_encoder.caption_image(&payload.frames[middle_index].rgb);
    let descriptive_text = format!("video; {middle_caption}");

    let embeddings_chunks: Vec<ChunkEmbedding> = payload
        .frames
        .iter()
        .zip(frame_vectors.into_iter())
        .enumerate()
        .map(|(chunk_index, (frame, frame_embedding))| ChunkEmbedding {
            chunk_index,
            text: pipeline.image_encoder.caption_image(&frame.rgb),
            embedding: frame_embedding,
        })
        .collect();

    let mut extra = std::collections::HashMap::new();
    extra.insert("duration_s".to_string(), json!(payload.duration_s));
    extra.insert("frame_count_sampled".to_string(), json!(payload.frames.len()));

    PipelineOutput {
        modality: Modality::Video,
        descriptive_text,
        embedding,
        embeddings_chunks,
        extra,
        clip_generated: true,
        errors: Vec::new(),
    }
}
