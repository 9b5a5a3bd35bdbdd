use std::path::Path;

use serde_json::json;

use super::{Pipeline, PipelineOutput};
use crate::extractors::audio::AudioExtractor;
use crate::types::Modality;

pub fn handle(pipeline: &Pipeline, path: &Path) -> PipelineOutput {
    let outcome = AudioExtractor::extract(path);
    let Some(handle) = outcome.payload else {
        return PipelineOutput::failed(
            Modality::Audio,
            String::new(),
            vec![outcome.error.unwrap_or_else(|| "audio probe failed".to_string())],
        );
    };

    let transcript = pipeline.transcriber.transcribe(&handle.path);
    let descriptive_text = if transcript.is_empty() { "audio file".to_string() } else { transcript };
    let embedding = pipeline.text_encoder.encode_text(&descriptive_text);

    let mut extra = std::collections::HashMap::new();
    if let Some(duration_s) = handle.duration_s {
        extra.insert("duration_s".to_string(), json!(duration_s));
    }

    PipelineOutput {
        modality: Modality::Audio,
        descriptive_text,
        embedding,
        embeddings_chunks: Vec::new(),
        extra,
        clip_generated: true,
        errors: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TextEmbedConfig, VideoEmbedConfig};
    use crate::encoders::hashing::{HashEncoder, StubTranscriber};

    #[test]
    fn stub_transcriber_falls_back_to_audio_file_placeholder() {
        let encoder = HashEncoder::new();
        let transcriber = StubTranscriber;
        let pipeline = Pipeline::new(&encoder, &encoder, &transcriber, TextEmbedConfig::default(), VideoEmbedConfig::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        std::fs::write(&path, b"not really audio").unwrap();

        let output = pipeline.encode_path(&path, Modality::Audio, None);
        assert!(output.errors.is_empty());
        assert_eq!(output.descriptive_text, "audio file");
        let norm: f32 = output.embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn missing_file_fails_the_pipeline_step() {
        let encoder = HashEncoder::new();
        let transcriber = StubTranscriber;
        let pipeline = Pipeline::new(&encoder, &encoder, &transcriber, TextEmbedConfig::default(), VideoEmbedConfig::default());

        let output = pipeline.encode_path(Path::new("does-not-exist.wav"), Modality::Audio, None);
        assert!(!output.errors.is_empty());
        assert!(output.embedding.is_empty());
    }
}
