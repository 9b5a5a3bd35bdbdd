use super::{build_summary, ChunkEmbedding, Pipeline, PipelineOutput};
use crate::types::Modality;

pub fn handle(pipeline: &Pipeline, raw_text: &str) -> PipelineOutput {
    let descriptive_text = build_summary(raw_text);
    let embedding = pipeline.text_encoder.encode_text(&descriptive_text);

    let chunker = pipeline.chunker();
    let embeddings_chunks = if chunker.needs_chunking(raw_text) {
        chunker
            .chunk(raw_text)
            .into_iter()
            .map(|chunk| ChunkEmbedding {
                chunk_index: chunk.chunk_index,
                embedding: pipeline.text_encoder.encode_text(&chunk.text),
                text: chunk.text,
            })
            .collect()
    } else {
        Vec::new()
    };

    PipelineOutput {
        modality: Modality::Text,
        descriptive_text,
        embedding,
        embeddings_chunks,
        extra: std::collections::HashMap::new(),
        clip_generated: false,
        errors: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TextEmbedConfig, VideoEmbedConfig};
    use crate::encoders::hashing::{HashEncoder, StubTranscriber};

    #[test]
    fn short_text_produces_no_chunks() {
        let encoder = HashEncoder::new();
        let transcriber = StubTranscriber;
        let pipeline = Pipeline::new(&encoder, &encoder, &transcriber, TextEmbedConfig::default(), VideoEmbedConfig::default());

        let output = pipeline.encode_path(std::path::Path::new("note.txt"), Modality::Text, Some("a short note"));
        assert_eq!(output.descriptive_text, "a short note");
        assert!(output.embeddings_chunks.is_empty());
    }

    #[test]
    fn long_text_produces_contiguous_chunks() {
        let encoder = HashEncoder::new();
        let transcriber = StubTranscriber;
        let config = TextEmbedConfig::new(64, 8, 32);
        let pipeline = Pipeline::new(&encoder, &encoder, &transcriber, config, VideoEmbedConfig::default());

        let long_text = "word ".repeat(200);
        let output = pipeline.encode_path(std::path::Path::new("doc.txt"), Modality::Text, Some(&long_text));
        assert!(!output.embeddings_chunks.is_empty());
        for (i, chunk) in output.embeddings_chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
        }
    }
}
