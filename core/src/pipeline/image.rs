use std::path::Path;

use serde_json::json;

use super::{Pipeline, PipelineOutput};
use crate::extractors::image::ImageExtractor;
use crate::types::Modality;

pub fn handle(pipeline: &Pipeline, path: &Path) -> PipelineOutput {
    let outcome = ImageExtractor::extract(path);
    let Some(decoded) = outcome.payload else {
        return PipelineOutput::failed(
            Modality::Image,
            String::new(),
            vec![outcome.error.unwrap_or_else(|| "image decode failed".to_string())],
        );
    };

    let descriptive_text = pipeline.image_encoder.caption_image(&decoded.rgb);
    let embedding = pipeline.image_encoder.encode_image(&decoded.rgb);

    let mut extra = std::collections::HashMap::new();
    extra.insert("width".to_string(), json!(decoded.width));
    extra.insert("height".to_string(), json!(decoded.height));

    PipelineOutput {
        modality: Modality::Image,
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
    fn image_handler_captions_and_embeds() {
        let encoder = HashEncoder::new();
        let transcriber = StubTranscriber;
        let pipeline = Pipeline::new(&encoder, &encoder, &transcriber, TextEmbedConfig::default(), VideoEmbedConfig::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.png");
        image::RgbImage::from_pixel(20, 10, image::Rgb([1, 2, 3])).save(&path).unwrap();

        let output = pipeline.encode_path(&path, Modality::Image, None);
        assert!(output.errors.is_empty());
        assert_eq!(output.descriptive_text, "image (20\u{00d7}10)");
        assert_eq!(output.extra.get("width").unwrap(), &json!(20));
        let norm: f32 = output.embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }
}
