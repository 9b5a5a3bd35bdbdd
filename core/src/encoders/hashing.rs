//! A deterministic, offline hash-projection encoder.
//!
//! Real CLIP/BERT/Whisper weights require a network fetch at startup
//! (`hf-hub`) that this environment cannot perform, so this encoder stands
//! in for them: it is the captioner/transcriber "stub" the spec explicitly
//! sanctions (§4.B — "the system degrades, it does not fail"), generalized
//! to cover the image and text vector paths too. Determinism matters more
//! than semantic fidelity here: the same bytes always produce the same
//! vector, features are projected with [`candle_core`] tensors rather than
//! hand-rolled loops, and the result is always L2-normalized.

use candle_core::{DType, Device, Tensor};
use sha2::{Digest, Sha256};

use super::{l2_normalize, Embedding, ImageEncoder, TextEncoder, Transcriber};
use crate::extractors::image::DecodedImage;
use crate::types::EMBEDDING_DIM;

const TEXT_HASH_BUCKETS: usize = 4096;
const IMAGE_GRID: usize = 16; // IMAGE_GRID x IMAGE_GRID x 3 channels
const IMAGE_FEATURES: usize = IMAGE_GRID * IMAGE_GRID * 3;

/// Fills a `rows x cols` matrix with values in `[-1, 1]` derived from
/// `SHA-256(seed || row || col)`. Pure function of its inputs: the same
/// seed always yields the same matrix, in this process or any other.
fn seeded_matrix(seed: &str, rows: usize, cols: usize) -> Tensor {
    let mut data = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let mut hasher = Sha256::new();
            hasher.update(seed.as_bytes());
            hasher.update(r.to_le_bytes());
            hasher.update(c.to_le_bytes());
            let digest = hasher.finalize();
            let raw = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
            data.push((raw as f32 / u32::MAX as f32) * 2.0 - 1.0);
        }
    }
    Tensor::from_vec(data, (rows, cols), &Device::Cpu).expect("seeded matrix shape is always valid")
}

fn project(features: Vec<f32>, projection: &Tensor) -> Embedding {
    let rows = features.len();
    let input = Tensor::from_vec(features, (1, rows), &Device::Cpu).expect("feature vector shape is always valid");
    let projected = input
        .to_dtype(DType::F32)
        .and_then(|t| t.matmul(projection))
        .and_then(|t| t.squeeze(0))
        .and_then(|t| t.to_vec1::<f32>())
        .unwrap_or_else(|_| vec![0.0; EMBEDDING_DIM]);
    let mut vector = projected;
    l2_normalize(&mut vector);
    vector
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
        .collect()
}

/// Feature-hashes a token stream into a fixed-width bag-of-words vector
/// (the classic "hashing trick"), sign-randomized per bucket to keep
/// unrelated tokens from reinforcing each other.
fn hash_text_features(text: &str) -> Vec<f32> {
    let mut features = vec![0.0_f32; TEXT_HASH_BUCKETS];
    for token in tokenize(text) {
        let digest = Sha256::digest(token.as_bytes());
        let bucket = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize % TEXT_HASH_BUCKETS;
        let sign = if digest[4] & 1 == 0 { 1.0 } else { -1.0 };
        features[bucket] += sign;
    }
    let norm = (features.iter().map(|x| x * x).sum::<f32>()).sqrt();
    if norm > f32::EPSILON {
        for f in features.iter_mut() {
            *f /= norm;
        }
    }
    features
}

fn downsample_grid(image: &image::RgbImage) -> Vec<f32> {
    let (width, height) = image.dimensions();
    let mut features = Vec::with_capacity(IMAGE_FEATURES);
    for gy in 0..IMAGE_GRID {
        for gx in 0..IMAGE_GRID {
            let x0 = (gx as u32 * width) / IMAGE_GRID as u32;
            let x1 = (((gx + 1) as u32) * width / IMAGE_GRID as u32).max(x0 + 1).min(width);
            let y0 = (gy as u32 * height) / IMAGE_GRID as u32;
            let y1 = (((gy + 1) as u32) * height / IMAGE_GRID as u32).max(y0 + 1).min(height);

            let mut sum = [0u64; 3];
            let mut count = 0u64;
            for y in y0..y1 {
                for x in x0..x1 {
                    let px = image.get_pixel(x, y);
                    sum[0] += px[0] as u64;
                    sum[1] += px[1] as u64;
                    sum[2] += px[2] as u64;
                    count += 1;
                }
            }
            let count = count.max(1) as f32;
            features.push(sum[0] as f32 / count / 255.0);
            features.push(sum[1] as f32 / count / 255.0);
            features.push(sum[2] as f32 / count / 255.0);
        }
    }
    features
}

/// The process-wide encoder handle (§9 "Global model handles"): built once
/// at startup, cheap to clone, never re-entrant across a batch.
pub struct HashEncoder {
    text_projection: Tensor,
    image_projection: Tensor,
}

impl HashEncoder {
    pub fn new() -> Self {
        Self {
            text_projection: seeded_matrix("text-projection-v1", TEXT_HASH_BUCKETS, EMBEDDING_DIM),
            image_projection: seeded_matrix("image-projection-v1", IMAGE_FEATURES, EMBEDDING_DIM),
        }
    }
}

impl Default for HashEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEncoder for HashEncoder {
    fn encode_text(&self, text: &str) -> Embedding {
        let features = hash_text_features(text);
        project(features, &self.text_projection)
    }
}

impl ImageEncoder for HashEncoder {
    fn encode_image(&self, image: &image::RgbImage) -> Embedding {
        let features = downsample_grid(image);
        project(features, &self.image_projection)
    }

    fn caption_image(&self, image: &image::RgbImage) -> String {
        format!("image ({}\u{00d7}{})", image.width(), image.height())
    }
}

/// Convenience for callers holding a [`DecodedImage`] rather than a raw
/// `RgbImage`.
pub fn caption_decoded_image(image: &DecodedImage) -> String {
    format!("image ({}\u{00d7}{})", image.width, image.height)
}

/// The transcriber stub (§4.B): no ASR backend is wired up, so every file
/// transcribes to `""` and the pipeline falls back to `"audio file"` for
/// encoding.
#[derive(Default)]
pub struct StubTranscriber;

impl Transcriber for StubTranscriber {
    fn transcribe(&self, _path: &std::path::Path) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_text_is_deterministic_and_unit_length() {
        let encoder = HashEncoder::new();
        let a = encoder.encode_text("caching scheme for distributed systems");
        let b = encoder.encode_text("caching scheme for distributed systems");
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn distinct_text_yields_distinct_vectors() {
        let encoder = HashEncoder::new();
        let a = encoder.encode_text("caching scheme");
        let b = encoder.encode_text("unrelated topic entirely");
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        assert!(dot < 0.999);
    }

    #[test]
    fn encode_image_is_unit_length() {
        let encoder = HashEncoder::new();
        let img = image::RgbImage::from_pixel(32, 32, image::Rgb([120, 50, 200]));
        let v = encoder.encode_image(&img);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn caption_falls_back_to_dimensions() {
        let encoder = HashEncoder::new();
        let img = image::RgbImage::from_pixel(640, 480, image::Rgb([0, 0, 0]));
        assert_eq!(encoder.caption_image(&img), "image (640\u{00d7}480)");
    }
}
