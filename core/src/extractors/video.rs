//! Video frame sampling (§4.A): `.mp4 .mov .avi .mkv .webm` sampled at
//! `fps_factor · source_fps`, capped by `max_frames`.
//!
//! Gated behind the `video` feature (links the system ffmpeg libraries).
//! With the feature disabled, extraction always fails with
//! `UNSUPPORTED_TYPE` so the coordinator can fall back the same way it
//! does for any other unreachable extractor.

use std::path::Path;

use super::ExtractionOutcome;
use crate::config::VideoEmbedConfig;

#[derive(Clone, Debug)]
pub struct SampledFrame {
    pub rgb: image::RgbImage,
    pub timestamp_s: f64,
}

#[derive(Clone, Debug)]
pub struct VideoPayload {
    pub frames: Vec<SampledFrame>,
    pub duration_s: f64,
}

pub struct VideoExtractor;

#[cfg(feature = "video")]
impl VideoExtractor {
    pub fn extract<T: AsRef<Path>>(file_path: T, config: &VideoEmbedConfig) -> ExtractionOutcome<VideoPayload> {
        match Self::extract_inner(file_path.as_ref(), config) {
            Ok(payload) => ExtractionOutcome::ok(payload),
            Err(e) => ExtractionOutcome::failed(e.to_string()),
        }
    }

    fn extract_inner(path: &Path, config: &VideoEmbedConfig) -> Result<VideoPayload, ffmpeg_next::Error> {
        ffmpeg_next::init()?;
        let mut input = ffmpeg_next::format::input(&path)?;
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or(ffmpeg_next::Error::StreamNotFound)?;
        let stream_index = stream.index();

        let source_fps = stream.rate().numerator() as f64 / stream.rate().denominator().max(1) as f64;
        let duration_s = stream.duration() as f64 * f64::from(stream.time_base());

        let context = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let mut decoder = context.decoder().video()?;

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg_next::format::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let sample_every = (1.0 / (config.fps_factor * source_fps.max(0.001))).max(1.0 / source_fps.max(0.001));
        let mut next_sample_at = 0.0_f64;
        let mut frames = Vec::new();

        for (stream_ref, packet) in input.packets() {
            if stream_ref.index() != stream_index {
                continue;
            }
            decoder.send_packet(&packet)?;
            let mut decoded = ffmpeg_next::frame::Video::empty();
            while decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(0) as f64 * f64::from(stream_ref.time_base());
                if pts + f64::EPSILON >= next_sample_at {
                    let mut rgb_frame = ffmpeg_next::frame::Video::empty();
                    scaler.run(&decoded, &mut rgb_frame)?;
                    if let Some(image) = frame_to_rgb_image(&rgb_frame) {
                        frames.push(SampledFrame { rgb: image, timestamp_s: pts });
                    }
                    next_sample_at += sample_every;
                    if let Some(cap) = config.max_frames {
                        if frames.len() >= cap {
                            return Ok(VideoPayload { frames, duration_s });
                        }
                    }
                }
            }
        }

        Ok(VideoPayload { frames, duration_s })
    }
}

#[cfg(feature = "video")]
fn frame_to_rgb_image(frame: &ffmpeg_next::frame::Video) -> Option<image::RgbImage> {
    let width = frame.width();
    let height = frame.height();
    let stride = frame.stride(0);
    let data = frame.data(0);
    let mut buf = Vec::with_capacity((width * height * 3) as usize);
    for row in 0..height as usize {
        let start = row * stride;
        buf.extend_from_slice(&data[start..start + width as usize * 3]);
    }
    image::RgbImage::from_raw(width, height, buf)
}

#[cfg(not(feature = "video"))]
impl VideoExtractor {
    pub fn extract<T: AsRef<Path>>(_file_path: T, _config: &VideoEmbedConfig) -> ExtractionOutcome<VideoPayload> {
        ExtractionOutcome::failed("video support not compiled in (enable the `video` feature)")
    }
}

#[cfg(all(test, not(feature = "video")))]
mod tests {
    use super::*;

    #[test]
    fn disabled_feature_fails_cleanly() {
        let outcome = VideoExtractor::extract("clip.mp4", &VideoEmbedConfig::default());
        assert!(outcome.payload.is_none());
        assert!(outcome.error.unwrap().contains("video"));
    }
}
