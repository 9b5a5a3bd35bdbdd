//! Audio extraction (§4.A): `.mp3 .wav .flac .ogg .m4a` pass their path
//! through to transcription; duration is recorded when cheaply available.
//!
//! Probing is feature-gated behind `audio` (symphonia), mirroring the
//! teacher crate's own `audio` feature for ASR. With the feature disabled,
//! duration is simply unavailable — never an error.

use std::path::{Path, PathBuf};

use super::ExtractionOutcome;

#[derive(Clone, Debug)]
pub struct AudioHandle {
    pub path: PathBuf,
    pub duration_s: Option<f64>,
}

pub struct AudioExtractor;

impl AudioExtractor {
    pub fn extract<T: AsRef<Path>>(file_path: T) -> ExtractionOutcome<AudioHandle> {
        let path = file_path.as_ref();
        if !path.exists() {
            return ExtractionOutcome::failed(format!("no such file: {}", path.display()));
        }
        ExtractionOutcome::ok(AudioHandle {
            path: path.to_path_buf(),
            duration_s: Self::probe_duration(path),
        })
    }

    #[cfg(feature = "audio")]
    fn probe_duration(path: &Path) -> Option<f64> {
        use symphonia::core::formats::FormatOptions;
        use symphonia::core::io::MediaSourceStream;
        use symphonia::core::meta::MetadataOptions;
        use symphonia::core::probe::Hint;

        let file = std::fs::File::open(path).ok()?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }
        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .ok()?;

        let track = probed.format.default_track()?;
        let frames = track.codec_params.n_frames?;
        let rate = track.codec_params.sample_rate? as f64;
        Some(frames as f64 / rate)
    }

    #[cfg(not(feature = "audio"))]
    fn probe_duration(_path: &Path) -> Option<f64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_extraction_failure() {
        let outcome = AudioExtractor::extract("missing.wav");
        assert!(outcome.payload.is_none());
    }

    #[test]
    fn existing_file_succeeds_even_if_duration_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        std::fs::write(&path, b"not really a wav file").unwrap();

        let outcome = AudioExtractor::extract(&path);
        assert!(outcome.payload.is_some());
    }
}
