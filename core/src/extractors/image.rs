//! Image decoding (§4.A): `.jpg .jpeg .png .bmp .gif .webp` to an RGB8
//! tensor, plus `(width, height)`.

use std::path::Path;

use image::RgbImage;

use super::ExtractionOutcome;

#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub rgb: RgbImage,
    pub width: u32,
    pub height: u32,
}

pub struct ImageExtractor;

impl ImageExtractor {
    pub fn extract<T: AsRef<Path>>(file_path: T) -> ExtractionOutcome<DecodedImage> {
        match image::open(file_path.as_ref()) {
            Ok(dynamic) => {
                let rgb = dynamic.to_rgb8();
                let (width, height) = (rgb.width(), rgb.height());
                ExtractionOutcome::ok(DecodedImage { rgb, width, height })
            }
            Err(e) => ExtractionOutcome::failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_an_in_memory_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.png");
        let img = RgbImage::from_pixel(4, 3, image::Rgb([10, 20, 30]));
        img.save(&path).unwrap();

        let outcome = ImageExtractor::extract(&path);
        let decoded = outcome.payload.unwrap();
        assert_eq!((decoded.width, decoded.height), (4, 3));
    }

    #[test]
    fn missing_file_reports_an_error() {
        let outcome = ImageExtractor::extract("does-not-exist.png");
        assert!(outcome.payload.is_none());
        assert!(outcome.error.is_some());
    }
}
