//! Decode, grade and re-encode a photo file.
//!
//! The grading engine only sees raw RGB8/RGBA8 buffers; this module is the
//! codec boundary around it.

use color_grade::Grade;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::error::RenderError;

/// MIME type sent with an upload, chosen by file extension
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// Grade the photo at `path` and return encoded bytes in its original format.
///
/// JPEG output uses `jpeg_quality` (1..=100). Alpha, when present, is kept.
pub fn render_graded(
    path: &Path,
    grade: Grade<'_>,
    jpeg_quality: u8,
) -> Result<Vec<u8>, RenderError> {
    let format = ImageFormat::from_path(path)
        .map_err(|e| RenderError::UnsupportedFormat(e.to_string()))?;
    let bytes = std::fs::read(path)?;
    grade_bytes(&bytes, format, grade, jpeg_quality)
}

/// Grade already-loaded image bytes of a known format.
pub fn grade_bytes(
    bytes: &[u8],
    format: ImageFormat,
    grade: Grade<'_>,
    jpeg_quality: u8,
) -> Result<Vec<u8>, RenderError> {
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| RenderError::Decode(e.to_string()))?;

    let graded = if decoded.color().has_alpha() && format != ImageFormat::Jpeg {
        let mut rgba = decoded.into_rgba8();
        grade.apply(&mut rgba, 4)?;
        DynamicImage::ImageRgba8(rgba)
    } else {
        let mut rgb = decoded.into_rgb8();
        grade.apply(&mut rgb, 3)?;
        DynamicImage::ImageRgb8(rgb)
    };

    let mut out = Vec::new();
    if format == ImageFormat::Jpeg {
        let encoder = JpegEncoder::new_with_quality(&mut out, jpeg_quality.clamp(1, 100));
        graded
            .write_with_encoder(encoder)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
    } else {
        graded
            .write_to(&mut Cursor::new(&mut out), format)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
    }

    tracing::debug!(
        width = graded.width(),
        height = graded.height(),
        format = ?format,
        bytes = out.len(),
        "Graded photo"
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_grade::{ColorTable, ToneAdjustments};
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn png_bytes(img: DynamicImage) -> Vec<u8> {
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_mime_for_extensions() {
        assert_eq!(mime_for(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a.png")), "image/png");
        assert_eq!(mime_for(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_for(Path::new("noext")), "image/jpeg");
    }

    #[test]
    fn test_png_table_grade_is_lossless() {
        let img = RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
        let bytes = png_bytes(DynamicImage::ImageRgb8(img));
        let table = ColorTable::new(1, vec![[1.0, 0.5, 0.0]]).unwrap();

        let out = grade_bytes(&bytes, ImageFormat::Png, Grade::Table(&table), 90).unwrap();

        let decoded = image::load_from_memory(&out).unwrap().into_rgb8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert!(decoded.pixels().all(|p| *p == Rgb([255, 128, 0])));
    }

    #[test]
    fn test_png_alpha_survives() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([100, 100, 100, 42]));
        let bytes = png_bytes(DynamicImage::ImageRgba8(img));
        let adj = ToneAdjustments {
            exposure: 1.0,
            ..Default::default()
        };

        let out = grade_bytes(&bytes, ImageFormat::Png, Grade::Tone(&adj), 90).unwrap();

        let decoded = image::load_from_memory(&out).unwrap().into_rgba8();
        assert!(decoded.pixels().all(|p| *p == Rgba([200, 200, 200, 42])));
    }

    #[test]
    fn test_jpeg_output_is_jpeg() {
        let img = RgbImage::from_pixel(8, 8, Rgb([128, 128, 128]));
        let mut jpeg = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();
        let adj = ToneAdjustments::default();

        let out = grade_bytes(&jpeg, ImageFormat::Jpeg, Grade::Tone(&adj), 80).unwrap();

        assert_eq!(&out[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_decode_failure() {
        let adj = ToneAdjustments::default();
        let err = grade_bytes(b"not an image", ImageFormat::Png, Grade::Tone(&adj), 90)
            .unwrap_err();
        assert!(matches!(err, RenderError::Decode(_)));
    }

    #[test]
    fn test_unknown_extension() {
        let adj = ToneAdjustments::default();
        let err = render_graded(Path::new("photo.xyz"), Grade::Tone(&adj), 90).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedFormat(_)));
    }
}
