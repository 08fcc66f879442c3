use super::config::TranscodeConfig;
use super::{AnalysisError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, imageops::FilterType};
use std::io::Cursor;

pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";
pub const PNG_MEDIA_TYPE: &str = "image/png";

/// Encoded image bytes ready to be sent elsewhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
    pub width: u32,
    pub height: u32,
}

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(AnalysisError::Decode)
}

/// Decode, shrink to `max_width` if wider, and re-encode as JPEG
pub fn compress_image(bytes: &[u8], config: &TranscodeConfig) -> Result<EncodedImage> {
    let img = decode_image(bytes)?;
    compress_decoded(&img, config)
}

pub fn compress_decoded(img: &DynamicImage, config: &TranscodeConfig) -> Result<EncodedImage> {
    let quality = jpeg_quality(config.quality)?;
    let (width, height) = target_dimensions(img.dimensions(), config.max_width);

    let resized = if (width, height) == img.dimensions() {
        img.to_rgb8()
    } else {
        img.resize_exact(width, height, FilterType::Triangle).to_rgb8()
    };

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(&resized)
        .map_err(AnalysisError::Encode)?;

    Ok(EncodedImage {
        bytes,
        media_type: JPEG_MEDIA_TYPE,
        width,
        height,
    })
}

/// Re-encode any decodable input as 8-bit RGBA PNG, dimensions untouched
pub fn to_lossless(bytes: &[u8]) -> Result<EncodedImage> {
    let img = decode_image(bytes)?;
    let (width, height) = img.dimensions();

    let canonical = DynamicImage::ImageRgba8(img.to_rgba8());
    let mut cursor = Cursor::new(Vec::new());
    canonical
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(AnalysisError::Encode)?;

    Ok(EncodedImage {
        bytes: cursor.into_inner(),
        media_type: PNG_MEDIA_TYPE,
        width,
        height,
    })
}

/// Width capped at `max_width`, height scaled by the same factor
pub fn target_dimensions((width, height): (u32, u32), max_width: u32) -> (u32, u32) {
    if width <= max_width || max_width == 0 {
        return (width, height);
    }
    let scaled_height = (height as f64 * max_width as f64 / width as f64).round() as u32;
    (max_width, scaled_height.max(1))
}

fn jpeg_quality(quality: f32) -> Result<u8> {
    if !(quality > 0.0 && quality <= 1.0) {
        return Err(AnalysisError::InvalidQuality(quality));
    }
    Ok(((quality * 100.0).round() as u8).clamp(1, 100))
}
