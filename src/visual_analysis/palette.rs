use super::config::SamplerConfig;
use super::transcode::decode_image;
use super::{AnalysisError, AspectRatio, ColorData, ComputedMeta, ImageFeatures, Result};
use image::{DynamicImage, GenericImageView, RgbaImage, imageops::FilterType};
use std::collections::HashMap;

/// Channel values are floored to multiples of this before counting
pub const BUCKET_WIDTH: u8 = 32;

/// Number of dominant colors kept per image
pub const PALETTE_SIZE: usize = 5;

const ASPECT_TOLERANCE: f64 = 0.1;

/// Checked in order, first match wins
const REFERENCE_RATIOS: [(f64, AspectRatio); 4] = [
    (1.0, AspectRatio::Square),
    (0.5625, AspectRatio::Portrait9x16),
    (0.75, AspectRatio::Portrait3x4),
    (1.33, AspectRatio::Landscape4x3),
];

/// Palette and luminance statistics of one sampled raster
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSample {
    pub palette: Vec<ColorData>,
    pub brightness: u8,
    pub contrast: u8,
    pub sampled_pixels: usize,
}

/// Decode `bytes` and compute its metadata
pub fn extract_image_features(bytes: &[u8], config: &SamplerConfig) -> Result<ImageFeatures> {
    let img = decode_image(bytes)?;
    features_from_image(&img, config)
}

/// Compute metadata for an already decoded image.
/// Width and height are those of the source, not of the sampling raster.
pub fn features_from_image(img: &DynamicImage, config: &SamplerConfig) -> Result<ImageFeatures> {
    let (width, height) = img.dimensions();
    let raster = prepare_raster(img, config.max_side)?;
    let sample = sample_raster(&raster, config.stride);

    let meta = ComputedMeta {
        width,
        height,
        aspect_ratio: aspect_ratio_label(width, height),
        dominant_colors: sample.palette.iter().map(|c| c.hex.clone()).collect(),
        brightness: sample.brightness,
        contrast: sample.contrast,
        fingerprint: None,
    };

    Ok(ImageFeatures {
        meta,
        palette: sample.palette,
    })
}

/// Downscale so the longer side is at most `max_side`, keeping the aspect ratio
pub fn prepare_raster(img: &DynamicImage, max_side: u32) -> Result<RgbaImage> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 || max_side == 0 {
        return Err(AnalysisError::RasterUnavailable { width, height });
    }

    let scale = (max_side as f64 / width.max(height) as f64).min(1.0);
    if scale >= 1.0 {
        return Ok(img.to_rgba8());
    }

    let raster_width = ((width as f64 * scale) as u32).max(1);
    let raster_height = ((height as f64 * scale) as u32).max(1);

    Ok(img
        .resize_exact(raster_width, raster_height, FilterType::Triangle)
        .to_rgba8())
}

/// Walk every `stride`th pixel, bucket colors and collect luminance
pub fn sample_raster(raster: &RgbaImage, stride: usize) -> RasterSample {
    let stride = stride.max(1);

    // bucket key -> index into `buckets`, which keeps first-seen order
    let mut index: HashMap<[u8; 3], usize> = HashMap::new();
    let mut buckets: Vec<(usize, [u8; 3])> = Vec::new();
    let mut luminances: Vec<f64> = Vec::new();

    for pixel in raster.pixels().step_by(stride) {
        let [r, g, b, _] = pixel.0;
        let key = [quantize(r), quantize(g), quantize(b)];

        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push((0, [r, g, b]));
            buckets.len() - 1
        });
        buckets[slot].0 += 1;

        luminances.push(luminance(r, g, b));
    }

    let total = luminances.len();
    if total == 0 {
        return RasterSample {
            palette: Vec::new(),
            brightness: 0,
            contrast: 0,
            sampled_pixels: 0,
        };
    }

    // stable: equal counts stay in first-seen order
    buckets.sort_by(|a, b| b.0.cmp(&a.0));

    let palette = buckets
        .iter()
        .take(PALETTE_SIZE)
        .map(|&(count, [r, g, b])| ColorData {
            hex: rgb_to_hex(r, g, b),
            percentage: (count as f64 / total as f64 * 100.0).round() as u8,
            is_warm: is_warm(r, b),
        })
        .collect();

    let mean = luminances.iter().sum::<f64>() / total as f64;
    let variance = luminances.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / total as f64;
    let std_dev = variance.sqrt();

    RasterSample {
        palette,
        brightness: mean.round().clamp(0.0, 255.0) as u8,
        contrast: scale_contrast(std_dev),
        sampled_pixels: total,
    }
}

/// Match width/height against the reference ratios; anything else is 16:9
pub fn aspect_ratio_label(width: u32, height: u32) -> AspectRatio {
    if height == 0 {
        return AspectRatio::Landscape16x9;
    }
    let ratio = width as f64 / height as f64;

    REFERENCE_RATIOS
        .iter()
        .find(|(reference, _)| (ratio - reference).abs() < ASPECT_TOLERANCE)
        .map(|&(_, label)| label)
        .unwrap_or(AspectRatio::Landscape16x9)
}

pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Red above blue reads as warm
pub fn is_warm(r: u8, b: u8) -> bool {
    r > b
}

fn quantize(channel: u8) -> u8 {
    channel / BUCKET_WIDTH * BUCKET_WIDTH
}

fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

// Empirical scaling, kept as-is: stdDev/128*200 capped at 100
fn scale_contrast(std_dev: f64) -> u8 {
    (std_dev / 128.0 * 200.0).min(100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([rgb[0], rgb[1], rgb[2], 255]),
        ))
    }

    #[test]
    fn test_solid_color_single_bucket() {
        let img = solid(120, 80, [200, 100, 50]);
        let features = features_from_image(&img, &SamplerConfig::default()).unwrap();

        assert_eq!(features.palette.len(), 1);
        assert_eq!(features.palette[0].hex, "#c86432");
        assert_eq!(features.palette[0].percentage, 100);
        assert!(features.palette[0].is_warm);
        assert_eq!(features.meta.dominant_colors, vec!["#c86432".to_string()]);
        assert_eq!(features.meta.contrast, 0);
    }

    #[test]
    fn test_brightness_extremes() {
        let white = features_from_image(&solid(50, 50, [255, 255, 255]), &SamplerConfig::default())
            .unwrap();
        let black =
            features_from_image(&solid(50, 50, [0, 0, 0]), &SamplerConfig::default()).unwrap();

        assert_eq!(white.meta.brightness, 255);
        assert_eq!(white.meta.contrast, 0);
        assert_eq!(black.meta.brightness, 0);
        assert_eq!(black.meta.contrast, 0);
        assert!(!white.palette[0].is_warm);
    }

    #[test]
    fn test_half_black_half_white_saturates_contrast() {
        let mut raster = RgbaImage::new(100, 100);
        for (x, _, pixel) in raster.enumerate_pixels_mut() {
            *pixel = if x < 50 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            };
        }

        let sample = sample_raster(&raster, 5);
        assert_eq!(sample.contrast, 100);
        assert_eq!(sample.palette.len(), 2);
        assert_eq!(sample.palette[0].percentage + sample.palette[1].percentage, 100);
    }

    #[test]
    fn test_representative_is_first_seen_pixel() {
        let mut raster = RgbaImage::new(3, 1);
        raster.put_pixel(0, 0, Rgba([10, 40, 70, 255]));
        raster.put_pixel(1, 0, Rgba([20, 50, 80, 255]));
        raster.put_pixel(2, 0, Rgba([200, 200, 200, 255]));

        let sample = sample_raster(&raster, 1);
        assert_eq!(sample.sampled_pixels, 3);
        assert_eq!(sample.palette[0].hex, "#0a2846");
        assert_eq!(sample.palette[0].percentage, 67);
        assert_eq!(sample.palette[1].hex, "#c8c8c8");
        assert_eq!(sample.palette[1].percentage, 33);
    }

    #[test]
    fn test_palette_capped_and_ties_keep_first_seen_order() {
        let colors: [[u8; 3]; 7] = [
            [0, 0, 0],
            [255, 0, 0],
            [0, 255, 0],
            [0, 0, 255],
            [255, 255, 0],
            [0, 255, 255],
            [255, 255, 255],
        ];
        let mut raster = RgbaImage::new(7, 1);
        for (i, rgb) in colors.iter().enumerate() {
            raster.put_pixel(i as u32, 0, Rgba([rgb[0], rgb[1], rgb[2], 255]));
        }

        let sample = sample_raster(&raster, 1);
        let hexes: Vec<&str> = sample.palette.iter().map(|c| c.hex.as_str()).collect();
        assert_eq!(
            hexes,
            vec!["#000000", "#ff0000", "#00ff00", "#0000ff", "#ffff00"]
        );
        assert!(sample.palette.iter().all(|c| c.percentage == 14));
    }

    #[test]
    fn test_aspect_ratio_labels() {
        assert_eq!(aspect_ratio_label(1920, 1080), AspectRatio::Landscape16x9);
        assert_eq!(aspect_ratio_label(1080, 1920), AspectRatio::Portrait9x16);
        assert_eq!(aspect_ratio_label(1000, 1000), AspectRatio::Square);
        assert_eq!(aspect_ratio_label(1200, 1600), AspectRatio::Portrait3x4);
        assert_eq!(aspect_ratio_label(1600, 1200), AspectRatio::Landscape4x3);
        assert_eq!(aspect_ratio_label(3000, 1000), AspectRatio::Landscape16x9);
        assert_eq!(AspectRatio::Portrait9x16.to_string(), "9:16");
    }

    #[test]
    fn test_raster_is_downscaled_but_meta_keeps_source_size() {
        let img = solid(800, 400, [255, 255, 255]);
        let raster = prepare_raster(&img, 200).unwrap();
        assert_eq!(raster.dimensions(), (200, 100));

        let features = features_from_image(&img, &SamplerConfig::default()).unwrap();
        assert_eq!((features.meta.width, features.meta.height), (800, 400));
        assert_eq!(features.meta.aspect_ratio, AspectRatio::Landscape16x9);
    }

    #[test]
    fn test_small_image_is_not_upscaled() {
        let img = solid(30, 20, [1, 2, 3]);
        let raster = prepare_raster(&img, 200).unwrap();
        assert_eq!(raster.dimensions(), (30, 20));
    }

    #[test]
    fn test_zero_sized_raster_is_unavailable() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(0, 10));
        let err = features_from_image(&img, &SamplerConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::RasterUnavailable { .. }));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = extract_image_features(b"definitely not an image", &SamplerConfig::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Decode(_)));
    }
}
