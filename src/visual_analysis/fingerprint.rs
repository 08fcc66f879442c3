use super::Asset;
use image::DynamicImage;
use img_hash::{HashAlg, HasherConfig, image as img_hash_image};

const COMPARISON_SIZE: u32 = 256;

/// Centre-crop to a square and resize to a fixed size, so that the same
/// creative exported at different sizes and aspect ratios hashes alike
pub fn resize_for_comparison(
    img: &img_hash_image::DynamicImage,
) -> img_hash_image::ImageBuffer<img_hash_image::Rgba<u8>, Vec<u8>> {
    use img_hash_image::GenericImageView;
    let (width, height) = img.dimensions();

    let side = width.min(height);
    let x = (width - side) / 2;
    let y = (height - side) / 2;

    img.crop_imm(x, y, side, side)
        .resize_exact(
            COMPARISON_SIZE,
            COMPARISON_SIZE,
            img_hash_image::imageops::FilterType::Lanczos3,
        )
        .to_rgba8()
}

/// 64-bit blockhash of a decoded image, `None` for empty images
pub fn visual_fingerprint(img: &DynamicImage) -> Option<Vec<u8>> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    // img_hash pins its own image version, hand the pixels across raw
    let buffer = img_hash_image::RgbaImage::from_raw(width, height, rgba.into_raw())?;
    let resized = resize_for_comparison(&img_hash_image::DynamicImage::ImageRgba8(buffer));

    let hasher = HasherConfig::new()
        .hash_alg(HashAlg::Blockhash)
        .hash_size(8, 8)
        .to_hasher();

    let hash = hasher.hash_image(&img_hash_image::DynamicImage::ImageRgba8(resized));
    Some(hash.as_bytes().to_vec())
}

/// Differing bits, `None` when the hashes are not comparable
pub fn hamming_distance(hash1: &[u8], hash2: &[u8]) -> Option<u32> {
    if hash1.len() != hash2.len() {
        return None;
    }
    Some(
        hash1
            .iter()
            .zip(hash2.iter())
            .map(|(byte1, byte2)| (byte1 ^ byte2).count_ones())
            .sum(),
    )
}

/// Assets whose fingerprint lies within `threshold` bits of the target's,
/// closest first
pub fn find_near_duplicates<'a>(
    target: &Asset,
    candidates: &'a [Asset],
    threshold: u32,
) -> Vec<(&'a Asset, u32)> {
    let Some(target_hash) = target
        .computed_meta
        .as_ref()
        .and_then(|meta| meta.fingerprint.as_deref())
    else {
        return Vec::new();
    };

    let mut matches: Vec<(&Asset, u32)> = candidates
        .iter()
        .filter(|candidate| candidate.id != target.id)
        .filter_map(|candidate| {
            let hash = candidate.computed_meta.as_ref()?.fingerprint.as_deref()?;
            let distance = hamming_distance(target_hash, hash)?;
            (distance <= threshold).then_some((candidate, distance))
        })
        .collect();

    matches.sort_by_key(|&(_, distance)| distance);
    matches
}
