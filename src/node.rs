use crate::visual_analysis::clustering::cluster_assets;
use crate::visual_analysis::config::{DEFAULT_MAX_ITERATIONS, SamplerConfig, TranscodeConfig};
use crate::visual_analysis::palette::extract_image_features;
use crate::visual_analysis::similarity::cosine_similarity as cosine;
use crate::visual_analysis::transcode::compress_image as compress;
use crate::visual_analysis::{AnalysisError, Asset};
use napi::bindgen_prelude::*;
use napi_derive::napi;
use rand::SeedableRng;
use rand_pcg::Pcg32;

#[napi(object)]
#[derive(Debug, Clone)]
pub struct JsColorData {
    pub hex: String,
    pub percentage: u32,
    pub is_warm: bool,
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct JsImageMeta {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: String,
    pub dominant_colors: Vec<JsColorData>,
    pub brightness: u32,
    pub contrast: u32,
}

#[napi(object)]
pub struct JsEncodedImage {
    pub data: Buffer,
    pub media_type: String,
    pub width: u32,
    pub height: u32,
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct JsEmbeddedAsset {
    pub id: String,
    pub embedding: Option<Vec<f64>>,
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct JsCluster {
    pub centroid: Vec<f64>,
    pub asset_ids: Vec<String>,
}

fn to_napi_error(err: AnalysisError) -> Error {
    Error::from_reason(err.to_string())
}

#[napi]
pub fn extract_image_meta(input: Buffer) -> Result<JsImageMeta> {
    let features =
        extract_image_features(input.as_ref(), &SamplerConfig::default()).map_err(to_napi_error)?;

    Ok(JsImageMeta {
        width: features.meta.width,
        height: features.meta.height,
        aspect_ratio: features.meta.aspect_ratio.label().to_string(),
        dominant_colors: features
            .palette
            .into_iter()
            .map(|c| JsColorData {
                hex: c.hex,
                percentage: c.percentage as u32,
                is_warm: c.is_warm,
            })
            .collect(),
        brightness: features.meta.brightness as u32,
        contrast: features.meta.contrast as u32,
    })
}

#[napi]
pub fn compress_image(
    input: Buffer,
    max_width: Option<u32>,
    quality: Option<f64>,
) -> Result<JsEncodedImage> {
    let defaults = TranscodeConfig::default();
    let config = TranscodeConfig {
        max_width: max_width.unwrap_or(defaults.max_width),
        quality: quality.map(|q| q as f32).unwrap_or(defaults.quality),
    };
    let encoded = compress(input.as_ref(), &config).map_err(to_napi_error)?;

    Ok(JsEncodedImage {
        data: encoded.bytes.into(),
        media_type: encoded.media_type.to_string(),
        width: encoded.width,
        height: encoded.height,
    })
}

#[napi]
pub fn cosine_similarity(a: Vec<f64>, b: Vec<f64>) -> f64 {
    let a: Vec<f32> = a.into_iter().map(|v| v as f32).collect();
    let b: Vec<f32> = b.into_iter().map(|v| v as f32).collect();
    cosine(&a, &b) as f64
}

#[napi]
pub fn cluster_embeddings(items: Vec<JsEmbeddedAsset>, k: u32, seed: Option<i64>) -> Vec<JsCluster> {
    let assets: Vec<Asset> = items
        .into_iter()
        .map(|item| {
            let mut asset = Asset::new(String::new());
            asset.id = item.id;
            asset.embedding = item
                .embedding
                .map(|e| e.into_iter().map(|v| v as f32).collect());
            asset
        })
        .collect();

    let mut rng = match seed {
        Some(seed) => Pcg32::seed_from_u64(seed as u64),
        None => Pcg32::from_entropy(),
    };

    cluster_assets(&assets, k as usize, DEFAULT_MAX_ITERATIONS, &mut rng)
        .into_iter()
        .map(|cluster| JsCluster {
            centroid: cluster.centroid.iter().map(|&v| v as f64).collect(),
            asset_ids: cluster.assets.iter().map(|a| a.id.clone()).collect(),
        })
        .collect()
}
