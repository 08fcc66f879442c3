pub mod clustering;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod ingest;
pub mod palette;
pub mod report;
pub mod repository;
pub mod search;
pub mod similarity;
pub mod taxonomy;
pub mod transcode;

use serde::{Deserialize, Serialize};

pub use error::{AnalysisError, Result};
use taxonomy::SemanticAnalysis;

/// One dominant color of an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorData {
    /// `#rrggbb`, taken from a real sampled pixel
    pub hex: String,
    /// Share of sampled pixels, 0-100
    pub percentage: u8,
    pub is_warm: bool,
}

/// Closest reference aspect ratio of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "16:9")]
    Landscape16x9,
}

impl AspectRatio {
    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Landscape16x9 => "16:9",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Objective metadata computed from pixels, never from a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedMeta {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: AspectRatio,
    /// Hex codes, most dominant first
    pub dominant_colors: Vec<String>,
    pub brightness: u8,
    pub contrast: u8,
    /// Perceptual hash used for near-duplicate detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Vec<u8>>,
}

/// Full output of the pixel sampler: the stored meta plus the detailed palette
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFeatures {
    pub meta: ComputedMeta,
    pub palette: Vec<ColorData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

/// A creative asset as tracked by the library
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub file_name: String,
    pub upload_date: String,
    #[serde(default)]
    pub computed_meta: Option<ComputedMeta>,
    #[serde(default)]
    pub analysis: Option<SemanticAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub status: AssetStatus,
}

impl Asset {
    /// New pending asset with a fresh id, uploaded now
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_name: file_name.into(),
            upload_date: chrono::Utc::now().to_rfc3339(),
            computed_meta: None,
            analysis: None,
            embedding: None,
            status: AssetStatus::Pending,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == AssetStatus::Completed
    }
}

/// Candidate scored against a query asset
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityResult<'a> {
    pub asset: &'a Asset,
    pub score: f32,
}

/// Group of assets sharing a centroid, recomputed on every clustering run
#[derive(Debug, Clone, Serialize)]
pub struct Cluster<'a> {
    pub centroid: Vec<f32>,
    pub assets: Vec<&'a Asset>,
}
