use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest side of the raster the sampler works on
pub const DEFAULT_MAX_SAMPLE_SIDE: u32 = 200;

/// Every Nth pixel is sampled. Lower is more precise, higher is faster.
pub const DEFAULT_SAMPLE_STRIDE: usize = 5;

pub const DEFAULT_MAX_WIDTH: u32 = 1024;
pub const DEFAULT_QUALITY: f32 = 0.85;

pub const DEFAULT_CLUSTER_COUNT: usize = 3;
pub const DEFAULT_MAX_ITERATIONS: usize = 20;

pub const DEFAULT_TOP_K: usize = 4;

/// Blockhash bits (out of 64) two near-duplicates may differ by
pub const DEFAULT_DUPLICATE_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub max_side: u32,
    pub stride: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_side: DEFAULT_MAX_SAMPLE_SIDE,
            stride: DEFAULT_SAMPLE_STRIDE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    pub max_width: u32,
    /// Lossy quality in (0, 1]
    pub quality: f32,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            quality: DEFAULT_QUALITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub k: usize,
    pub max_iterations: usize,
    /// Fixed shuffle seed; `None` draws from system entropy
    pub seed: Option<u64>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_CLUSTER_COUNT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
        }
    }
}

/// Tunables for the whole analysis pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub sampler: SamplerConfig,
    pub transcode: TranscodeConfig,
    pub clustering: ClusterConfig,
    pub similar_top_k: usize,
    pub duplicate_threshold: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sampler: SamplerConfig::default(),
            transcode: TranscodeConfig::default(),
            clustering: ClusterConfig::default(),
            similar_top_k: DEFAULT_TOP_K,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
        }
    }
}

impl AnalysisConfig {
    /// Load from a JSON file; missing keys keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config {:?}", path.as_ref()))?;
        let config = serde_json::from_str(&raw).context("Failed to parse config")?;
        Ok(config)
    }
}
