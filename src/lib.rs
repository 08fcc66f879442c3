#![deny(clippy::all)]

pub mod visual_analysis;

#[cfg(feature = "node")]
mod node;

pub use visual_analysis::clustering::{Clusterer, cluster_assets};
pub use visual_analysis::config::AnalysisConfig;
pub use visual_analysis::palette::extract_image_features;
pub use visual_analysis::search::{FilterState, filter_assets};
pub use visual_analysis::similarity::{cosine_similarity, find_similar};
pub use visual_analysis::transcode::{compress_image, to_lossless};
pub use visual_analysis::{
    AnalysisError, Asset, AssetStatus, Cluster, ColorData, ComputedMeta, ImageFeatures,
    SimilarityResult,
};
