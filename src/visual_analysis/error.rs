use thiserror::Error;

/// Failures of the deterministic image pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Source bytes could not be decoded as an image.
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// A raster of the requested size could not be set up.
    #[error("Raster unavailable for {width}x{height} image")]
    RasterUnavailable { width: u32, height: u32 },

    /// Re-encoding the decoded image failed.
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// Lossy quality must lie in (0, 1].
    #[error("Quality out of range (0, 1]: {0}")]
    InvalidQuality(f32),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
