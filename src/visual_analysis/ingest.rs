use super::config::AnalysisConfig;
use super::fingerprint::visual_fingerprint;
use super::palette::features_from_image;
use super::repository::AssetRepository;
use super::taxonomy::SemanticAnalysis;
use super::transcode::{EncodedImage, compress_decoded, decode_image};
use super::{Asset, AssetStatus};
use anyhow::{Context, Result};
use log::{debug, info, warn};

/// Produces a semantic description of an image (usually a remote model)
pub trait Describer {
    fn describe(&self, image: &EncodedImage) -> Result<SemanticAnalysis>;
}

/// Turns descriptive text into an embedding vector
pub trait Embedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// What happened to a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Completed(String),
    Failed(String),
    /// A completed asset with the same file name already exists
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub completed: Vec<String>,
    pub failed: Vec<String>,
    pub skipped: Vec<String>,
}

/// Drives one file through metadata extraction, description and embedding
pub struct Ingestor<D, E> {
    describer: D,
    embedder: E,
    config: AnalysisConfig,
}

impl<D: Describer, E: Embedder> Ingestor<D, E> {
    pub fn new(describer: D, embedder: E, config: AnalysisConfig) -> Self {
        Self {
            describer,
            embedder,
            config,
        }
    }

    /// Ingest a single file. Failures are recorded on the asset, never raised.
    pub fn ingest<R: AssetRepository>(
        &self,
        repo: &mut R,
        file_name: &str,
        bytes: &[u8],
    ) -> IngestOutcome {
        let mut asset = Asset::new(file_name);
        asset.status = AssetStatus::Processing;

        if !repo.add(asset.clone()) {
            info!("Skipping {}: already in the library", file_name);
            return IngestOutcome::Skipped;
        }

        match self.process(repo, &mut asset, bytes) {
            Ok(()) => {
                asset.status = AssetStatus::Completed;
                repo.update(asset.clone());
                info!("Completed processing: {}", file_name);
                IngestOutcome::Completed(asset.id)
            }
            Err(err) => {
                warn!("Processing failed for {}: {:#}", file_name, err);
                asset.status = AssetStatus::Failed;
                repo.update(asset.clone());
                IngestOutcome::Failed(asset.id)
            }
        }
    }

    /// Ingest every file; one failure does not stop the rest
    pub fn ingest_batch<R, I, N, B>(&self, repo: &mut R, files: I) -> IngestReport
    where
        R: AssetRepository,
        I: IntoIterator<Item = (N, B)>,
        N: AsRef<str>,
        B: AsRef<[u8]>,
    {
        let mut report = IngestReport::default();
        for (name, bytes) in files {
            match self.ingest(repo, name.as_ref(), bytes.as_ref()) {
                IngestOutcome::Completed(id) => report.completed.push(id),
                IngestOutcome::Failed(id) => report.failed.push(id),
                IngestOutcome::Skipped => report.skipped.push(name.as_ref().to_string()),
            }
        }

        info!(
            "Ingested batch: {} completed, {} failed, {} skipped",
            report.completed.len(),
            report.failed.len(),
            report.skipped.len()
        );
        report
    }

    fn process<R: AssetRepository>(
        &self,
        repo: &mut R,
        asset: &mut Asset,
        bytes: &[u8],
    ) -> Result<()> {
        let img = decode_image(bytes)?;
        let features = features_from_image(&img, &self.config.sampler)?;

        let mut meta = features.meta;
        meta.fingerprint = visual_fingerprint(&img);
        if meta.fingerprint.is_none() {
            warn!("No fingerprint for {}", asset.file_name);
        }
        asset.computed_meta = Some(meta);
        // metadata is visible before the slow remote steps finish
        repo.update(asset.clone());

        let encoded = compress_decoded(&img, &self.config.transcode)?;
        debug!(
            "Transcoded {} to {}x{} ({} bytes)",
            asset.file_name,
            encoded.width,
            encoded.height,
            encoded.bytes.len()
        );

        let mut analysis = self
            .describer
            .describe(&encoded)
            .context("Semantic analysis failed")?;
        analysis.visual.real_color_palette = features.palette;

        asset.embedding = match self.embedder.embed(&analysis.embedding_text()) {
            Ok(vector) if !vector.is_empty() => Some(vector),
            Ok(_) => {
                warn!("Empty embedding for {}", asset.file_name);
                None
            }
            Err(err) => {
                warn!("Embedding failed for {}: {:#}", asset.file_name, err);
                None
            }
        };
        asset.analysis = Some(analysis);

        Ok(())
    }
}
