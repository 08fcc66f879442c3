//! Command-line front end for the creative analysis pipeline.

use std::path::{Path, PathBuf};
use std::process;

use adlens_rs::visual_analysis::clustering::Clusterer;
use adlens_rs::visual_analysis::config::AnalysisConfig;
use adlens_rs::visual_analysis::fingerprint::find_near_duplicates;
use adlens_rs::visual_analysis::palette::extract_image_features;
use adlens_rs::visual_analysis::report::{game_profiles, summarize_clusters, trend_summary};
use adlens_rs::visual_analysis::search::{FilterState, filter_assets};
use adlens_rs::visual_analysis::taxonomy::{GameGenre, HookType, VisualStyle};
use adlens_rs::visual_analysis::similarity::find_similar;
use adlens_rs::visual_analysis::transcode::{compress_image, to_lossless};
use adlens_rs::visual_analysis::Asset;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{LevelFilter, info};
use serde_json::json;

#[derive(Parser)]
#[command(name = "adlens", about = "Visual metadata, similarity and clustering for ad creatives")]
struct Cli {
    /// JSON file overriding the default analysis settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract dimensions, palette, brightness and contrast from images
    Meta {
        files: Vec<PathBuf>,
        /// Sample every Nth pixel
        #[arg(long)]
        stride: Option<usize>,
    },
    /// Shrink and recompress an image
    Compress {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        max_width: Option<u32>,
        /// Lossy quality in (0, 1]
        #[arg(long)]
        quality: Option<f32>,
        /// Write a PNG at full size instead
        #[arg(long)]
        lossless: bool,
    },
    /// Rank library assets by embedding similarity to one asset
    Similar {
        /// JSON array of assets
        #[arg(long)]
        library: PathBuf,
        #[arg(long)]
        target: String,
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// List assets whose visual fingerprint nearly matches one asset
    Duplicates {
        #[arg(long)]
        library: PathBuf,
        #[arg(long)]
        target: String,
        /// Maximum differing hash bits
        #[arg(long)]
        threshold: Option<u32>,
    },
    /// Group embedded assets with k-means over cosine similarity
    Cluster {
        #[arg(long)]
        library: PathBuf,
        #[arg(long)]
        k: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Hook and genre distribution of analysed assets
    Trends {
        #[arg(long)]
        library: PathBuf,
    },
    /// Find analysed assets by title or tag, narrowed by genre, hook and style
    Search {
        #[arg(long)]
        library: PathBuf,
        /// Matched against titles (any case) and tags
        query: Option<String>,
        /// Genre label or name; repeat to allow several
        #[arg(long)]
        genre: Vec<String>,
        #[arg(long)]
        hook: Vec<String>,
        #[arg(long)]
        style: Vec<String>,
    },
    /// Per-project volume, hook strength, top hooks and styles
    Profiles {
        #[arg(long)]
        library: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };

    match cli.command {
        Commands::Meta { files, stride } => {
            if let Some(stride) = stride {
                config.sampler.stride = stride;
            }
            cmd_meta(&files, &config)
        }
        Commands::Compress {
            input,
            output,
            max_width,
            quality,
            lossless,
        } => {
            if let Some(max_width) = max_width {
                config.transcode.max_width = max_width;
            }
            if let Some(quality) = quality {
                config.transcode.quality = quality;
            }
            cmd_compress(&input, &output, lossless, &config)
        }
        Commands::Similar {
            library,
            target,
            top_k,
        } => cmd_similar(&library, &target, top_k.unwrap_or(config.similar_top_k)),
        Commands::Duplicates {
            library,
            target,
            threshold,
        } => cmd_duplicates(
            &library,
            &target,
            threshold.unwrap_or(config.duplicate_threshold),
        ),
        Commands::Cluster { library, k, seed } => {
            if let Some(k) = k {
                config.clustering.k = k;
            }
            if seed.is_some() {
                config.clustering.seed = seed;
            }
            cmd_cluster(&library, &config)
        }
        Commands::Trends { library } => cmd_trends(&library),
        Commands::Search {
            library,
            query,
            genre,
            hook,
            style,
        } => {
            let filter = FilterState {
                search: query.unwrap_or_default(),
                genres: genre.iter().map(|g| GameGenre::parse(g)).collect(),
                hooks: hook.iter().map(|h| HookType::parse(h)).collect(),
                styles: style.iter().map(|s| VisualStyle::parse(s)).collect(),
            };
            cmd_search(&library, &filter)
        }
        Commands::Profiles { library } => cmd_profiles(&library),
    }
}

fn cmd_meta(files: &[PathBuf], config: &AnalysisConfig) -> Result<()> {
    // one unreadable file must not hide the results of the others
    let results: Vec<serde_json::Value> = files
        .iter()
        .map(|path| {
            let outcome = std::fs::read(path)
                .with_context(|| format!("Failed to read {:?}", path))
                .and_then(|bytes| Ok(extract_image_features(&bytes, &config.sampler)?));
            match outcome {
                Ok(features) => json!({ "file": path.display().to_string(), "features": features }),
                Err(e) => json!({ "file": path.display().to_string(), "error": format!("{:#}", e) }),
            }
        })
        .collect();

    print_json(&results)
}

fn cmd_compress(input: &Path, output: &Path, lossless: bool, config: &AnalysisConfig) -> Result<()> {
    let bytes = std::fs::read(input).with_context(|| format!("Failed to read {:?}", input))?;

    let encoded = if lossless {
        to_lossless(&bytes)?
    } else {
        compress_image(&bytes, &config.transcode)?
    };

    std::fs::write(output, &encoded.bytes)
        .with_context(|| format!("Failed to write {:?}", output))?;

    info!(
        "Wrote {} ({}x{}, {}, {} -> {} bytes)",
        output.display(),
        encoded.width,
        encoded.height,
        encoded.media_type,
        bytes.len(),
        encoded.bytes.len()
    );
    Ok(())
}

fn cmd_similar(library: &Path, target_id: &str, top_k: usize) -> Result<()> {
    let assets = load_library(library)?;
    let target = find_asset(&assets, target_id)?;

    let results: Vec<serde_json::Value> = find_similar(target, &assets, top_k)
        .into_iter()
        .map(|r| json!({ "id": r.asset.id, "fileName": r.asset.file_name, "score": r.score }))
        .collect();

    print_json(&results)
}

fn cmd_duplicates(library: &Path, target_id: &str, threshold: u32) -> Result<()> {
    let assets = load_library(library)?;
    let target = find_asset(&assets, target_id)?;

    let results: Vec<serde_json::Value> = find_near_duplicates(target, &assets, threshold)
        .into_iter()
        .map(|(asset, distance)| {
            json!({ "id": asset.id, "fileName": asset.file_name, "distance": distance })
        })
        .collect();

    print_json(&results)
}

fn cmd_cluster(library: &Path, config: &AnalysisConfig) -> Result<()> {
    let assets = load_library(library)?;
    let clusters = Clusterer::new(config.clustering).run(&assets);

    if clusters.is_empty() {
        info!(
            "Not enough embedded assets for k={}",
            config.clustering.k
        );
    }

    print_json(&summarize_clusters(&clusters))
}

fn cmd_trends(library: &Path) -> Result<()> {
    let assets = load_library(library)?;
    match trend_summary(&assets) {
        Some(summary) => print_json(&summary),
        None => {
            println!("Not enough analysed assets: at least 2 are needed for a trend report");
            Ok(())
        }
    }
}

fn cmd_search(library: &Path, filter: &FilterState) -> Result<()> {
    let assets = load_library(library)?;

    let results: Vec<serde_json::Value> = filter_assets(&assets, filter)
        .into_iter()
        .map(|asset| {
            let title = asset.analysis.as_ref().map(|a| a.title.as_str());
            json!({ "id": asset.id, "fileName": asset.file_name, "title": title })
        })
        .collect();

    print_json(&results)
}

fn cmd_profiles(library: &Path) -> Result<()> {
    let assets = load_library(library)?;
    print_json(&game_profiles(&assets))
}

fn load_library(path: &Path) -> Result<Vec<Asset>> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read library {:?}", path))?;
    serde_json::from_str(&raw).context("Failed to parse asset library")
}

fn find_asset<'a>(assets: &'a [Asset], id: &str) -> Result<&'a Asset> {
    assets
        .iter()
        .find(|a| a.id == id)
        .with_context(|| format!("No asset with id {}", id))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
