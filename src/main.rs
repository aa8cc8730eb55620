//! tilecutter CLI - cut a tree of images into fixed-size tiles.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tilecutter::pipeline::{
    default_config_path, normalize_extension, overlay, parse_extension_list,
    DEFAULT_TARGET_EXTENSION, DEFAULT_TILE_SIZE,
};
use tilecutter::image::DEFAULT_JPEG_QUALITY;
use tilecutter::{Config, LayoutStrategy, Pipeline};

/// Create square tiles from every image in a directory tree.
#[derive(Parser, Debug)]
#[command(name = "tilecutter")]
#[command(version, about, long_about = None)]
struct Args {
    /// Root of the source image tree.
    #[arg(value_name = "SOURCE_DIR", default_value = ".")]
    source_dir: PathBuf,

    /// Root of the mirrored output tree.
    #[arg(value_name = "TARGET_DIR", default_value = "./converted/")]
    target_dir: PathBuf,

    /// Tile edge length in pixels.
    #[arg(value_name = "SIZE", default_value_t = DEFAULT_TILE_SIZE)]
    size: u32,

    /// JSON config file overriding source_dir, target_dir and size.
    /// Defaults to the program name with a `.cfg` extension.
    #[arg(long, value_name = "PATH")]
    config_file: Option<PathBuf>,

    /// Rename the config file to `<file>.done` once it has been applied.
    #[arg(long)]
    config_once: bool,

    /// Log level (error, warn, info, debug, trace). `RUST_LOG` takes precedence.
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    log_level: String,

    /// Source image extensions, comma separated. Defaults to every decodable format.
    #[arg(long, value_name = "LIST")]
    source_extensions: Option<String>,

    /// Extension of written tiles; a leading dot is added if missing.
    #[arg(long, default_value = DEFAULT_TARGET_EXTENSION, value_name = "EXT")]
    target_extension: String,

    /// Placement of tile origins.
    #[arg(long, value_enum, default_value_t = LayoutStrategy::Spread)]
    layout: LayoutStrategy,

    /// JPEG quality (1-100) when writing `.jpg` tiles.
    #[arg(short, long, default_value_t = DEFAULT_JPEG_QUALITY, value_name = "INT")]
    quality: u8,

    /// Do not show the progress spinner.
    #[arg(long)]
    no_progress: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("tilecutter={}", args.log_level).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    let mut config = Config {
        source_dir: args.source_dir.clone(),
        target_dir: args.target_dir.clone(),
        size: args.size,
        target_extension: normalize_extension(&args.target_extension),
        layout: args.layout,
        quality: args.quality,
        ..Config::default()
    };
    if let Some(list) = &args.source_extensions {
        config.source_extensions = parse_extension_list(list);
    }

    let config_file = args.config_file.clone().unwrap_or_else(default_config_path);
    let (config, report) = overlay(config, &config_file, args.config_once)
        .with_context(|| format!("Failed to apply config file {}", config_file.display()))?;
    if !report.ignored.is_empty() {
        tracing::debug!("Ignored config keys: {}", report.ignored.join(", "));
    }

    tracing::debug!("{config:?}");

    let mut pipeline = Pipeline::new(config).context("Failed to initialize pipeline")?;
    if !args.no_progress {
        pipeline = pipeline.with_progress();
    }

    let summary = pipeline.run();

    println!(
        "Tiled {} -> {}: {summary}",
        pipeline.config().source_dir.display(),
        pipeline.config().target_dir.display()
    );

    Ok(())
}
