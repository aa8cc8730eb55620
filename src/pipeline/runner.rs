//! Tree-wide tiling run.

use std::fmt;
use std::fs;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{Error, Result};
use crate::image::load_image;
use crate::tree::{SourceImage, SourceTree};

use super::config::Config;
use super::tiler::{TileReport, Tiler};

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Images discovered by the walk.
    pub images: usize,
    /// Images cut into at least one tile.
    pub tiled: usize,
    /// Images skipped for being smaller than one tile.
    pub too_small: usize,
    /// Images that failed to decode or save.
    pub failed: usize,
    /// Tiles written.
    pub tiles: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} images: {} tiled into {} tiles, {} too small, {} failed",
            self.images, self.tiled, self.tiles, self.too_small, self.failed
        )
    }
}

/// Walks a source tree and tiles every image in it.
pub struct Pipeline {
    config: Config,
    tree: SourceTree,
    tiler: Tiler,
    progress: ProgressBar,
}

impl Pipeline {
    /// Create a pipeline for the given configuration.
    ///
    /// Creates the target directory if needed and excludes it from the walk
    /// when it is nested in the source directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the source directory
    /// cannot be read, or the target directory cannot be created.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tracing::debug!("Initializing pipeline with config: {config:?}");

        let tree = SourceTree::open(&config.source_dir, &config.source_extensions)?;
        let tiler = Tiler::new(config.tile_size()?, config.layout, config.quality);

        fs::create_dir_all(&config.target_dir).map_err(|source| Error::CreateDir {
            path: config.target_dir.clone(),
            source,
        })?;
        let tree = tree.exclude(&config.target_dir);

        Ok(Self {
            config,
            tree,
            tiler,
            progress: ProgressBar::hidden(),
        })
    }

    /// Show a spinner on stderr while the run progresses.
    #[must_use]
    pub fn with_progress(mut self) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} Tiling [{elapsed_precise}] {pos} images {msg}")
                .expect("valid template"),
        );
        self.progress = pb;
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Tile every image in the source tree.
    ///
    /// Per-file failures are logged and counted; they never stop the walk.
    pub fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        for dir in self.tree.directories() {
            tracing::info!(
                "{}: {}/{} images.",
                dir.path.display(),
                dir.images.len(),
                dir.file_count
            );

            for image in &dir.images {
                summary.images += 1;
                match self.process_image(image) {
                    Ok(TileReport::Written { count }) => {
                        summary.tiled += 1;
                        summary.tiles += count;
                    }
                    Ok(TileReport::TooSmall { .. }) => summary.too_small += 1,
                    Err(err) => {
                        tracing::error!("Skipping {}: {err}", image.path().display());
                        summary.failed += 1;
                    }
                }
                self.progress.inc(1);
                self.progress.set_message(format!("({} tiles)", summary.tiles));
            }
        }

        self.progress.finish_and_clear();
        tracing::info!("Done: {summary}");
        summary
    }

    /// Decode one image and write its tiles under the mirrored target path.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be decoded or a tile cannot be
    /// saved.
    pub fn process_image(&self, image: &SourceImage) -> Result<TileReport> {
        tracing::info!("Processing file {}", image.path().display());

        let pattern = image.tile_pattern(&self.config.target_dir, &self.config.target_extension);
        tracing::debug!("{} -> {pattern}", image.path().display());

        let decoded = load_image(image.path())?;
        self.tiler.tile_image(&decoded, &pattern)
    }
}
