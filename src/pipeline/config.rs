//! Run configuration.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::image::{decodable_extensions, DEFAULT_JPEG_QUALITY};

use super::layout::{LayoutStrategy, TileSize};

/// Default square tile edge in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 512;

/// Default output extension.
pub const DEFAULT_TARGET_EXTENSION: &str = ".png";

/// Configuration for one tiling run.
///
/// Built once from CLI arguments and the optional config file, then passed
/// by reference to every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the source image tree.
    pub source_dir: PathBuf,

    /// Root of the mirrored output tree.
    pub target_dir: PathBuf,

    /// Square tile edge length in pixels.
    pub size: u32,

    /// Allow-listed source extensions, lowercase with a leading dot.
    pub source_extensions: Vec<String>,

    /// Extension of written tiles, with a leading dot.
    pub target_extension: String,

    /// Placement of tile origins.
    pub layout: LayoutStrategy,

    /// JPEG quality (1-100) for JPEG targets.
    pub quality: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            target_dir: PathBuf::from("./converted/"),
            size: DEFAULT_TILE_SIZE,
            source_extensions: decodable_extensions(),
            target_extension: DEFAULT_TARGET_EXTENSION.to_string(),
            layout: LayoutStrategy::default(),
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(Error::InvalidParameter {
                name: "size".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.source_extensions.is_empty() {
            return Err(Error::InvalidParameter {
                name: "source_extensions".to_string(),
                reason: "at least one extension is required".to_string(),
            });
        }

        if self.target_extension.len() < 2 || !self.target_extension.starts_with('.') {
            return Err(Error::InvalidParameter {
                name: "target_extension".to_string(),
                reason: format!("{:?} is not an extension", self.target_extension),
            });
        }

        if !(1..=100).contains(&self.quality) {
            return Err(Error::InvalidParameter {
                name: "quality".to_string(),
                reason: "must be between 1 and 100".to_string(),
            });
        }

        Ok(())
    }

    /// Square tile size for this run.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero.
    pub fn tile_size(&self) -> Result<TileSize> {
        TileSize::square(self.size)
    }
}

/// Prefix `ext` with a dot if it lacks one.
#[must_use]
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}

/// Split a comma-separated extension list, lowercasing and dot-prefixing
/// each entry. Empty entries are dropped.
#[must_use]
pub fn parse_extension_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|ext| !ext.is_empty() && *ext != ".")
        .map(|ext| normalize_extension(&ext.to_lowercase()))
        .collect()
}

/// Config file path derived from the program name: `argv[0]` with its
/// extension replaced by `.cfg`.
#[must_use]
pub fn default_config_path() -> PathBuf {
    std::env::args_os()
        .next()
        .map_or_else(|| PathBuf::from("tilecutter"), PathBuf::from)
        .with_extension("cfg")
}
