//! Crop and save the tiles of one image.

use image::{DynamicImage, GenericImageView};

use crate::error::Result;
use crate::image::save_tile;
use crate::tree::TilePattern;

use super::layout::{plan, Layout, LayoutStrategy, TileSize};

/// Outcome of tiling one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileReport {
    /// The image is smaller than one tile; nothing was written.
    TooSmall { width: u32, height: u32 },
    /// `count` tiles were written.
    Written { count: usize },
}

/// Cuts images into tiles of a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct Tiler {
    tile: TileSize,
    strategy: LayoutStrategy,
    quality: u8,
}

impl Tiler {
    #[must_use]
    pub const fn new(tile: TileSize, strategy: LayoutStrategy, quality: u8) -> Self {
        Self {
            tile,
            strategy,
            quality,
        }
    }

    /// Crop `image` into tiles and save each one to `pattern.path_for(i)`,
    /// numbering from 1 in emission order.
    ///
    /// # Errors
    ///
    /// Returns an error if a tile cannot be saved. Tiles written before the
    /// failure are left in place.
    pub fn tile_image(&self, image: &DynamicImage, pattern: &TilePattern) -> Result<TileReport> {
        let (width, height) = image.dimensions();

        tracing::debug!("Image is {width}x{height} in {} tiles.", self.tile);

        let layout = plan(width, height, self.tile, self.strategy);
        let Layout::Grid {
            columns,
            rows,
            rects,
        } = layout
        else {
            tracing::warn!("Image too small ({width}x{height} < {}).", self.tile);
            return Ok(TileReport::TooSmall { width, height });
        };

        tracing::debug!("Cutting {columns}x{rows} tiles to {pattern}");

        for (i, rect) in rects.iter().enumerate() {
            tracing::debug!("Tile {}: {rect}", i + 1);
            let tile = image.crop_imm(rect.x0, rect.y0, rect.width(), rect.height());
            save_tile(&tile, pattern.path_for(i + 1), self.quality)?;
        }

        Ok(TileReport::Written { count: rects.len() })
    }
}
