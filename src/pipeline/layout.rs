//! Tile grid layout.
//!
//! Decomposes a `W x H` image into a grid of equally sized crop rectangles.
//! When the image is not an exact multiple of the tile size, the leftover
//! pixels are spread across the tile origins so neighbouring tiles overlap
//! slightly instead of leaving one ragged tile at the edge.

use std::fmt;

use crate::error::{Error, Result};

/// Target tile size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    /// Create a tile size.
    ///
    /// # Errors
    ///
    /// Returns an error if either edge is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidParameter {
                name: "size".to_string(),
                reason: format!("tile edges must be positive, got {width}x{height}"),
            });
        }
        Ok(Self { width, height })
    }

    /// Create a square tile size.
    ///
    /// # Errors
    ///
    /// Returns an error if `edge` is zero.
    pub fn square(edge: u32) -> Result<Self> {
        Self::new(edge, edge)
    }
}

impl fmt::Display for TileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel bounds of one tile, half-open: `x0..x1`, `y0..y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CropRect {
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}-{}x{}", self.x0, self.y0, self.x1, self.y1)
    }
}

/// How tile origins are placed along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LayoutStrategy {
    /// `len / tile + 1` tiles per axis with the remainder spread as overlap.
    ///
    /// Always emits one extra row/column, even when the image is an exact
    /// multiple of the tile size. Output-compatible with earlier tile sets.
    #[default]
    Spread,
    /// `ceil(len / tile)` tiles per axis; overlap only when the length is
    /// not an exact multiple of the tile size.
    Cover,
    /// `len / tile` tiles per axis without overlap; the ragged remainder at
    /// the right/bottom edge is discarded.
    Trim,
}

impl LayoutStrategy {
    /// Tile origins along one axis of length `len`. Requires `len >= tile`.
    fn origins(self, len: u32, tile: u32) -> Vec<u32> {
        let whole = len / tile;
        match self {
            Self::Spread => spaced_origins(len, tile, whole),
            Self::Cover => spaced_origins(len, tile, len.div_ceil(tile) - 1),
            Self::Trim => (0..whole).map(|i| i * tile).collect(),
        }
    }
}

/// `steps + 1` origins from `0` to `len - tile`, evenly spaced and floored.
///
/// Equivalent to `i * tile - i * (tile - len % tile) / (len / tile)` when
/// `steps == len / tile`, computed without fractions.
#[allow(clippy::cast_possible_truncation)]
fn spaced_origins(len: u32, tile: u32, steps: u32) -> Vec<u32> {
    if steps == 0 {
        return vec![0];
    }
    let span = u64::from(len - tile);
    (0..=steps)
        // Safe: the quotient never exceeds `len - tile`, which fits in u32
        .map(|i| (u64::from(i) * span / u64::from(steps)) as u32)
        .collect()
}

/// Result of laying out one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// The image is smaller than one tile in at least one dimension.
    TooSmall,
    /// Crop rectangles in emission order (column-major).
    Grid {
        columns: u32,
        rows: u32,
        rects: Vec<CropRect>,
    },
}

impl Layout {
    /// Crop rectangles in emission order; empty for [`Layout::TooSmall`].
    #[must_use]
    pub fn rects(&self) -> &[CropRect] {
        match self {
            Self::TooSmall => &[],
            Self::Grid { rects, .. } => rects,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rects().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects().is_empty()
    }
}

/// Lay out tiles of size `tile` over an image of `width x height` pixels.
///
/// Rectangles are emitted column-major: the outer loop walks columns, the
/// inner loop walks rows. Every rectangle is exactly `tile` in size and lies
/// inside the image.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn plan(width: u32, height: u32, tile: TileSize, strategy: LayoutStrategy) -> Layout {
    if width < tile.width || height < tile.height {
        return Layout::TooSmall;
    }

    let xs = strategy.origins(width, tile.width);
    let ys = strategy.origins(height, tile.height);

    let rects = xs
        .iter()
        .flat_map(|&x0| {
            ys.iter().map(move |&y0| {
                clamp_to_bounds(
                    CropRect {
                        x0,
                        y0,
                        x1: x0 + tile.width,
                        y1: y0 + tile.height,
                    },
                    width,
                    height,
                )
            })
        })
        .collect();

    Layout::Grid {
        // Safe: at most `len / tile + 1` origins per axis
        columns: xs.len() as u32,
        rows: ys.len() as u32,
        rects,
    }
}

/// Shift a rectangle back inside the image if it overflows the far edge.
fn clamp_to_bounds(rect: CropRect, width: u32, height: u32) -> CropRect {
    let mut clamped = rect;
    if rect.x1 > width {
        tracing::warn!("Tile width is {}, but maximum is {width}; clamping", rect.x1);
        clamped.x0 = width - rect.width();
        clamped.x1 = width;
    }
    if rect.y1 > height {
        tracing::warn!("Tile height is {}, but maximum is {height}; clamping", rect.y1);
        clamped.y0 = height - rect.height();
        clamped.y1 = height;
    }
    clamped
}
