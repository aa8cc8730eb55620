//! Tile layout, configuration and the tree-wide tiling run.

mod config;
mod layout;
mod overlay;
mod runner;
mod tiler;

pub use config::{
    default_config_path, normalize_extension, parse_extension_list, Config,
    DEFAULT_TARGET_EXTENSION, DEFAULT_TILE_SIZE,
};
pub use layout::{plan, CropRect, Layout, LayoutStrategy, TileSize};
pub use overlay::{overlay, OverlayReport, CONSUMED_SUFFIX, OVERRIDABLE_KEYS};
pub use runner::{Pipeline, RunSummary};
pub use tiler::{TileReport, Tiler};
