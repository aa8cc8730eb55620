//! # tilecutter
//!
//! Cut every image in a directory tree into fixed-size tiles, written under
//! a mirrored output tree.
//!
//! Each source image `source/sub/name.ext` becomes `target/sub/name-001.png`,
//! `name-002.png`, ... in column-major order. When an image is not an exact
//! multiple of the tile size, the leftover pixels are spread across the tile
//! origins so neighbouring tiles overlap slightly and every tile has the
//! same size.
//!
//! ## Example
//!
//! ```no_run
//! use tilecutter::{Config, Pipeline};
//!
//! # fn main() -> tilecutter::Result<()> {
//! let config = Config {
//!     source_dir: "photos".into(),
//!     target_dir: "tiles".into(),
//!     size: 256,
//!     ..Config::default()
//! };
//! let summary = Pipeline::new(config)?.run();
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod image;
pub mod pipeline;
pub mod tree;

pub use error::{Error, Result};
pub use pipeline::{Config, LayoutStrategy, Pipeline, RunSummary, TileSize};
