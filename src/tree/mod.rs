//! Source tree discovery and output path mirroring.

mod walker;

pub use walker::{SourceDir, SourceImage, SourceTree, TilePattern};
