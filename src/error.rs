//! Custom error types for tilecutter.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tilecutter library.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to decode a source image.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to encode or write a tile.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The source root is missing, not a directory, or unreadable.
    #[error("cannot read source directory {path}: {reason}")]
    SourceRoot { path: PathBuf, reason: String },

    /// A directory below the source root could not be listed.
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Failed to create an output directory.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read or rename the configuration file.
    #[error("failed to access config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON or has a value of the wrong type.
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Result type alias for tilecutter operations.
pub type Result<T> = std::result::Result<T, Error>;
