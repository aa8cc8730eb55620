//! Image loading utilities.

use std::path::Path;

use image::{DynamicImage, ImageFormat};

use crate::error::{Error, Result};

/// Decode an image from disk.
///
/// The format is guessed from the file contents first and the extension
/// second, so a mislabelled file still decodes when the codec is enabled.
///
/// # Errors
///
/// Returns [`Error::ImageLoad`] if the file cannot be opened or decoded.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();

    let reader = image::ImageReader::open(path)
        .and_then(image::ImageReader::with_guessed_format)
        .map_err(|source| Error::ImageLoad {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(source),
        })?;

    reader.decode().map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Every file extension the enabled decoders understand, lowercase, with a
/// leading dot, sorted and deduplicated.
#[must_use]
pub fn decodable_extensions() -> Vec<String> {
    let mut extensions: Vec<String> = ImageFormat::all()
        .filter(ImageFormat::reading_enabled)
        .flat_map(ImageFormat::extensions_str)
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .collect();
    extensions.sort();
    extensions.dedup();
    extensions
}
