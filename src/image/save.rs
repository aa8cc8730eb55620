//! Tile saving utilities.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{DynamicImage, ImageError, ImageFormat};

use crate::error::{Error, Result};

/// Save a tile, creating its parent directories on demand.
///
/// The format is inferred from the extension of `path`. JPEG targets are
/// written through the JPEG encoder with the given `quality` and converted
/// to RGB first, since JPEG carries no alpha channel. The output is flushed
/// before returning, so write failures are reported rather than lost.
///
/// # Arguments
///
/// * `tile` - Cropped tile to write
/// * `path` - Output file path
/// * `quality` - JPEG quality (1-100), ignored for other formats
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the image cannot be saved.
pub fn save_tile<P: AsRef<Path>>(tile: &DynamicImage, path: P, quality: u8) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            fs::create_dir_all(parent).map_err(|source| Error::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let save_err = |source| Error::ImageSave {
        path: path.to_path_buf(),
        source,
    };

    let format = ImageFormat::from_path(path).map_err(save_err)?;
    let output = fs::File::create(path).map_err(|err| save_err(ImageError::IoError(err)))?;
    let mut writer = BufWriter::new(output);

    let written = match format {
        ImageFormat::Jpeg => {
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, quality);
            DynamicImage::ImageRgb8(tile.to_rgb8()).write_with_encoder(encoder)
        }
        _ => tile.write_to(&mut writer, format),
    };

    // Buffered bytes only hit the disk here; dropping the writer would discard the error.
    written
        .and_then(|()| writer.flush().map_err(ImageError::IoError))
        .map_err(save_err)?;

    tracing::info!("Saved image {}", path.display());
    Ok(())
}
