//! Image loading and tile saving utilities.

mod load;
mod save;

pub use load::{decodable_extensions, load_image};
pub use save::save_tile;

/// Default JPEG quality used when a run targets `.jpg`/`.jpeg`.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;
