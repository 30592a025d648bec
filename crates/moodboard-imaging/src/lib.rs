//! Image handling for the mood board: the adjustment pipeline, bounded
//! thumbnails, and the per-user file store for edited images.
//!
//! Everything works on RGBA8 buffers. Images are normalised to that layout on
//! load so the pipeline never has to care what the source file was.

pub mod filters;
pub mod storage;
pub mod thumbnail;

use std::path::Path;

use image::{ImageError, RgbaImage};
use moodboard_types::MoodboardError;

pub use filters::apply_filters;
pub use storage::ImageStore;
pub use thumbnail::thumbnail;

/// Open any supported image file as RGBA8.
pub fn open_rgba(path: &Path) -> Result<RgbaImage, MoodboardError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(map_image_error)
}

pub(crate) fn map_image_error(err: ImageError) -> MoodboardError {
    match err {
        ImageError::IoError(io) => MoodboardError::Io(io),
        other => MoodboardError::image(other.to_string()),
    }
}
