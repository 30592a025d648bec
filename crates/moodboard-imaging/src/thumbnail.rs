use image::RgbaImage;
use image::imageops::{self, FilterType};

pub const GALLERY_TILE: (u32, u32) = (180, 130);
pub const BOARD_PLACEMENT: (u32, u32) = (300, 300);
pub const PREVIEW: (u32, u32) = (600, 420);
pub const SELECTION_PREVIEW: (u32, u32) = (360, 300);

/// Largest size with the same aspect ratio that fits inside the box.
/// Never grows the image.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let max_width = max_width.max(1);
    let max_height = max_height.max(1);

    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = f64::min(
        f64::from(max_width) / f64::from(width),
        f64::from(max_height) / f64::from(height),
    );
    let w = (f64::from(width) * scale).round() as u32;
    let h = (f64::from(height) * scale).round() as u32;
    (w.clamp(1, max_width), h.clamp(1, max_height))
}

/// Proportionally scaled copy that fits inside `(max_width, max_height)`.
pub fn thumbnail(img: &RgbaImage, max_width: u32, max_height: u32) -> RgbaImage {
    let (w, h) = fit_within(img.width(), img.height(), max_width, max_height);
    if (w, h) == img.dimensions() {
        return img.clone();
    }
    imageops::resize(img, w, h, FilterType::CatmullRom)
}
