use image::{Rgba, RgbaImage, imageops};
use moodboard_types::models::FilterSettings;
use tracing::debug;

/// Blur radii at or below this are treated as no blur.
pub const BLUR_EPSILON: f32 = 0.01;

/// Enhancement factors within this distance of 1.0 are treated as neutral.
pub const ENHANCE_EPSILON: f32 = 1e-3;

/// Produce a working image from an untouched original.
///
/// Steps run in a fixed order: grayscale, Gaussian blur, brightness,
/// contrast. Each step is skipped when its setting is neutral, so neutral
/// settings hand back a pixel-identical copy of `source`. Callers always pass
/// the original, never a previous result, which keeps repeated adjustments
/// from compounding rounding error.
pub fn apply_filters(source: &RgbaImage, settings: &FilterSettings) -> RgbaImage {
    debug!(
        grayscale = settings.grayscale,
        blur = settings.blur,
        brightness = settings.brightness,
        contrast = settings.contrast,
        "Applying filters to {}x{} image",
        source.width(),
        source.height()
    );

    let mut img = if settings.grayscale {
        grayscale(source)
    } else {
        source.clone()
    };

    if settings.blur > BLUR_EPSILON {
        img = imageops::blur(&img, settings.blur);
    }

    if (settings.brightness - 1.0).abs() > ENHANCE_EPSILON {
        brightness(&mut img, settings.brightness);
    }

    if (settings.contrast - 1.0).abs() > ENHANCE_EPSILON {
        contrast(&mut img, settings.contrast);
    }

    img
}

/// ITU-R 601-2 luma, fixed point. The weights sum to 65536 so white stays 255.
pub fn luma(px: &Rgba<u8>) -> u8 {
    let [r, g, b, _] = px.0;
    ((u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000) >> 16) as u8
}

/// Collapse to a single luma channel and expand back to RGBA.
///
/// Going through one channel drops transparency, so alpha comes back opaque.
pub fn grayscale(source: &RgbaImage) -> RgbaImage {
    let mut out = source.clone();
    for px in out.pixels_mut() {
        let l = luma(px);
        *px = Rgba([l, l, l, u8::MAX]);
    }
    out
}

/// Scale colour channels towards black (`factor < 1`) or away from it.
pub fn brightness(img: &mut RgbaImage, factor: f32) {
    for px in img.pixels_mut() {
        for c in 0..3 {
            px.0[c] = blend(0.0, px.0[c], factor);
        }
    }
}

/// Scale colour channels towards or away from the image's mean gray.
pub fn contrast(img: &mut RgbaImage, factor: f32) {
    let count = u64::from(img.width()) * u64::from(img.height());
    if count == 0 {
        return;
    }

    let sum: u64 = img.pixels().map(|px| u64::from(luma(px))).sum();
    let mean = (sum as f64 / count as f64 + 0.5).floor() as f32;

    for px in img.pixels_mut() {
        for c in 0..3 {
            px.0[c] = blend(mean, px.0[c], factor);
        }
    }
}

/// Linear interpolation from `base` towards (and past) `value`, clipped to the
/// channel range and truncated.
fn blend(base: f32, value: u8, factor: f32) -> u8 {
    let out = base + factor * (f32::from(value) - base);
    if out <= 0.0 {
        0
    } else if out >= 255.0 {
        u8::MAX
    } else {
        out as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(16, 12, |x, y| {
            Rgba([(x * 15) as u8, (y * 20) as u8, ((x + y) * 7) as u8, 200])
        })
    }

    #[test]
    fn neutral_settings_are_identity() {
        let src = sample();
        let out = apply_filters(&src, &FilterSettings::neutral());
        assert_eq!(out, src);
    }

    #[test]
    fn near_neutral_values_are_skipped() {
        let src = sample();
        let settings = FilterSettings {
            grayscale: false,
            blur: 0.005,
            brightness: 1.0005,
            contrast: 0.9995,
        };
        assert_eq!(apply_filters(&src, &settings), src);
    }

    #[test]
    fn pipeline_is_deterministic() {
        let src = sample();
        let settings = FilterSettings {
            grayscale: true,
            blur: 2.0,
            brightness: 1.3,
            contrast: 0.7,
        };
        let a = apply_filters(&src, &settings);
        let b = apply_filters(&src, &settings);
        assert_eq!(a, b);
        assert_eq!(a.dimensions(), src.dimensions());
    }

    #[test]
    fn source_is_not_modified() {
        let src = sample();
        let before = src.clone();
        let settings = FilterSettings {
            grayscale: true,
            blur: 1.5,
            brightness: 1.8,
            contrast: 1.8,
        };
        let _ = apply_filters(&src, &settings);
        assert_eq!(src, before);
    }

    #[test]
    fn grayscale_equalises_channels_and_drops_alpha() {
        let out = grayscale(&sample());
        for px in out.pixels() {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn luma_weights() {
        assert_eq!(luma(&Rgba([255, 255, 255, 0])), 255);
        assert_eq!(luma(&Rgba([0, 0, 0, 255])), 0);
        // 255 * 19595 / 65536 = 76.24
        assert_eq!(luma(&Rgba([255, 0, 0, 255])), 76);
    }

    #[test]
    fn brightness_scales_and_clips() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([100, 200, 10, 77]));
        brightness(&mut img, 1.5);
        assert_eq!(img.get_pixel(0, 0).0, [150, 255, 15, 77]);

        let mut dark = RgbaImage::from_pixel(1, 1, Rgba([101, 3, 255, 9]));
        brightness(&mut dark, 0.5);
        assert_eq!(dark.get_pixel(0, 0).0, [50, 1, 127, 9]);
    }

    #[test]
    fn contrast_pivots_on_mean_luma() {
        // Two pixels with luma 50 and 150, mean 100.
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([50, 50, 50, 255]));
        img.put_pixel(1, 0, Rgba([150, 150, 150, 128]));

        contrast(&mut img, 2.0);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [200, 200, 200, 128]);
    }

    #[test]
    fn zero_contrast_flattens_to_mean() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([50, 50, 50, 255]));
        img.put_pixel(1, 0, Rgba([150, 150, 150, 255]));

        contrast(&mut img, 0.0);
        assert_eq!(img.get_pixel(0, 0).0, [100, 100, 100, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [100, 100, 100, 255]);
    }

    #[test]
    fn blur_smooths_a_hard_edge() {
        let src = RgbaImage::from_fn(20, 1, |x, _| {
            if x < 10 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let settings = FilterSettings {
            blur: 2.0,
            ..FilterSettings::neutral()
        };
        let out = apply_filters(&src, &settings);
        let left = out.get_pixel(9, 0)[0];
        let right = out.get_pixel(10, 0)[0];
        assert!(left > 0 && left < 255);
        assert!(right > 0 && right < 255);
    }
}
