//! Shared test utilities for the tilegrid test suite.
//!
//! Synthetic images are generated in memory so tests never depend on fixture
//! files. [`small_format`] is a tiny tile format that keeps full-pipeline tests
//! fast while still exercising safe zones and blur.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let src = gradient_image(60, 40);
//! let config = small_config();
//! assert_eq!(config.tile.final_size().unwrap(), (16, 20));
//! ```

use crate::config::{TileConfig, TileFormat};
use image::{Rgba, RgbaImage};

// =========================================================================
// Synthetic images
// =========================================================================

/// Opaque image where every pixel is distinct along both axes.
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    })
}

/// Single-color image.
pub fn solid_image(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color)
}

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

// =========================================================================
// Formats
// =========================================================================

/// 10x20 content with a 3px safe zone → 16x20 tiles.
pub fn small_format() -> TileFormat {
    TileFormat {
        content_width: 10,
        content_height: 20,
        safe_zone: 3,
    }
}

/// Stock config with [`small_format`] and a blur radius that fits its safe zone.
pub fn small_config() -> TileConfig {
    let mut config = TileConfig::default();
    config.tile = small_format();
    config.blur.radius = 2;
    config.preview.label_scale = 1;
    config.preview.label_padding = 1;
    config
}

// =========================================================================
// Pixel assertions
// =========================================================================

/// Assert that every pixel in the `width × height` region at `(x, y)` equals `color`.
pub fn assert_region_color(
    img: &RgbaImage,
    (x, y): (u32, u32),
    (width, height): (u32, u32),
    color: Rgba<u8>,
) {
    for py in y..y + height {
        for px in x..x + width {
            let actual = img.get_pixel(px, py);
            assert_eq!(
                *actual, color,
                "pixel ({px}, {py}) is {actual:?}, expected {color:?}"
            );
        }
    }
}

/// Assert that `region` of `img` starting at `(x, y)` is pixel-identical to `expected`.
pub fn assert_region_eq(img: &RgbaImage, (x, y): (u32, u32), expected: &RgbaImage) {
    for (ex, ey, px) in expected.enumerate_pixels() {
        let actual = img.get_pixel(x + ex, y + ey);
        assert_eq!(
            actual,
            px,
            "pixel ({}, {}) differs from expected ({ex}, {ey})",
            x + ex,
            y + ey
        );
    }
}
