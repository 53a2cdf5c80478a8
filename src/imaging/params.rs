//! Parameter types for tile generation.
//!
//! These types describe *what* to produce, not *how*. They are shared by the
//! fit, grid, edge and stitch stages and by the CLI, which parses the mode
//! enums straight from flags.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 95). Clamped on construction.
//! - [`GridSpec`]: rows × cols of the output grid, both at least 1.
//! - [`FitMode`] / [`ResizeMode`] / [`EdgeMode`]: the three policy switches.
//! - [`CropRect`]: a crop window in source pixel coordinates.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Number of rows and columns in the output grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub rows: u32,
    pub cols: u32,
}

impl GridSpec {
    /// Returns `None` when either side is zero or the tile count overflows `u32`.
    pub fn new(rows: u32, cols: u32) -> Option<Self> {
        let valid = rows >= 1 && cols >= 1 && rows.checked_mul(cols).is_some();
        valid.then_some(Self { rows, cols })
    }

    pub fn tile_count(self) -> u32 {
        self.rows * self.cols
    }

    /// All `(row, col)` cells in row-major order.
    pub fn cells(self) -> impl Iterator<Item = (u32, u32)> {
        (0..self.rows).flat_map(move |r| (0..self.cols).map(move |c| (r, c)))
    }
}

/// How the source is reconciled with the grid's total content size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FitMode {
    /// Stretch or pad when smaller, center-crop when larger.
    #[default]
    Default,
    /// Center-crop to the grid's aspect ratio, then scale.
    Crop,
    /// Crop to an externally chosen rectangle, then scale.
    Manual,
}

/// What to do in [`FitMode::Default`] when the source is smaller than required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ResizeMode {
    #[default]
    Resize,
    Pad,
}

/// How the left and right safe zones of each tile are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EdgeMode {
    /// Solid white.
    #[default]
    Pad,
    /// Blurred copy of the tile's own edge pixels.
    Blur,
}

/// A crop window in source image coordinates.
///
/// Field names match the JSON written by the external crop picker:
/// `{"x": 120, "y": 0, "w": 3048, "h": 4050}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    #[serde(rename = "w")]
    pub width: u32,
    #[serde(rename = "h")]
    pub height: u32,
}

impl CropRect {
    /// True when the rectangle is non-empty and lies entirely inside `(width, height)`.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|x1| x1 <= width)
            && self.y.checked_add(self.height).is_some_and(|y1| y1 <= height)
    }
}
