//! Image processing, pure Rust on top of the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify / Load** | `ImageReader` + EXIF orientation |
//! | **Fit** | `imageops::resize` (CatmullRom), `crop_imm`, `overlay` |
//! | **Edge blur** | separable box blur ([`blur::box_blur`]) |
//! | **Labels** | `font8x8` bitmap glyphs |
//! | **Save** | `JpegEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for tile geometry (unit testable)
//! - **Parameters**: Grid shape, modes, crop rectangle, quality
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Stages**: [`fit`], [`edge`], [`grid`], [`stitch`], each a pure
//!   function over in-memory buffers

pub mod backend;
pub mod blur;
pub mod calculations;
pub mod edge;
pub mod fit;
pub mod grid;
mod params;
pub mod rust_backend;
pub mod stitch;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use fit::{
    AspectCenterCrop, CropFile, CropSelector, FitDecision, FitError, FitStrategy, FixedCrop,
    apply_fit, fit_image, plan_fit,
};
pub use grid::{GeneratedTile, TileCell, generate_tiles, tile_file_name};
pub use params::{CropRect, EdgeMode, FitMode, GridSpec, Quality, ResizeMode};
pub use rust_backend::RustBackend;
pub use stitch::{StitchOutcome, stitch_tiles};
