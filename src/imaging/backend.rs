//! Image I/O backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between the pixel pipeline and the
//! filesystem: identify, decode and encode. Fitting, tiling and stitching never
//! touch files, so the pipeline can be tested end to end against the
//! recording [`tests::MockBackend`].
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::Quality;
use image::RgbaImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image I/O backends.
///
/// `Sync` because tiles are encoded from rayon workers.
pub trait ImageBackend: Sync {
    /// Get image dimensions as they will be after decoding.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode an image into an RGBA canvas.
    fn load(&self, path: &Path) -> Result<RgbaImage, BackendError>;

    /// Encode `img` as JPEG at `path`.
    fn save_jpeg(&self, img: &RgbaImage, path: &Path, quality: Quality)
    -> Result<(), BackendError>;
}
