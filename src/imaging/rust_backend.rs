//! Pure Rust image I/O backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | EXIF orientation | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | Identify | decoder dimensions, swapped for 90° orientations |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (alpha dropped) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbaImage};
use std::io::BufWriter;
use std::path::Path;

/// Backend using the `image` crate's pure Rust codecs.
pub struct RustBackend {
    apply_orientation: bool,
}

impl RustBackend {
    /// Backend that rotates/flips decoded images according to their EXIF orientation.
    pub fn new() -> Self {
        Self {
            apply_orientation: true,
        }
    }

    /// Backend that keeps the stored pixel layout and ignores orientation metadata.
    pub fn ignoring_orientation() -> Self {
        Self {
            apply_orientation: false,
        }
    }

    fn open_decoder(&self, path: &Path) -> Result<impl ImageDecoder, BackendError> {
        ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .into_decoder()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to decode {}: {}",
                    path.display(),
                    e
                ))
            })
    }

    fn orientation_of(&self, decoder: &mut impl ImageDecoder) -> Orientation {
        if !self.apply_orientation {
            return Orientation::NoTransforms;
        }
        // Missing or unreadable EXIF is not an error: the image is shown as stored.
        decoder.orientation().unwrap_or(Orientation::NoTransforms)
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// True when `orientation` swaps width and height.
fn swaps_axes(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let mut decoder = self.open_decoder(path)?;
        let orientation = self.orientation_of(&mut decoder);
        let (width, height) = decoder.dimensions();
        Ok(if swaps_axes(orientation) {
            Dimensions {
                width: height,
                height: width,
            }
        } else {
            Dimensions { width, height }
        })
    }

    fn load(&self, path: &Path) -> Result<RgbaImage, BackendError> {
        let mut decoder = self.open_decoder(path)?;
        let orientation = self.orientation_of(&mut decoder);
        let mut img = DynamicImage::from_decoder(decoder).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })?;
        img.apply_orientation(orientation);
        Ok(img.into_rgba8())
    }

    fn save_jpeg(
        &self,
        img: &RgbaImage,
        path: &Path,
        quality: Quality,
    ) -> Result<(), BackendError> {
        let file = std::fs::File::create(path).map_err(BackendError::Io)?;
        let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality.value() as u8);
        // JPEG has no alpha channel
        DynamicImage::ImageRgba8(img.clone())
            .into_rgb8()
            .write_with_encoder(encoder)
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "JPEG encode failed for {}: {}",
                    path.display(),
                    e
                ))
            })
    }
}
