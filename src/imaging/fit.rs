//! Fit resolver: reconcile the source image with the grid's total content size.
//!
//! Resolution happens in two steps. [`plan_fit`] looks only at dimensions and
//! returns a [`FitDecision`]; [`apply_fit`] turns that decision into pixels.
//! The `plan` CLI command uses the first step on its own.
//!
//! ## Default mode
//!
//! ```text
//! origW < totalW || origH < totalH  →  ResizeMode::Resize: stretch to total
//!                                      ResizeMode::Pad:    center on black
//! origW > totalW || origH > totalH  →  center-crop a total-sized window
//! otherwise                         →  pass through
//! ```
//!
//! The smaller/larger test ORs the two axes, so a source that is wider but
//! shorter than required takes the "smaller" branch. Padding such a source
//! clips its overflowing axis on the far side.
//!
//! ## Crop and manual modes
//!
//! Both crop a rectangle out of the source and scale the crop to exactly the
//! total size. Crop mode picks the largest centered rectangle with the grid's
//! aspect ratio ([`AspectCenterCrop`]); manual mode asks a caller-supplied
//! [`CropSelector`], typically [`CropFile`] reading the rectangle an external
//! picker wrote, and validates it against the source bounds.

use super::calculations::{aspect_crop_rect, center_crop_origin, pad_offset};
use super::params::{CropRect, ResizeMode};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bicubic-family filter for all scaling.
const SCALE_FILTER: FilterType = FilterType::CatmullRom;

/// Background for [`ResizeMode::Pad`].
const PAD_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

#[derive(Error, Debug)]
pub enum FitError {
    #[error("Failed to read crop rectangle {}: {source}", .path.display())]
    CropFileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid crop rectangle JSON in {}: {source}", .path.display())]
    CropFileJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(
        "Crop rectangle {}x{} at ({}, {}) does not fit inside the {width}x{height} source",
        .rect.width, .rect.height, .rect.x, .rect.y
    )]
    CropOutOfBounds {
        rect: CropRect,
        width: u32,
        height: u32,
    },
}

/// Source of the crop rectangle for crop-then-scale fitting.
///
/// Implementations receive the source and target sizes and return a
/// rectangle in source coordinates. The resolver validates the result.
pub trait CropSelector: Sync {
    fn select(&self, source: (u32, u32), target: (u32, u32)) -> Result<CropRect, FitError>;
}

/// Largest centered crop with the target's aspect ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct AspectCenterCrop;

impl CropSelector for AspectCenterCrop {
    fn select(&self, source: (u32, u32), target: (u32, u32)) -> Result<CropRect, FitError> {
        Ok(aspect_crop_rect(source, target))
    }
}

/// A rectangle known up front.
#[derive(Debug, Clone, Copy)]
pub struct FixedCrop(pub CropRect);

impl CropSelector for FixedCrop {
    fn select(&self, _source: (u32, u32), _target: (u32, u32)) -> Result<CropRect, FitError> {
        Ok(self.0)
    }
}

/// Rectangle read from a JSON file: `{"x": 0, "y": 0, "w": 100, "h": 100}`.
#[derive(Debug, Clone)]
pub struct CropFile {
    path: PathBuf,
}

impl CropFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CropSelector for CropFile {
    fn select(&self, _source: (u32, u32), _target: (u32, u32)) -> Result<CropRect, FitError> {
        let content =
            std::fs::read_to_string(self.path()).map_err(|source| FitError::CropFileRead {
                path: self.path().to_path_buf(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| FitError::CropFileJson {
            path: self.path().to_path_buf(),
            source,
        })
    }
}

/// How the resolver should reconcile sizes.
#[derive(Clone, Copy)]
pub enum FitStrategy<'a> {
    /// Stretch/pad/center-crop depending on relative size.
    Default(ResizeMode),
    /// Crop toward the target aspect ratio, then scale.
    Crop,
    /// Crop to the selector's rectangle, then scale.
    Manual(&'a dyn CropSelector),
}

/// Which branch the resolver took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitDecision {
    /// Source already has the required size.
    PassThrough,
    /// Smaller source stretched non-uniformly to the required size.
    Stretched,
    /// Smaller source centered unscaled on a black canvas at this offset.
    Padded { left: u32, top: u32 },
    /// Larger source center-cropped from this origin.
    CenterCropped { x: u32, y: u32 },
    /// Aspect-ratio crop, then scaled.
    AspectCropped(CropRect),
    /// Externally chosen crop, then scaled.
    ManualCropped(CropRect),
}

/// Decide how a `source`-sized image is fitted to `total`.
pub fn plan_fit(
    source: (u32, u32),
    total: (u32, u32),
    strategy: FitStrategy<'_>,
) -> Result<FitDecision, FitError> {
    let (orig_w, orig_h) = source;
    let (total_w, total_h) = total;

    match strategy {
        FitStrategy::Default(resize_mode) => {
            let decision = if orig_w < total_w || orig_h < total_h {
                match resize_mode {
                    ResizeMode::Resize => FitDecision::Stretched,
                    ResizeMode::Pad => {
                        let (left, top) = pad_offset(source, total);
                        FitDecision::Padded { left, top }
                    }
                }
            } else if orig_w > total_w || orig_h > total_h {
                let (x, y) = center_crop_origin(source, total);
                FitDecision::CenterCropped { x, y }
            } else {
                FitDecision::PassThrough
            };
            Ok(decision)
        }
        FitStrategy::Crop => Ok(FitDecision::AspectCropped(checked_crop(
            AspectCenterCrop.select(source, total)?,
            source,
        )?)),
        FitStrategy::Manual(selector) => Ok(FitDecision::ManualCropped(checked_crop(
            selector.select(source, total)?,
            source,
        )?)),
    }
}

fn checked_crop(rect: CropRect, source: (u32, u32)) -> Result<CropRect, FitError> {
    if rect.fits_within(source.0, source.1) {
        Ok(rect)
    } else {
        Err(FitError::CropOutOfBounds {
            rect,
            width: source.0,
            height: source.1,
        })
    }
}

/// Produce the fitted `total`-sized canvas for a planned decision.
///
/// `src` is only read; the result is always a freshly allocated image.
pub fn apply_fit(src: &RgbaImage, total: (u32, u32), decision: FitDecision) -> RgbaImage {
    let (total_w, total_h) = total;
    match decision {
        FitDecision::PassThrough => src.clone(),
        FitDecision::Stretched => imageops::resize(src, total_w, total_h, SCALE_FILTER),
        FitDecision::Padded { left, top } => {
            let mut canvas = RgbaImage::from_pixel(total_w, total_h, PAD_COLOR);
            imageops::overlay(&mut canvas, src, left as i64, top as i64);
            canvas
        }
        FitDecision::CenterCropped { x, y } => {
            imageops::crop_imm(src, x, y, total_w, total_h).to_image()
        }
        FitDecision::AspectCropped(rect) | FitDecision::ManualCropped(rect) => {
            let cropped = imageops::crop_imm(src, rect.x, rect.y, rect.width, rect.height).to_image();
            if cropped.dimensions() == total {
                cropped
            } else {
                imageops::resize(&cropped, total_w, total_h, SCALE_FILTER)
            }
        }
    }
}

/// Plan and apply in one step.
pub fn fit_image(
    src: &RgbaImage,
    total: (u32, u32),
    strategy: FitStrategy<'_>,
) -> Result<(RgbaImage, FitDecision), FitError> {
    let decision = plan_fit(src.dimensions(), total, strategy)?;
    Ok((apply_fit(src, total, decision), decision))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{BLACK, assert_region_color, assert_region_eq, gradient_image};

    const DEFAULT_RESIZE: FitStrategy<'static> = FitStrategy::Default(ResizeMode::Resize);
    const DEFAULT_PAD: FitStrategy<'static> = FitStrategy::Default(ResizeMode::Pad);

    // =========================================================================
    // Default mode: decisions
    // =========================================================================

    #[test]
    fn larger_source_is_center_cropped() {
        let decision = plan_fit((2000, 2000), (1016, 1350), DEFAULT_RESIZE).unwrap();
        assert_eq!(decision, FitDecision::CenterCropped { x: 492, y: 325 });
    }

    #[test]
    fn equal_source_passes_through() {
        let decision = plan_fit((1016, 1350), (1016, 1350), DEFAULT_PAD).unwrap();
        assert_eq!(decision, FitDecision::PassThrough);
    }

    #[test]
    fn smaller_source_follows_resize_mode() {
        assert_eq!(
            plan_fit((500, 500), (1016, 1350), DEFAULT_RESIZE).unwrap(),
            FitDecision::Stretched
        );
        assert_eq!(
            plan_fit((500, 500), (1016, 1350), DEFAULT_PAD).unwrap(),
            FitDecision::Padded { left: 258, top: 425 }
        );
    }

    #[test]
    fn wider_but_shorter_source_takes_smaller_branch() {
        // Axis-coupled decision: one short axis is enough to skip cropping
        assert_eq!(
            plan_fit((3000, 1000), (1016, 1350), DEFAULT_RESIZE).unwrap(),
            FitDecision::Stretched
        );
        assert_eq!(
            plan_fit((3000, 1000), (1016, 1350), DEFAULT_PAD).unwrap(),
            FitDecision::Padded { left: 0, top: 175 }
        );
    }

    #[test]
    fn larger_on_one_axis_equal_on_other_crops() {
        assert_eq!(
            plan_fit((1100, 1350), (1016, 1350), DEFAULT_RESIZE).unwrap(),
            FitDecision::CenterCropped { x: 42, y: 0 }
        );
    }

    // =========================================================================
    // Default mode: pixels
    // =========================================================================

    #[test]
    fn center_crop_copies_window() {
        let src = gradient_image(50, 40);
        let (fitted, _) = fit_image(&src, (20, 10), DEFAULT_RESIZE).unwrap();
        assert_eq!(fitted.dimensions(), (20, 10));
        let expected = imageops::crop_imm(&src, 15, 15, 20, 10).to_image();
        assert_eq!(fitted, expected);
    }

    #[test]
    fn pass_through_is_pixel_identical() {
        let src = gradient_image(30, 20);
        let (fitted, decision) = fit_image(&src, (30, 20), DEFAULT_RESIZE).unwrap();
        assert_eq!(decision, FitDecision::PassThrough);
        assert_eq!(fitted, src);
    }

    #[test]
    fn refitting_fitted_output_is_idempotent() {
        let src = gradient_image(97, 61);
        for strategy in [DEFAULT_RESIZE, DEFAULT_PAD, FitStrategy::Crop] {
            let (first, _) = fit_image(&src, (40, 30), strategy).unwrap();
            let (second, _) = fit_image(&first, (40, 30), strategy).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn stretch_fills_exact_size() {
        let src = gradient_image(7, 5);
        let (fitted, _) = fit_image(&src, (40, 60), DEFAULT_RESIZE).unwrap();
        assert_eq!(fitted.dimensions(), (40, 60));
    }

    #[test]
    fn pad_centers_source_on_black() {
        let src = gradient_image(10, 6);
        let (fitted, decision) = fit_image(&src, (21, 10), DEFAULT_PAD).unwrap();
        assert_eq!(decision, FitDecision::Padded { left: 5, top: 2 });
        assert_eq!(fitted.dimensions(), (21, 10));
        assert_region_eq(&fitted, (5, 2), &src);
        assert_region_color(&fitted, (0, 0), (5, 10), BLACK);
        assert_region_color(&fitted, (15, 0), (6, 10), BLACK);
        assert_region_color(&fitted, (5, 0), (10, 2), BLACK);
        assert_region_color(&fitted, (5, 8), (10, 2), BLACK);
    }

    #[test]
    fn pad_clips_overflowing_axis() {
        let src = gradient_image(30, 4);
        let (fitted, _) = fit_image(&src, (20, 10), DEFAULT_PAD).unwrap();
        assert_eq!(fitted.dimensions(), (20, 10));
        // Left 20 columns of the source, drawn from x = 0
        let expected = imageops::crop_imm(&src, 0, 0, 20, 4).to_image();
        assert_region_eq(&fitted, (0, 3), &expected);
    }

    // =========================================================================
    // Crop and manual modes
    // =========================================================================

    #[test]
    fn crop_mode_scales_aspect_crop_to_total() {
        let src = gradient_image(400, 100);
        let (fitted, decision) = fit_image(&src, (20, 20), FitStrategy::Crop).unwrap();
        assert_eq!(
            decision,
            FitDecision::AspectCropped(CropRect {
                x: 150,
                y: 0,
                width: 100,
                height: 100
            })
        );
        assert_eq!(fitted.dimensions(), (20, 20));
    }

    #[test]
    fn crop_mode_upscales_small_source() {
        let src = gradient_image(8, 8);
        let (fitted, _) = fit_image(&src, (30, 40), FitStrategy::Crop).unwrap();
        assert_eq!(fitted.dimensions(), (30, 40));
    }

    #[test]
    fn manual_crop_of_exact_size_copies_pixels() {
        let src = gradient_image(60, 60);
        let rect = CropRect {
            x: 5,
            y: 7,
            width: 20,
            height: 30,
        };
        let selector = FixedCrop(rect);
        let (fitted, decision) =
            fit_image(&src, (20, 30), FitStrategy::Manual(&selector)).unwrap();
        assert_eq!(decision, FitDecision::ManualCropped(rect));
        assert_eq!(fitted, imageops::crop_imm(&src, 5, 7, 20, 30).to_image());
    }

    #[test]
    fn manual_crop_out_of_bounds_is_rejected() {
        let selector = FixedCrop(CropRect {
            x: 50,
            y: 0,
            width: 20,
            height: 10,
        });
        let result = plan_fit((60, 60), (20, 10), FitStrategy::Manual(&selector));
        assert!(matches!(
            result,
            Err(FitError::CropOutOfBounds {
                width: 60,
                height: 60,
                ..
            })
        ));
    }

    #[test]
    fn manual_crop_empty_is_rejected() {
        let selector = FixedCrop(CropRect {
            x: 0,
            y: 0,
            width: 0,
            height: 10,
        });
        let result = plan_fit((60, 60), (20, 10), FitStrategy::Manual(&selector));
        assert!(matches!(result, Err(FitError::CropOutOfBounds { .. })));
    }

    #[test]
    fn crop_file_reads_picker_json() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("crop_coords.json");
        std::fs::write(&path, r#"{"x": 1, "y": 2, "w": 30, "h": 40}"#).unwrap();

        let rect = CropFile::new(&path).select((100, 100), (10, 10)).unwrap();
        assert_eq!(
            rect,
            CropRect {
                x: 1,
                y: 2,
                width: 30,
                height: 40
            }
        );
    }

    #[test]
    fn crop_file_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing_path = tmp.path().join("missing.json");
        let missing = CropFile::new(&missing_path);
        match missing.select((1, 1), (1, 1)) {
            Err(FitError::CropFileRead { path, .. }) => assert_eq!(path, missing_path),
            other => panic!("expected read error, got {other:?}"),
        }

        let path = tmp.path().join("bad.json");
        std::fs::write(&path, r#"{"x": -1}"#).unwrap();
        assert!(matches!(
            CropFile::new(&path).select((1, 1), (1, 1)),
            Err(FitError::CropFileJson { .. })
        ));
    }

    #[test]
    fn crop_file_errors_name_the_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("crop_coords.json");
        let selector = CropFile::new(&path);
        assert_eq!(selector.path(), path.as_path());

        let message = selector.select((1, 1), (1, 1)).unwrap_err().to_string();
        assert!(
            message.starts_with(&format!("Failed to read crop rectangle {}: ", path.display())),
            "unexpected message {message:?}"
        );
    }
}
