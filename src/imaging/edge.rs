//! Safe-zone edge treatment.
//!
//! Turns a `content_w × content_h` content tile into a final tile that is
//! `2 * safe_zone` pixels wider:
//!
//! ```text
//! ┌────┬──────────────────────┬────┐
//! │ L  │       content        │ R  │   L/R = white (pad)
//! │    │                      │    │         or blurred edge strip (blur)
//! └────┴──────────────────────┴────┘
//!  sz          content_w        sz
//! ```
//!
//! In blur mode the left safe zone is a box-blurred copy of the content's
//! leftmost `safe_zone` columns, and likewise on the right. The content is
//! written over the canvas, never blended, so it stays sharp.

use super::blur::box_blur;
use super::params::EdgeMode;
use image::imageops;
use image::{Rgba, RgbaImage};

const PAD_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A finished tile canvas and whether blur had to fall back to padding.
#[derive(Debug, Clone)]
pub struct EdgeOutcome {
    pub image: RgbaImage,
    pub fell_back_to_pad: bool,
}

/// Blur needs a full safe zone's worth of content columns on each side.
pub fn blur_fits(content_width: u32, safe_zone: u32) -> bool {
    safe_zone
        .checked_mul(2)
        .is_some_and(|needed| content_width >= needed)
}

/// Build the final tile for `content` with the given safe zone.
pub fn treat_edges(
    content: &RgbaImage,
    safe_zone: u32,
    mode: EdgeMode,
    blur_radius: u32,
) -> EdgeOutcome {
    match mode {
        EdgeMode::Pad => EdgeOutcome {
            image: pad_edges(content, safe_zone),
            fell_back_to_pad: false,
        },
        EdgeMode::Blur if !blur_fits(content.width(), safe_zone) => EdgeOutcome {
            image: pad_edges(content, safe_zone),
            fell_back_to_pad: true,
        },
        EdgeMode::Blur => EdgeOutcome {
            image: blur_edges(content, safe_zone, blur_radius),
            fell_back_to_pad: false,
        },
    }
}

fn final_canvas_size(content: &RgbaImage, safe_zone: u32) -> (u32, u32) {
    (content.width() + 2 * safe_zone, content.height())
}

/// White canvas with the content alpha-composited between the safe zones.
fn pad_edges(content: &RgbaImage, safe_zone: u32) -> RgbaImage {
    let (width, height) = final_canvas_size(content, safe_zone);
    let mut canvas = RgbaImage::from_pixel(width, height, PAD_COLOR);
    imageops::overlay(&mut canvas, content, safe_zone as i64, 0);
    canvas
}

fn blur_edges(content: &RgbaImage, safe_zone: u32, radius: u32) -> RgbaImage {
    let (content_w, content_h) = content.dimensions();
    let left = imageops::crop_imm(content, 0, 0, safe_zone, content_h).to_image();
    let right =
        imageops::crop_imm(content, content_w - safe_zone, 0, safe_zone, content_h).to_image();

    let (width, height) = final_canvas_size(content, safe_zone);
    let mut canvas = RgbaImage::new(width, height);
    imageops::replace(&mut canvas, &box_blur(&left, radius), 0, 0);
    imageops::replace(&mut canvas, content, safe_zone as i64, 0);
    imageops::replace(
        &mut canvas,
        &box_blur(&right, radius),
        (safe_zone + content_w) as i64,
        0,
    );
    canvas
}
