//! Stitched preview: all final tiles on one canvas, numbered in upload order.
//!
//! Tiles are laid out at their grid positions with a `margin`-pixel white gap
//! between neighbours. Each cell then gets its tile id drawn at its center in
//! black 8x8 bitmap glyphs over a translucent white box, so the number stays
//! readable on any photo.
//!
//! Stitching is best effort: a missing or empty tile leaves its cell white
//! and is reported in [`StitchOutcome::skipped`].

use super::calculations::{cell_origin, label_box, stitch_canvas_size, tile_id};
use super::grid::GeneratedTile;
use super::params::GridSpec;
use crate::config::PreviewConfig;
use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::imageops;
use image::{Rgba, RgbaImage};
use std::collections::HashMap;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const GLYPH_SIZE: u32 = 8;

/// Stitched canvas plus the `(row, col)` cells that had no usable tile.
#[derive(Debug, Clone)]
pub struct StitchOutcome {
    pub image: RgbaImage,
    pub skipped: Vec<(u32, u32)>,
}

/// Composite `tiles` into one preview canvas.
///
/// `tile_size` is the uniform final tile size; every cell of `grid` is
/// reserved at that size whether or not a tile is present for it. Returns
/// `None` when the canvas would not fit in `u32` pixels per side.
pub fn stitch_tiles(
    tiles: &[GeneratedTile],
    grid: GridSpec,
    tile_size: (u32, u32),
    preview: &PreviewConfig,
) -> Option<StitchOutcome> {
    let (width, height) = stitch_canvas_size(grid, tile_size, preview.margin)?;
    let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);

    let by_cell: HashMap<(u32, u32), &GeneratedTile> = tiles
        .iter()
        .map(|t| ((t.cell.row, t.cell.col), t))
        .collect();

    let mut skipped = Vec::new();
    for (row, col) in grid.cells() {
        match by_cell.get(&(row, col)) {
            Some(tile) if !tile.is_empty() => {
                let (x, y) = cell_origin(tile_size, preview.margin, row, col);
                imageops::overlay(&mut canvas, &tile.image, x as i64, y as i64);
            }
            _ => skipped.push((row, col)),
        }
    }

    for (row, col) in grid.cells() {
        let (x, y) = cell_origin(tile_size, preview.margin, row, col);
        let center = (
            x as i64 + (tile_size.0 / 2) as i64,
            y as i64 + (tile_size.1 / 2) as i64,
        );
        draw_label(
            &mut canvas,
            &tile_id(grid, row, col).to_string(),
            center,
            preview,
        );
    }

    Some(StitchOutcome {
        image: canvas,
        skipped,
    })
}

/// Pixel size of `text` rendered at `scale`.
pub fn measure_text(text: &str, scale: u32) -> (u32, u32) {
    let glyph = GLYPH_SIZE * scale;
    (text.chars().count() as u32 * glyph, glyph)
}

/// Draw `text` centered at `center` over a translucent white box.
fn draw_label(canvas: &mut RgbaImage, text: &str, center: (i64, i64), preview: &PreviewConfig) {
    let scale = preview.label_scale.max(1);
    let text_size = measure_text(text, scale);

    let label_bg = label_box(center, text_size, preview.label_padding);
    shade_box(canvas, label_bg, preview.label_background_alpha);

    let origin = (
        center.0 - (text_size.0 / 2) as i64,
        center.1 - (text_size.1 / 2) as i64,
    );
    draw_text(canvas, text, origin, scale);
}

/// Blend white at `alpha` over the box `(x, y, width, height)`, clipped to the canvas.
///
/// The canvas stays opaque: each channel becomes
/// `(255 * alpha + dst * (255 - alpha)) / 255`, rounded, and alpha is 255.
fn shade_box(canvas: &mut RgbaImage, (x, y, w, h): (i64, i64, u32, u32), alpha: u8) {
    let (width, height) = canvas.dimensions();
    let x_range = x.max(0)..(x + w as i64).min(width as i64);
    let y_range = y.max(0)..(y + h as i64).min(height as i64);
    let a = alpha as u32;
    for py in y_range {
        for px in x_range.clone() {
            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            for c in &mut pixel.0[..3] {
                *c = ((255 * a + *c as u32 * (255 - a) + 127) / 255) as u8;
            }
            pixel.0[3] = 255;
        }
    }
}

/// Render `text` with its top-left corner at `origin`, clipped to the canvas.
fn draw_text(canvas: &mut RgbaImage, text: &str, origin: (i64, i64), scale: u32) {
    let advance = (GLYPH_SIZE * scale) as i64;
    for (i, ch) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch) else {
            continue;
        };
        let glyph_x = origin.0 + i as i64 * advance;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                // Bit 0 is the leftmost column
                if (bits >> col) & 1 == 0 {
                    continue;
                }
                let x = glyph_x + (col * scale) as i64;
                let y = origin.1 + (row as u32 * scale) as i64;
                fill_block(canvas, (x, y), scale);
            }
        }
    }
}

fn fill_block(canvas: &mut RgbaImage, (x, y): (i64, i64), size: u32) {
    let (width, height) = canvas.dimensions();
    for py in y..y + size as i64 {
        for px in x..x + size as i64 {
            if (0..width as i64).contains(&px) && (0..height as i64).contains(&py) {
                canvas.put_pixel(px as u32, py as u32, TEXT_COLOR);
            }
        }
    }
}
