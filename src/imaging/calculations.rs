//! Pure geometry for fitting, tiling and stitching.
//!
//! All functions here are pure and testable without any I/O or images.
//! Divisions are integer floor divisions throughout. Sizes derived from
//! user input (grid shape, tile format, margins) are checked and return
//! `None` when they do not fit in `u32`.

use super::params::{CropRect, GridSpec};

/// Total content area the fitted image must cover: one content area per cell.
///
/// # Examples
/// ```
/// # use tilegrid::imaging::calculations::total_content_size;
/// # use tilegrid::imaging::GridSpec;
/// let grid = GridSpec::new(3, 3).unwrap();
/// assert_eq!(total_content_size((1016, 1350), grid), Some((3048, 4050)));
/// ```
pub fn total_content_size(content: (u32, u32), grid: GridSpec) -> Option<(u32, u32)> {
    Some((
        content.0.checked_mul(grid.cols)?,
        content.1.checked_mul(grid.rows)?,
    ))
}

/// Final tile size: the safe zone is added on both sides of the width only.
pub fn final_tile_size(content: (u32, u32), safe_zone: u32) -> Option<(u32, u32)> {
    let width = safe_zone.checked_mul(2)?.checked_add(content.0)?;
    Some((width, content.1))
}

/// Offset at which an unscaled source is centered on a larger canvas.
///
/// Each axis pads by `max(0, total - orig) / 2`, so an axis where the source
/// is already larger gets offset 0 and is clipped on the far side.
pub fn pad_offset(orig: (u32, u32), total: (u32, u32)) -> (u32, u32) {
    (
        total.0.saturating_sub(orig.0) / 2,
        total.1.saturating_sub(orig.1) / 2,
    )
}

/// Origin of a centered `total`-sized window inside `orig`.
///
/// ```
/// # use tilegrid::imaging::calculations::center_crop_origin;
/// assert_eq!(center_crop_origin((2000, 2000), (1016, 1350)), (492, 325));
/// ```
pub fn center_crop_origin(orig: (u32, u32), total: (u32, u32)) -> (u32, u32) {
    (
        orig.0.saturating_sub(total.0) / 2,
        orig.1.saturating_sub(total.1) / 2,
    )
}

/// Largest centered rectangle inside `source` with the aspect ratio of `target`.
///
/// One side always spans the full source; the other is shortened (floor,
/// never below 1 pixel).
pub fn aspect_crop_rect(source: (u32, u32), target: (u32, u32)) -> CropRect {
    let (src_w, src_h) = (source.0 as u64, source.1 as u64);
    let (tgt_w, tgt_h) = (target.0 as u64, target.1 as u64);

    let (crop_w, crop_h) = if src_w * tgt_h > tgt_w * src_h {
        // Source is wider: keep full height
        ((src_h * tgt_w / tgt_h).max(1), src_h)
    } else {
        // Source is taller (or same aspect): keep full width
        (src_w, (src_w * tgt_h / tgt_w).max(1))
    };
    let (crop_w, crop_h) = (crop_w as u32, crop_h as u32);
    let (x, y) = center_crop_origin(source, (crop_w, crop_h));

    CropRect {
        x,
        y,
        width: crop_w,
        height: crop_h,
    }
}

/// Externally visible tile number: the top-left tile gets the highest id,
/// the bottom-right tile gets 1.
pub fn tile_id(grid: GridSpec, row: u32, col: u32) -> u32 {
    grid.tile_count() - (row * grid.cols + col)
}

/// Top-left corner of the content rectangle for `(row, col)` in the fitted image.
pub fn content_origin(content: (u32, u32), row: u32, col: u32) -> (u32, u32) {
    (col * content.0, row * content.1)
}

/// Preview canvas size: tiles plus a `margin` gap between neighbours.
pub fn stitch_canvas_size(grid: GridSpec, tile: (u32, u32), margin: u32) -> Option<(u32, u32)> {
    let span = |count: u32, side: u32| {
        count
            .checked_mul(side)?
            .checked_add(count.saturating_sub(1).checked_mul(margin)?)
    };
    Some((span(grid.cols, tile.0)?, span(grid.rows, tile.1)?))
}

/// Top-left corner of cell `(row, col)` on the preview canvas.
pub fn cell_origin(tile: (u32, u32), margin: u32, row: u32, col: u32) -> (u32, u32) {
    (col * (tile.0 + margin), row * (tile.1 + margin))
}

/// Label background box `(x, y, width, height)` around text centered at `center`.
///
/// Coordinates may be negative when the text is larger than the cell;
/// callers clip against the canvas.
pub fn label_box(center: (i64, i64), text: (u32, u32), padding: u32) -> (i64, i64, u32, u32) {
    let half_w = (text.0 / 2) as i64;
    let half_h = (text.1 / 2) as i64;
    let pad = padding as i64;
    let x0 = center.0 - half_w - pad;
    let y0 = center.1 - half_h - pad;
    let x1 = center.0 + half_w + pad;
    let y1 = center.1 + half_h + pad;
    (x0, y0, (x1 - x0) as u32, (y1 - y0) as u32)
}
