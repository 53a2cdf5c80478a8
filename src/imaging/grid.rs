//! Grid tiler: cut the fitted image into content tiles and finish each one.
//!
//! The fitted image is exactly `cols × content_w` by `rows × content_h`, so the
//! content rectangles tile it with no overlap and no leftover border. Cells are
//! generated in row-major order; the externally visible id runs the other way
//! (see [`tile_id`]).
//!
//! Cells are independent, so they are processed on rayon's thread pool. The
//! result vector is still in row-major order.

use super::calculations::{content_origin, tile_id};
use super::edge::{EdgeOutcome, treat_edges};
use super::params::{EdgeMode, GridSpec};
use crate::config::TileFormat;
use image::RgbaImage;
use image::imageops;
use rayon::prelude::*;

/// Position of one tile in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCell {
    pub row: u32,
    pub col: u32,
    /// Reverse linear index: upload order, 1 = bottom-right.
    pub id: u32,
}

/// A finished tile ready to persist and stitch.
#[derive(Debug, Clone)]
pub struct GeneratedTile {
    pub cell: TileCell,
    pub image: RgbaImage,
    /// Blur was requested but the content was too narrow for it.
    pub fell_back_to_pad: bool,
}

impl GeneratedTile {
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    pub fn file_name(&self) -> String {
        tile_file_name(self.cell.id)
    }
}

/// `tile_<id>.jpg`
pub fn tile_file_name(id: u32) -> String {
    format!("tile_{id}.jpg")
}

/// All cells of `grid` in row-major generation order.
pub fn tile_cells(grid: GridSpec) -> Vec<TileCell> {
    grid.cells()
        .map(|(row, col)| TileCell {
            row,
            col,
            id: tile_id(grid, row, col),
        })
        .collect()
}

/// Copy the content rectangle for `cell` out of the fitted image.
pub fn extract_content(fitted: &RgbaImage, format: &TileFormat, cell: TileCell) -> RgbaImage {
    let (x, y) = content_origin(format.content_size(), cell.row, cell.col);
    imageops::crop_imm(fitted, x, y, format.content_width, format.content_height).to_image()
}

/// Extract and edge-treat every tile of the grid.
pub fn generate_tiles(
    fitted: &RgbaImage,
    format: &TileFormat,
    grid: GridSpec,
    edge_mode: EdgeMode,
    blur_radius: u32,
) -> Vec<GeneratedTile> {
    tile_cells(grid)
        .into_par_iter()
        .map(|cell| {
            let content = extract_content(fitted, format, cell);
            let EdgeOutcome {
                image,
                fell_back_to_pad,
            } = treat_edges(&content, format.safe_zone, edge_mode, blur_radius);
            GeneratedTile {
                cell,
                image,
                fell_back_to_pad,
            }
        })
        .collect()
}
