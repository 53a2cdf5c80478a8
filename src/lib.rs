//! # Tilegrid
//!
//! Splits one photo into a `rows × cols` grid of portrait tiles for a
//! multi-post feed layout, and renders a numbered preview of the result.
//!
//! # Architecture: One Pass, Four Stages
//!
//! ```text
//! 1. Fit      source     →  cols·1016 × rows·1350 canvas   (resize, pad, or crop)
//! 2. Tile     canvas     →  content tiles                  (row-major)
//! 3. Edges    content    →  1080 × 1350 final tiles        (white pad or blurred strips)
//! 4. Stitch   tiles      →  stitched_preview.jpg           (numbered by upload order)
//! ```
//!
//! Each stage is a pure function over in-memory RGBA buffers. Only the
//! [`imaging::ImageBackend`] touches the filesystem, so the whole pipeline is
//! unit tested against a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Orchestrates one run: load, fit, tile, save, stitch; emits progress events |
//! | [`imaging`] | Fit resolver, grid tiler, edge treatment, box blur, stitcher, backend |
//! | [`config`] | `tilegrid.toml` loading, stock defaults, merging, and validation |
//! | [`output`] | CLI output formatting for progress events and plan reports |
//!
//! # Design Decisions
//!
//! ## Reverse Numbering
//!
//! A feed shows the newest post first, so the tile that must appear top-left
//! has to be uploaded last. Tiles are generated row-major but named
//! `tile_<rows·cols − index>.jpg`: upload `tile_1.jpg` first and the grid
//! assembles itself. The preview draws the same ids on each cell.
//!
//! ## Safe Zone
//!
//! The feed grid crops each 4:5 post slightly at the sides. Every tile
//! carries 32px of sacrificial border on the left and right, so the visible
//! parts of neighbouring tiles line up. Those borders are white, or a blurred
//! extension of the tile's own edge.
//!
//! ## Axis-Coupled Fit
//!
//! If the source is smaller than the grid's content area on *either* axis, the
//! whole image is scaled (or padded); otherwise a centered window is cut. A
//! source that is taller but narrower is therefore stretched, not cropped.
//! The `crop` fit mode exists for when that distortion is unwanted.
//!
//! ## Manual Crop Rectangles
//!
//! Choosing the crop interactively is someone else's job. `manual` mode reads
//! a `{"x", "y", "w", "h"}` JSON file written by any crop tool and validates
//! it against the source; see [`imaging::CropSelector`].

pub mod config;
pub mod imaging;
pub mod output;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_helpers;
