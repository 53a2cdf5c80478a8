//! CLI output formatting for `split` progress and `plan` reports.
//!
//! # Output Format
//!
//! ## Split
//!
//! ```text
//! Source: photo.jpg (4000x3000)
//! Fit: 4000x3000 → 3048x1350, center crop at (476, 825)
//!     tile_3.jpg (row 1, col 1) 1080x1350
//!     tile_2.jpg (row 1, col 2) 1080x1350
//!     tile_1.jpg (row 1, col 3) 1080x1350
//! Preview: output/stitched_preview.jpg (3242x1350)
//! ```
//!
//! Rows and columns are shown 1-based. Tiles are encoded in parallel, so tile
//! lines appear in completion order.
//!
//! ## Plan
//!
//! ```text
//! Grid: 1 x 3 (3 tiles)
//! Source: 4000x3000
//! Content: 3048x1350 (3 x 1016x1350)
//! Fit: center crop at (476, 825)
//! Tiles: 1080x1350
//! Preview: 3242x1350
//! Upload order:
//!     3 2 1
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` for testability; `print_*`
//! wrappers write to stdout. Warnings are formatted here too, but the caller
//! decides where they go (the CLI sends them to stderr).

use crate::imaging::calculations::tile_id;
use crate::imaging::{FitDecision, GridSpec};
use crate::pipeline::{SplitPlan, TileEvent, TileWarning};
use std::path::Path;

fn dims((width, height): (u32, u32)) -> String {
    format!("{width}x{height}")
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One-phrase description of a fit branch.
pub fn describe_fit(decision: &FitDecision) -> String {
    match decision {
        FitDecision::PassThrough => "exact size, unchanged".to_string(),
        FitDecision::Stretched => "stretched to fill".to_string(),
        FitDecision::Padded { left, top } => {
            format!("padded on black, image at ({left}, {top})")
        }
        FitDecision::CenterCropped { x, y } => format!("center crop at ({x}, {y})"),
        FitDecision::AspectCropped(rect) => format!(
            "aspect crop {} at ({}, {}), scaled",
            dims((rect.width, rect.height)),
            rect.x,
            rect.y
        ),
        FitDecision::ManualCropped(rect) => format!(
            "manual crop {} at ({}, {}), scaled",
            dims((rect.width, rect.height)),
            rect.x,
            rect.y
        ),
    }
}

/// Format a warning as a single line, without the `Warning:` prefix.
pub fn format_warning(warning: &TileWarning) -> String {
    match warning {
        TileWarning::BlurFallback {
            id,
            row,
            col,
            content_width,
            required,
        } => format!(
            "tile {id} (row {}, col {}): content is {content_width}px wide, blur needs {required}px; padded instead",
            row + 1,
            col + 1
        ),
        TileWarning::EmptyTile { id } => format!("tile {id} is empty and was not written"),
        TileWarning::MissingFromPreview { row, col } => format!(
            "preview cell (row {}, col {}) has no tile; left blank",
            row + 1,
            col + 1
        ),
    }
}

/// Format a single split progress event as display lines.
pub fn format_tile_event(event: &TileEvent) -> Vec<String> {
    match event {
        TileEvent::SourceLoaded {
            path,
            width,
            height,
        } => vec![format!(
            "Source: {} ({})",
            file_label(path),
            dims((*width, *height))
        )],
        TileEvent::Fitted {
            source,
            total,
            decision,
        } => vec![format!(
            "Fit: {} \u{2192} {}, {}",
            dims(*source),
            dims(*total),
            describe_fit(decision)
        )],
        TileEvent::TileSaved {
            row,
            col,
            path,
            width,
            height,
            ..
        } => vec![format!(
            "    {} (row {}, col {}) {}",
            file_label(path),
            row + 1,
            col + 1,
            dims((*width, *height))
        )],
        TileEvent::PreviewSaved {
            path,
            width,
            height,
        } => vec![format!(
            "Preview: {} ({})",
            path.display(),
            dims((*width, *height))
        )],
        TileEvent::Warning(warning) => vec![format!("Warning: {}", format_warning(warning))],
    }
}

/// Tile ids laid out as they appear in the grid, one line per row.
fn upload_order_rows(grid: GridSpec) -> Vec<String> {
    let width = grid.tile_count().to_string().len();
    (0..grid.rows)
        .map(|row| {
            let ids: Vec<String> = (0..grid.cols)
                .map(|col| format!("{:>width$}", tile_id(grid, row, col)))
                .collect();
            format!("    {}", ids.join(" "))
        })
        .collect()
}

/// Format the geometry report printed by `plan`.
pub fn format_plan(plan: &SplitPlan) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Grid: {} x {} ({} tiles)",
            plan.grid.rows,
            plan.grid.cols,
            plan.grid.tile_count()
        ),
        format!("Source: {}", dims(plan.source)),
        format!(
            "Content: {} ({} x {})",
            dims(plan.total_content),
            plan.grid.tile_count(),
            dims(plan.content_tile)
        ),
        format!("Fit: {}", describe_fit(&plan.decision)),
        format!("Tiles: {}", dims(plan.final_tile)),
        format!("Preview: {}", dims(plan.preview)),
        "Upload order:".to_string(),
    ];
    lines.extend(upload_order_rows(plan.grid));
    lines
}

pub fn print_plan(plan: &SplitPlan) {
    for line in format_plan(plan) {
        println!("{}", line);
    }
}
