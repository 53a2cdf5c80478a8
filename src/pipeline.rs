//! One invocation: source image in, tiles and a stitched preview out.
//!
//! ```text
//! load → fit → generate tiles (extract + edges) → save tiles → stitch → save preview
//! ```
//!
//! ## Output Structure
//!
//! ```text
//! output/
//! ├── tile_9.jpg             # top-left, uploaded last
//! ├── tile_8.jpg
//! ├── ...
//! ├── tile_1.jpg             # bottom-right, uploaded first
//! └── stitched_preview.jpg   # all tiles with their numbers overlaid
//! ```
//!
//! ## Failure Model
//!
//! Configuration and I/O problems abort the run with a [`PipelineError`].
//! Degenerate geometry does not: a tile whose content is too narrow for blur
//! is padded instead, an empty tile is not written, and the preview leaves a
//! missing tile's cell blank. Each case is reported as a
//! [`TileEvent::Warning`].
//!
//! ## Progress
//!
//! Every decision is sent as a [`TileEvent`] over an optional channel; the CLI
//! formats them with [`crate::output`]. Tiles are encoded in parallel, so
//! `TileSaved` events can arrive in any order.

use crate::config::{ConfigError, TileConfig};
use crate::imaging::{
    BackendError, CropFile, CropSelector, EdgeMode, FitDecision, FitError, FitMode, FitStrategy,
    GeneratedTile, GridSpec, ImageBackend, ResizeMode, RustBackend, apply_fit, generate_tiles,
    plan_fit, stitch_tiles,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

pub const PREVIEW_FILE_NAME: &str = "stitched_preview.jpg";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Fit failed: {0}")]
    Fit(#[from] FitError),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Manual fit mode needs a crop rectangle (pass --crop-file)")]
    MissingCropRectangle,
}

/// Per-invocation choices, typically straight from CLI flags.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    pub grid: GridSpec,
    pub edge_mode: EdgeMode,
    pub resize_mode: ResizeMode,
    pub fit_mode: FitMode,
    /// JSON crop rectangle for [`FitMode::Manual`].
    pub crop_file: Option<PathBuf>,
    /// Rotate the source according to its EXIF orientation before fitting.
    pub apply_orientation: bool,
}

impl SplitOptions {
    pub fn new(grid: GridSpec) -> Self {
        Self {
            grid,
            edge_mode: EdgeMode::default(),
            resize_mode: ResizeMode::default(),
            fit_mode: FitMode::default(),
            crop_file: None,
            apply_orientation: true,
        }
    }

    fn backend(&self) -> RustBackend {
        if self.apply_orientation {
            RustBackend::new()
        } else {
            RustBackend::ignoring_orientation()
        }
    }

    fn crop_selector(&self) -> Option<CropFile> {
        self.crop_file.as_ref().map(CropFile::new)
    }
}

/// Progress and warnings for one run.
#[derive(Debug, Clone, PartialEq)]
pub enum TileEvent {
    SourceLoaded {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    Fitted {
        source: (u32, u32),
        total: (u32, u32),
        decision: FitDecision,
    },
    TileSaved {
        id: u32,
        row: u32,
        col: u32,
        path: PathBuf,
        width: u32,
        height: u32,
    },
    PreviewSaved {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    Warning(TileWarning),
}

impl TileEvent {
    pub fn is_warning(&self) -> bool {
        matches!(self, TileEvent::Warning(_))
    }
}

/// Non-fatal problems; the run continues with a safe default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileWarning {
    /// Blur requested but content is narrower than both safe zones; padded instead.
    BlurFallback {
        id: u32,
        row: u32,
        col: u32,
        content_width: u32,
        required: u32,
    },
    /// Tile had no pixels and was not written.
    EmptyTile { id: u32 },
    /// No usable tile for this preview cell.
    MissingFromPreview { row: u32, col: u32 },
}

/// Geometry decisions for a run, computed from dimensions only.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPlan {
    pub grid: GridSpec,
    pub source: (u32, u32),
    pub total_content: (u32, u32),
    pub decision: FitDecision,
    pub content_tile: (u32, u32),
    pub final_tile: (u32, u32),
    pub preview: (u32, u32),
}

/// A tile written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedTile {
    pub id: u32,
    pub row: u32,
    pub col: u32,
    pub path: PathBuf,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct SplitResult {
    pub plan: SplitPlan,
    /// Written tiles in generation (row-major) order.
    pub tiles: Vec<SavedTile>,
    pub preview: PathBuf,
    pub warnings: Vec<TileWarning>,
}

/// Split `input` into tiles under `output_dir` using the `image`-crate backend.
pub fn split(
    input: &Path,
    output_dir: &Path,
    options: &SplitOptions,
    config: &TileConfig,
    events: Option<Sender<TileEvent>>,
) -> Result<SplitResult, PipelineError> {
    let backend = options.backend();
    let selector = options.crop_selector();
    split_with_backend(
        &backend,
        input,
        output_dir,
        options,
        selector.as_ref().map(|s| s as &dyn CropSelector),
        config,
        events,
    )
}

/// Compute the geometry for `input` without decoding pixels or writing files.
pub fn plan(
    input: &Path,
    options: &SplitOptions,
    config: &TileConfig,
) -> Result<SplitPlan, PipelineError> {
    let backend = options.backend();
    let selector = options.crop_selector();
    plan_with_backend(
        &backend,
        input,
        options,
        selector.as_ref().map(|s| s as &dyn CropSelector),
        config,
    )
}

fn strategy<'a>(
    options: &SplitOptions,
    selector: Option<&'a dyn CropSelector>,
) -> Result<FitStrategy<'a>, PipelineError> {
    match options.fit_mode {
        FitMode::Default => Ok(FitStrategy::Default(options.resize_mode)),
        FitMode::Crop => Ok(FitStrategy::Crop),
        FitMode::Manual => selector
            .map(FitStrategy::Manual)
            .ok_or(PipelineError::MissingCropRectangle),
    }
}

fn build_plan(
    source: (u32, u32),
    options: &SplitOptions,
    selector: Option<&dyn CropSelector>,
    config: &TileConfig,
) -> Result<SplitPlan, PipelineError> {
    config.validate()?;
    let format = &config.tile;
    let total_content = format.total_content(options.grid)?;
    let final_tile = format.final_size()?;
    let preview = config.preview_size(options.grid)?;
    let decision = plan_fit(source, total_content, strategy(options, selector)?)?;
    Ok(SplitPlan {
        grid: options.grid,
        source,
        total_content,
        decision,
        content_tile: format.content_size(),
        final_tile,
        preview,
    })
}

/// [`plan`] against a specific backend (allows testing with mock).
pub fn plan_with_backend(
    backend: &impl ImageBackend,
    input: &Path,
    options: &SplitOptions,
    selector: Option<&dyn CropSelector>,
    config: &TileConfig,
) -> Result<SplitPlan, PipelineError> {
    let dims = backend.identify(input)?;
    build_plan((dims.width, dims.height), options, selector, config)
}

fn emit(events: &Option<Sender<TileEvent>>, event: TileEvent) {
    if let Some(tx) = events {
        // The receiver only prints; a closed channel just means nobody is listening.
        tx.send(event).ok();
    }
}

/// [`split`] against a specific backend (allows testing with mock).
pub fn split_with_backend(
    backend: &impl ImageBackend,
    input: &Path,
    output_dir: &Path,
    options: &SplitOptions,
    selector: Option<&dyn CropSelector>,
    config: &TileConfig,
    events: Option<Sender<TileEvent>>,
) -> Result<SplitResult, PipelineError> {
    let source = backend.load(input)?;
    emit(
        &events,
        TileEvent::SourceLoaded {
            path: input.to_path_buf(),
            width: source.width(),
            height: source.height(),
        },
    );

    let plan = build_plan(source.dimensions(), options, selector, config)?;
    std::fs::create_dir_all(output_dir)?;

    let fitted = apply_fit(&source, plan.total_content, plan.decision);
    drop(source);
    emit(
        &events,
        TileEvent::Fitted {
            source: plan.source,
            total: plan.total_content,
            decision: plan.decision,
        },
    );

    let tiles = generate_tiles(
        &fitted,
        &config.tile,
        options.grid,
        options.edge_mode,
        config.blur.radius,
    );
    drop(fitted);

    let mut warnings = Vec::new();
    for tile in tiles.iter().filter(|t| t.fell_back_to_pad) {
        warnings.push(TileWarning::BlurFallback {
            id: tile.cell.id,
            row: tile.cell.row,
            col: tile.cell.col,
            content_width: config.tile.content_width,
            required: config.tile.safe_zone.saturating_mul(2),
        });
    }
    for tile in tiles.iter().filter(|t| t.is_empty()) {
        warnings.push(TileWarning::EmptyTile { id: tile.cell.id });
    }

    let saved = save_tiles(backend, &tiles, output_dir, config, &events)?;

    let stitched = stitch_tiles(&tiles, options.grid, plan.final_tile, &config.preview)
        .ok_or_else(|| {
            ConfigError::Validation(format!("preview of {:?} pixels is too large", plan.preview))
        })?;
    warnings.extend(
        stitched
            .skipped
            .iter()
            .map(|&(row, col)| TileWarning::MissingFromPreview { row, col }),
    );
    for warning in &warnings {
        emit(&events, TileEvent::Warning(warning.clone()));
    }

    let preview_path = output_dir.join(PREVIEW_FILE_NAME);
    backend.save_jpeg(&stitched.image, &preview_path, config.output.quality())?;
    emit(
        &events,
        TileEvent::PreviewSaved {
            path: preview_path.clone(),
            width: stitched.image.width(),
            height: stitched.image.height(),
        },
    );

    Ok(SplitResult {
        plan,
        tiles: saved,
        preview: preview_path,
        warnings,
    })
}

/// Encode every non-empty tile as `tile_<id>.jpg`, in parallel.
fn save_tiles(
    backend: &impl ImageBackend,
    tiles: &[GeneratedTile],
    output_dir: &Path,
    config: &TileConfig,
    events: &Option<Sender<TileEvent>>,
) -> Result<Vec<SavedTile>, PipelineError> {
    let quality = config.output.quality();
    let saved: Vec<Option<SavedTile>> = tiles
        .par_iter()
        .map(|tile| -> Result<Option<SavedTile>, PipelineError> {
            if tile.is_empty() {
                return Ok(None);
            }
            let path = output_dir.join(tile.file_name());
            backend.save_jpeg(&tile.image, &path, quality)?;
            emit(
                events,
                TileEvent::TileSaved {
                    id: tile.cell.id,
                    row: tile.cell.row,
                    col: tile.cell.col,
                    path: path.clone(),
                    width: tile.image.width(),
                    height: tile.image.height(),
                },
            );
            Ok(Some(SavedTile {
                id: tile.cell.id,
                row: tile.cell.row,
                col: tile.cell.col,
                path,
            }))
        })
        .collect::<Result<_, _>>()?;
    Ok(saved.into_iter().flatten().collect())
}
