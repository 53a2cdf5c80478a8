//! Tool configuration.
//!
//! The tile format (content size, safe zone), encode quality, blur radius and
//! preview styling are an explicit configuration value handed to each stage,
//! not process-wide constants. That lets tests run the whole pipeline on a
//! tiny format and lets users target other portrait ratios.
//!
//! ## Config File
//!
//! Pass `--config path/to/tilegrid.toml`. Without it the stock defaults apply.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [tile]
//! content_width = 1016      # Protected content width per tile
//! content_height = 1350     # Tile height (4:5 with the safe zones)
//! safe_zone = 32            # Added on the left and on the right
//!
//! [output]
//! quality = 95              # JPEG quality (1-100)
//!
//! [blur]
//! radius = 10               # Box blur radius for --edge-mode blur
//!
//! [preview]
//! margin = 1                # Gap between tiles in the stitched preview
//! label_scale = 2           # Tile number glyph size (multiples of 8px)
//! label_padding = 3         # Padding around the number's background box
//! label_background_alpha = 180
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Config files are sparse: override just the values you need. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::calculations::{final_tile_size, stitch_canvas_size, total_content_size};
use crate::imaging::{GridSpec, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full tool configuration loaded from `tilegrid.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TileConfig {
    /// Tile geometry.
    pub tile: TileFormat,
    /// Encoding settings.
    pub output: OutputConfig,
    /// Safe-zone blur settings.
    pub blur: BlurConfig,
    /// Stitched preview styling.
    pub preview: PreviewConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

/// Upper bound for tile content sides, the safe zone, and preview spacing.
pub const MAX_TILE_SIDE: u32 = 16_384;
/// Upper bound for `blur.radius`.
pub const MAX_BLUR_RADIUS: u32 = 1_024;
/// Upper bound for `preview.label_scale`.
pub const MAX_LABEL_SCALE: u32 = 64;

fn check_range(key: &str, value: u32, min: u32, max: u32) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{key} must be {min}-{max}, got {value}"
        )))
    }
}

impl TileConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("tile.content_width", self.tile.content_width, 1, MAX_TILE_SIDE)?;
        check_range("tile.content_height", self.tile.content_height, 1, MAX_TILE_SIDE)?;
        check_range("tile.safe_zone", self.tile.safe_zone, 0, MAX_TILE_SIDE)?;
        check_range("output.quality", self.output.quality, 1, 100)?;
        check_range("blur.radius", self.blur.radius, 0, MAX_BLUR_RADIUS)?;
        check_range("preview.margin", self.preview.margin, 0, MAX_TILE_SIDE)?;
        check_range("preview.label_scale", self.preview.label_scale, 1, MAX_LABEL_SCALE)?;
        check_range("preview.label_padding", self.preview.label_padding, 0, MAX_TILE_SIDE)?;
        Ok(())
    }

    /// Stitched preview size for `grid`.
    pub fn preview_size(&self, grid: GridSpec) -> Result<(u32, u32), ConfigError> {
        let tile = self.tile.final_size()?;
        stitch_canvas_size(grid, tile, self.preview.margin).ok_or_else(|| {
            ConfigError::Validation(format!(
                "a {}x{} preview of {}x{} tiles is too large",
                grid.rows, grid.cols, tile.0, tile.1
            ))
        })
    }
}

/// Per-tile geometry. The safe zone applies to the width axis only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TileFormat {
    pub content_width: u32,
    pub content_height: u32,
    pub safe_zone: u32,
}

impl Default for TileFormat {
    fn default() -> Self {
        Self {
            content_width: 1016,
            content_height: 1350,
            safe_zone: 32,
        }
    }
}

impl TileFormat {
    pub fn content_size(&self) -> (u32, u32) {
        (self.content_width, self.content_height)
    }

    /// Size of a finished tile: content plus a safe zone on each side.
    pub fn final_size(&self) -> Result<(u32, u32), ConfigError> {
        final_tile_size(self.content_size(), self.safe_zone).ok_or_else(|| {
            ConfigError::Validation(format!(
                "tile width {} + 2 * safe_zone {} is too large",
                self.content_width, self.safe_zone
            ))
        })
    }

    /// Content area the fitted image must cover for `grid`.
    pub fn total_content(&self, grid: GridSpec) -> Result<(u32, u32), ConfigError> {
        total_content_size(self.content_size(), grid).ok_or_else(|| {
            ConfigError::Validation(format!(
                "a {}x{} grid of {}x{} tiles is too large",
                grid.rows, grid.cols, self.content_width, self.content_height
            ))
        })
    }
}

/// Encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG quality (1-100).
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { quality: 95 }
    }
}

impl OutputConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

/// Safe-zone blur settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlurConfig {
    /// Box blur radius; 0 disables blurring (edges are copied sharp).
    pub radius: u32,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self { radius: 10 }
    }
}

/// Stitched preview styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Gap in pixels between neighbouring tiles.
    pub margin: u32,
    /// Integer scale applied to the 8x8 number glyphs.
    pub label_scale: u32,
    /// Padding around the text inside the label background.
    pub label_padding: u32,
    /// Opacity of the white label background (0-255).
    pub label_background_alpha: u8,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            margin: 1,
            label_scale: 2,
            label_padding: 3,
            label_background_alpha: 180,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel tile workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, never below 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(TileConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                let merged = match table.remove(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => value,
                };
                table.insert(key, merged);
            }
            toml::Value::Table(table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse a config document, layer it over the stock defaults and validate.
pub fn parse_config(content: &str) -> Result<TileConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let config: TileConfig = merge_toml(stock_defaults_value(), overlay).try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, or the stock defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<TileConfig, ConfigError> {
    match path {
        Some(path) => parse_config(&fs::read_to_string(path)?),
        None => Ok(TileConfig::default()),
    }
}

/// Returns a fully-commented stock `tilegrid.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# tilegrid configuration
# ======================
#
# All settings are optional. Remove or comment out any you don't need;
# missing values fall back to the defaults shown here.

# ---------------------------------------------------------------------------
# Tile geometry
# ---------------------------------------------------------------------------
# Each tile is content_width + 2 * safe_zone wide and content_height tall.
# The defaults give 1080x1350 (4:5) tiles whose 1016px centre survives the
# profile grid's square crop. Each value is at most 16384.
[tile]
content_width = 1016
content_height = 1350
safe_zone = 32

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[output]
quality = 95

# ---------------------------------------------------------------------------
# Safe-zone blur (only used with --edge-mode blur)
# ---------------------------------------------------------------------------
[blur]
radius = 10                 # 0-1024

# ---------------------------------------------------------------------------
# Stitched preview
# ---------------------------------------------------------------------------
[preview]
margin = 1
label_scale = 2             # 1-64
label_padding = 3
label_background_alpha = 180

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel tile workers. Omit to use all CPU cores.
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_format_is_four_by_five() {
        let config = TileConfig::default();
        assert_eq!(config.tile.content_size(), (1016, 1350));
        assert_eq!(config.tile.final_size().unwrap(), (1080, 1350));
        assert_eq!(config.output.quality, 95);
        assert_eq!(config.blur.radius, 10);
        assert_eq!(config.preview.margin, 1);
    }

    #[test]
    fn total_content_for_grid() {
        let format = TileFormat::default();
        let grid = GridSpec::new(3, 3).unwrap();
        assert_eq!(format.total_content(grid).unwrap(), (3048, 4050));
    }

    #[test]
    fn total_content_overflow_is_validation_error() {
        let grid = GridSpec::new(4_000_000, 1).unwrap();
        let result = TileFormat::default().total_content(grid);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn final_size_overflow_is_validation_error() {
        let format = TileFormat {
            safe_zone: 3_000_000_000,
            ..TileFormat::default()
        };
        assert!(matches!(format.final_size(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn preview_size_for_grid() {
        let config = TileConfig::default();
        let grid = GridSpec::new(2, 2).unwrap();
        assert_eq!(config.preview_size(grid).unwrap(), (2161, 2701));

        let huge = GridSpec::new(1, 4_000_000).unwrap();
        assert!(matches!(
            config.preview_size(huge),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config(
            r#"
[tile]
safe_zone = 40
"#,
        )
        .unwrap();
        assert_eq!(config.tile.safe_zone, 40);
        // Unspecified values keep their defaults
        assert_eq!(config.tile.content_width, 1016);
        assert_eq!(config.output.quality, 95);
    }

    #[test]
    fn parse_empty_config_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.tile, TileFormat::default());
    }

    #[test]
    fn unknown_key_rejected() {
        let result = parse_config("[tile]\nbleed = 3\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_section_rejected() {
        let result = parse_config("[upload]\nuser = \"me\"\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn validate_zero_content_width() {
        let result = parse_config("[tile]\ncontent_width = 0\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_quality_bounds() {
        assert!(matches!(
            parse_config("[output]\nquality = 0\n"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            parse_config("[output]\nquality = 101\n"),
            Err(ConfigError::Validation(_))
        ));
        assert!(parse_config("[output]\nquality = 100\n").is_ok());
    }

    #[test]
    fn validate_rejects_oversized_safe_zone() {
        let result = parse_config("[tile]\nsafe_zone = 3000000000\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
        assert!(parse_config("[tile]\nsafe_zone = 16384\n").is_ok());
    }

    #[test]
    fn validate_rejects_oversized_blur_radius() {
        let result = parse_config("[blur]\nradius = 3000000000\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
        assert!(parse_config("[blur]\nradius = 1024\n").is_ok());
        assert!(parse_config("[blur]\nradius = 0\n").is_ok());
    }

    #[test]
    fn validate_rejects_oversized_content_and_preview_spacing() {
        for doc in [
            "[tile]\ncontent_width = 20000\n",
            "[tile]\ncontent_height = 20000\n",
            "[preview]\nmargin = 20000\n",
            "[preview]\nlabel_scale = 65\n",
            "[preview]\nlabel_padding = 20000\n",
        ] {
            assert!(
                matches!(parse_config(doc), Err(ConfigError::Validation(_))),
                "accepted {doc:?}"
            );
        }
    }

    #[test]
    fn validation_message_names_the_key() {
        let err = parse_config("[blur]\nradius = 5000\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Config validation error: blur.radius must be 0-1024, got 5000"
        );
    }

    #[test]
    fn validate_label_scale_zero() {
        let result = parse_config("[preview]\nlabel_scale = 0\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn merge_toml_nested_override_keeps_siblings() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn load_config_without_path_is_default() {
        let config = load_config(None).unwrap();
        assert_eq!(config.tile, TileFormat::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tilegrid.toml");
        fs::write(&path, "[blur]\nradius = 4\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.blur.radius, 4);
    }

    #[test]
    fn load_config_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config = parse_config(stock_config_toml()).unwrap();
        assert_eq!(config.tile, TileFormat::default());
        assert_eq!(config.preview.label_background_alpha, 180);
        assert!(config.processing.max_processes.is_none());
    }

    #[test]
    fn effective_threads_auto_and_constrained() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
        let one = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&one), 1);
        let huge = ProcessingConfig {
            max_processes: Some(99_999),
        };
        assert_eq!(effective_threads(&huge), cores);
    }
}
