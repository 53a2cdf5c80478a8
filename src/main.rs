use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tilegrid::imaging::{EdgeMode, FitMode, GridSpec, ResizeMode};
use tilegrid::pipeline::{self, SplitOptions, TileEvent};
use tilegrid::{config, output};

#[derive(Parser)]
#[command(name = "tilegrid")]
#[command(about = "Split a photo into a numbered grid of feed tiles")]
#[command(long_about = "\
Split a photo into a numbered grid of feed tiles

The source is fitted to the grid, cut into rows x cols tiles of 1016x1350
content, and each tile gets a 32px safe zone on the left and right so the
feed's side crop never eats into the picture. Final tiles are 1080x1350.

Output structure:

  output/
  ├── tile_6.jpg             # top-left: upload LAST
  ├── ...
  ├── tile_1.jpg             # bottom-right: upload FIRST
  └── stitched_preview.jpg   # the whole grid with tile numbers

Fit modes:
  default  scale (or pad) if smaller on either axis, else center-crop
  crop     crop to the grid's aspect ratio, then scale
  manual   crop to the rectangle in --crop-file ({\"x\",\"y\",\"w\",\"h\"}), then scale

Run 'tilegrid gen-config' to generate a documented tilegrid.toml.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Flags shared by every command that reads a source image.
#[derive(clap::Args, Clone)]
struct SourceArgs {
    /// Source image
    #[arg(short, long)]
    input: PathBuf,

    /// Grid rows
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    rows: u32,

    /// Grid columns
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    cols: u32,

    /// How the source is fitted to the grid
    #[arg(long, value_enum, default_value_t)]
    fit_mode: FitMode,

    /// Scaling branch of the default fit mode when the source is too small
    #[arg(long, value_enum, default_value_t)]
    resize_mode: ResizeMode,

    /// Crop rectangle JSON, required by --fit-mode manual
    #[arg(long)]
    crop_file: Option<PathBuf>,

    /// Ignore the EXIF orientation tag
    #[arg(long)]
    no_orientation: bool,

    /// Config file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl SourceArgs {
    fn options(&self, edge_mode: EdgeMode) -> Result<SplitOptions, Box<dyn std::error::Error>> {
        let grid = GridSpec::new(self.rows, self.cols)
            .ok_or("rows and cols must be at least 1 and rows * cols must fit in u32")?;
        if self.fit_mode == FitMode::Manual && self.crop_file.is_none() {
            return Err("--fit-mode manual requires --crop-file".into());
        }
        Ok(SplitOptions {
            grid,
            edge_mode,
            resize_mode: self.resize_mode,
            fit_mode: self.fit_mode,
            crop_file: self.crop_file.clone(),
            apply_orientation: !self.no_orientation,
        })
    }
}

#[derive(Subcommand)]
enum Command {
    /// Write the tiles and the stitched preview
    Split {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory (created if missing)
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Safe-zone fill
        #[arg(long, value_enum, default_value_t)]
        edge_mode: EdgeMode,
    },
    /// Print the geometry decisions without writing anything
    Plan {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print a stock tilegrid.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Split {
            source,
            output: output_dir,
            edge_mode,
        } => {
            let options = source.options(edge_mode)?;
            let tile_config = config::load_config(source.config.as_deref())?;
            init_thread_pool(&tile_config.processing);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    print_event(&event);
                }
            });
            let result = pipeline::split(&source.input, &output_dir, &options, &tile_config, Some(tx));
            printer.join().unwrap();

            let result = result?;
            println!(
                "==> {} tiles in {} (upload tile_1.jpg first)",
                result.tiles.len(),
                output_dir.display()
            );
        }
        Command::Plan { source } => {
            let options = source.options(EdgeMode::default())?;
            let tile_config = config::load_config(source.config.as_deref())?;
            let plan = pipeline::plan(&source.input, &options, &tile_config)?;
            output::print_plan(&plan);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn print_event(event: &TileEvent) {
    for line in output::format_tile_event(event) {
        if event.is_warning() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
