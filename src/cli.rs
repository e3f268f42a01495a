use clap::Parser;
use std::path::PathBuf;

use crate::grid_processing::ResizeFilter;

/// What the command line asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Convert,
    Merge,
    Render,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "grid-converter",
    version,
    about = "Convert images into JSON grids of hex color strings",
    long_about = "
Grid Converter

Resizes an image to a fixed grid size and writes a JSON document in which every
pixel is a #RRGGBB string, organized as rows (top to bottom) of columns
(left to right):

  {
    \"timestamp\": \"2026-10-17T09:30:00.123+00:00\",
    \"version\": \"1.0\",
    \"gridWidth\": 500,
    \"gridHeight\": 500,
    \"data\": [[\"#RRGGBB\", ...], ...]
  }

Example Usage:
  # Convert one image to a 500x500 grid next to the source (photo_grid.json)
  grid-converter photo.png

  # Custom size and destination
  grid-converter photo.png -W 64 -H 48 -o grids/photo.json

  # Convert a whole directory in parallel, with a summary table
  grid-converter ~/Pictures -o ~/grids --report

  # Layer grids: earlier files override later ones on painted cells
  grid-converter --merge top.json middle.json base.json -o merged.json

  # Turn a grid document back into a PNG
  grid-converter --render photo_grid.json -o preview.png"
)]
pub struct Args {
    /// Source images or directories (grid documents with --merge/--render)
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Output file for a single input, output directory for several
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Grid width in cells [default: 500]
    #[arg(short = 'W', long = "width", value_name = "WIDTH", allow_negative_numbers = true)]
    pub width: Option<i64>,

    /// Grid height in cells [default: 500]
    #[arg(short = 'H', long = "height", value_name = "HEIGHT", allow_negative_numbers = true)]
    pub height: Option<i64>,

    /// Resampling filter used for resizing [default: lanczos3]
    #[arg(long = "filter", value_name = "FILTER")]
    pub filter: Option<ResizeFilter>,

    /// Write JSON without indentation
    #[arg(long = "compact")]
    pub compact: bool,

    /// Merge grid documents instead of converting images
    #[arg(long = "merge", conflicts_with = "render")]
    pub merge: bool,

    /// Render grid documents back into PNG images
    #[arg(long = "render")]
    pub render: bool,

    /// Comma-separated list of image extensions picked up in directories
    #[arg(long = "extensions", value_name = "LIST")]
    pub extensions: Option<String>,

    /// Number of parallel jobs for directory conversion (0 = auto-detect CPU cores)
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,

    /// Display a summary table after converting several files
    #[arg(long = "report")]
    pub report: bool,

    /// Enable verbose output with detailed progress information
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Emit progress and results as JSON lines on stdout (suppresses other output)
    #[arg(long = "json-progress")]
    pub json_progress: bool,

    /// Load defaults from a JSON config file (command-line flags take precedence)
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

impl Args {
    pub fn mode(&self) -> Mode {
        if self.merge {
            Mode::Merge
        } else if self.render {
            Mode::Render
        } else {
            Mode::Convert
        }
    }
}
