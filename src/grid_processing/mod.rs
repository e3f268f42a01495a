pub mod batch;
pub mod color;
pub mod envelope;
pub mod merge;
pub mod render;
pub mod report;
pub mod resize;

use image::{DynamicImage, ImageReader, RgbImage};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{GridError, GridResult};
pub use color::format_hex;
pub use envelope::{load_envelope, write_envelope, Grid, GridEnvelope, SCHEMA_VERSION};
pub use resize::ResizeFilter;

/// Default grid edge length used by both front ends
pub const DEFAULT_GRID_SIZE: u32 = 500;

/// Validated target dimensions, both at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    pub fn new(width: i64, height: i64) -> GridResult<Self> {
        let invalid = || GridError::InvalidDimensions { width, height };
        if width < 1 || height < 1 {
            return Err(invalid());
        }
        Ok(Self {
            width: u32::try_from(width).map_err(|_| invalid())?,
            height: u32::try_from(height).map_err(|_| invalid())?,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_SIZE,
            height: DEFAULT_GRID_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversionConfig {
    pub filter: ResizeFilter,
    /// Indent the written JSON
    pub pretty: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            filter: ResizeFilter::default(),
            pretty: true,
        }
    }
}

/// What a successful `convert_file` produced
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub source_dimensions: (u32, u32),
    pub grid_width: u32,
    pub grid_height: u32,
    pub elapsed: Duration,
}

/// Walk the pixels row by row and format each one as `#RRGGBB`.
///
/// `on_row(completed, total)` is called after every finished row.
pub fn image_to_grid<F>(img: &RgbImage, mut on_row: F) -> Grid
where
    F: FnMut(u32, u32),
{
    let (width, height) = img.dimensions();
    let mut grid = Vec::with_capacity(height as usize);

    for y in 0..height {
        let row: Vec<String> = (0..width)
            .map(|x| color::format_rgb(img.get_pixel(x, y)))
            .collect();
        grid.push(row);
        on_row(y + 1, height);
    }

    grid
}

/// Decode an image from disk, classifying the failure.
pub fn open_image(path: &Path) -> GridResult<DynamicImage> {
    if !path.is_file() {
        return Err(GridError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = ImageReader::open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GridError::NotFound {
                path: path.to_path_buf(),
            },
            _ => GridError::io(path, e),
        })?
        .with_guessed_format()
        .map_err(|e| GridError::io(path, e))?;

    reader.decode().map_err(|e| GridError::Decode {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Image to hex-grid converter.
///
/// Holds no state besides its configuration; every call is independent.
#[derive(Debug, Clone, Default)]
pub struct GridConverter {
    config: ConversionConfig,
}

impl GridConverter {
    pub fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Resize, drop alpha and scan an already decoded image
    pub fn convert_image<F>(
        &self,
        img: &DynamicImage,
        size: GridSize,
        on_row: F,
    ) -> GridResult<GridEnvelope>
    where
        F: FnMut(u32, u32),
    {
        let rgb = img.to_rgb8();
        let resized = resize::resize_exact(&rgb, size, self.config.filter)?;
        let grid = image_to_grid(&resized, on_row);
        Ok(GridEnvelope::new(size, grid))
    }

    /// Convert `source` and write the grid document to `destination`.
    ///
    /// Dimensions are validated and the source decoded before anything is
    /// written, so those failures never leave an output file behind.
    pub fn convert_file<F>(
        &self,
        source: &Path,
        destination: &Path,
        width: i64,
        height: i64,
        on_row: F,
    ) -> GridResult<ConversionOutcome>
    where
        F: FnMut(u32, u32),
    {
        let start = Instant::now();
        let size = GridSize::new(width, height)?;
        let img = open_image(source)?;
        let source_dimensions = (img.width(), img.height());

        let envelope = self.convert_image(&img, size, on_row)?;
        write_envelope(&envelope, destination, self.config.pretty)?;

        Ok(ConversionOutcome {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            source_dimensions,
            grid_width: envelope.grid_width,
            grid_height: envelope.grid_height,
            elapsed: start.elapsed(),
        })
    }
}
