use std::path::PathBuf;

/// Errors raised by the grid conversion core.
///
/// Every variant is returned to the caller untouched; front ends decide how to
/// present them (console message and exit code, or a modal dialog).
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("source image not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid grid dimensions {width}x{height}: width and height must be at least 1")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("resize failed: {0}")]
    Resize(String),

    #[error("failed to parse grid document {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed grid in {}: {reason}", path.display())]
    MalformedGrid { path: PathBuf, reason: String },

    #[error("grid dimensions differ: expected {expected_width}x{expected_height}, found {width}x{height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },

    #[error("at least two grids are required to merge")]
    NotEnoughGrids,
}

impl GridError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type GridResult<T> = Result<T, GridError>;
