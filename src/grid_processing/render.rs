use image::{ImageBuffer, ImageError, Rgba, RgbaImage};
use std::fs;
use std::path::Path;

use super::color::parse_color;
use super::envelope::GridEnvelope;
use crate::error::{GridError, GridResult};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Rebuild an image from a grid document.
///
/// Empty or missing cells stay fully transparent.
pub fn render_grid(envelope: &GridEnvelope) -> RgbaImage {
    ImageBuffer::from_fn(envelope.grid_width, envelope.grid_height, |x, y| {
        envelope
            .data
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .and_then(|cell| parse_color(cell))
            .unwrap_or(TRANSPARENT)
    })
}

/// Save a rendered grid, format chosen from the extension (PNG keeps alpha)
pub fn save_rendered(img: &RgbaImage, path: &Path) -> GridResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| GridError::io(parent, e))?;
    }

    img.save(path).map_err(|e| match e {
        ImageError::IoError(io) => GridError::io(path, io),
        other => GridError::io(path, std::io::Error::other(other)),
    })
}
