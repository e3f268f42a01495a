use clap::ValueEnum;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use super::GridSize;
use crate::error::{GridError, GridResult};

/// Resampling filter used to bring the source image to the grid size
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Display, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    /// Lanczos windowed sinc, 3 lobes (best for downsampling photos)
    #[default]
    Lanczos3,
    /// Catmull-Rom bicubic
    CatmullRom,
    /// Mitchell-Netravali bicubic
    Mitchell,
    /// Bilinear interpolation
    Bilinear,
    /// Box / area averaging
    Box,
    /// Nearest neighbour (keeps hard pixel edges)
    Nearest,
}

impl ResizeFilter {
    fn algorithm(self) -> ResizeAlg {
        match self {
            ResizeFilter::Lanczos3 => ResizeAlg::Convolution(FilterType::Lanczos3),
            ResizeFilter::CatmullRom => ResizeAlg::Convolution(FilterType::CatmullRom),
            ResizeFilter::Mitchell => ResizeAlg::Convolution(FilterType::Mitchell),
            ResizeFilter::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
            ResizeFilter::Box => ResizeAlg::Convolution(FilterType::Box),
            ResizeFilter::Nearest => ResizeAlg::Nearest,
        }
    }
}

/// Resize an image to exactly `size`.
///
/// The resize always runs, even when the source already has the target
/// dimensions, so every conversion goes through the same pipeline.
pub fn resize_exact(img: &RgbImage, size: GridSize, filter: ResizeFilter) -> GridResult<RgbImage> {
    let (src_width, src_height) = img.dimensions();
    if src_width == 0 || src_height == 0 {
        return Err(GridError::Resize(format!(
            "source image is empty ({}x{})",
            src_width, src_height
        )));
    }

    let src_image = Image::from_vec_u8(src_width, src_height, img.as_raw().clone(), PixelType::U8x3)
        .map_err(|e| GridError::Resize(e.to_string()))?;

    let mut dst_image = Image::new(size.width(), size.height(), PixelType::U8x3);

    let options = ResizeOptions::new().resize_alg(filter.algorithm());
    Resizer::new()
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| GridError::Resize(e.to_string()))?;

    RgbImage::from_raw(size.width(), size.height(), dst_image.buffer().to_vec()).ok_or_else(|| {
        GridError::Resize(format!(
            "resized buffer does not match {}x{}",
            size.width(),
            size.height()
        ))
    })
}
