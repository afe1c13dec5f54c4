//! Conversions between `image` crate buffers and sealscan views.

use crate::raster::ImageView;
use crate::util::{SealScanError, SealScanResult};
use image::{GrayImage, RgbImage};
use std::path::Path;

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &GrayImage) -> SealScanResult<ImageView<'_, u8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    ImageView::from_slice(img.as_raw(), width, height)
}

/// Builds an owned RGB page from an interleaved `width * height * 3` buffer.
///
/// Extra trailing bytes are ignored; a short buffer is rejected.
pub fn rgb_from_raw(data: &[u8], width: usize, height: usize) -> SealScanResult<RgbImage> {
    if width == 0 || height == 0 {
        return Err(SealScanError::InvalidDimensions { width, height });
    }
    let needed = width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(3))
        .ok_or(SealScanError::InvalidDimensions { width, height })?;
    if data.len() < needed {
        return Err(SealScanError::BufferTooSmall {
            needed,
            got: data.len(),
        });
    }
    let w = u32::try_from(width).map_err(|_| SealScanError::InvalidDimensions { width, height })?;
    let h =
        u32::try_from(height).map_err(|_| SealScanError::InvalidDimensions { width, height })?;
    RgbImage::from_raw(w, h, data[..needed].to_vec())
        .ok_or(SealScanError::InvalidDimensions { width, height })
}

/// Loads an image from disk and converts it to 8-bit RGB.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> SealScanResult<RgbImage> {
    let img = image::open(path).map_err(|err| SealScanError::ImageIo {
        reason: err.to_string(),
    })?;
    Ok(img.to_rgb8())
}

/// Loads an image from disk and converts it to 8-bit grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> SealScanResult<GrayImage> {
    let img = image::open(path).map_err(|err| SealScanError::ImageIo {
        reason: err.to_string(),
    })?;
    Ok(img.to_luma8())
}
