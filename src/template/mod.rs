//! Template storage, scaling, and planning utilities.

use crate::raster::io::view_from_gray_image;
use crate::raster::ImageView;
use crate::util::{SealScanError, SealScanResult};
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};

mod library;
mod plan;

pub use library::{TemplateLibrary, TemplateWarning};
pub use plan::TemplatePlan;

/// Scaled templates narrower or shorter than this are not evaluated.
pub const MIN_TEMPLATE_SIDE: u32 = 10;

/// Owned grayscale seal template.
#[derive(Clone, Debug)]
pub struct Template {
    img: GrayImage,
}

impl Template {
    /// Creates a template from a contiguous grayscale buffer.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> SealScanResult<Self> {
        let needed = width
            .checked_mul(height)
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
        let img = GrayImage::from_raw(w, h, data)
            .ok_or(SealScanError::InvalidDimensions { width, height })?;
        Self::from_gray(img)
    }

    /// Wraps a grayscale image.
    pub fn from_gray(img: GrayImage) -> SealScanResult<Self> {
        if img.width() == 0 || img.height() == 0 {
            return Err(SealScanError::InvalidDimensions {
                width: img.width() as usize,
                height: img.height() as usize,
            });
        }
        Ok(Self { img })
    }

    /// Converts a color image to grayscale and wraps it.
    pub fn from_rgb(img: &RgbImage) -> SealScanResult<Self> {
        Self::from_gray(imageops::grayscale(img))
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> u32 {
        self.img.width()
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> u32 {
        self.img.height()
    }

    /// Returns the underlying grayscale image.
    pub fn image(&self) -> &GrayImage {
        &self.img
    }

    /// Returns a borrowed view of the template data.
    pub fn view(&self) -> SealScanResult<ImageView<'_, u8>> {
        view_from_gray_image(&self.img)
    }

    /// Resamples the template by `scale`.
    ///
    /// Target sides are truncated to whole pixels. Returns `None` when either
    /// side falls below `MIN_TEMPLATE_SIDE`. Shrinking uses a triangle filter,
    /// enlarging a Catmull-Rom cubic.
    pub fn scaled(&self, scale: f32) -> Option<GrayImage> {
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }
        let new_width = (self.img.width() as f32 * scale) as u32;
        let new_height = (self.img.height() as f32 * scale) as u32;
        if new_width < MIN_TEMPLATE_SIDE || new_height < MIN_TEMPLATE_SIDE {
            return None;
        }
        if new_width == self.img.width() && new_height == self.img.height() {
            return Some(self.img.clone());
        }

        let filter = if scale < 1.0 {
            FilterType::Triangle
        } else {
            FilterType::CatmullRom
        };
        Some(imageops::resize(&self.img, new_width, new_height, filter))
    }
}
