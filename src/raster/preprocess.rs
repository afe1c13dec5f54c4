//! Page preprocessing shared by all detectors.

use crate::raster::clahe::{clahe, ClaheParams};
use image::{imageops, GrayImage, RgbImage};

/// Gaussian sigma matching a 3x3 smoothing kernel.
const PAGE_BLUR_SIGMA: f32 = 0.8;

/// A page prepared once and handed to every detector.
///
/// `gray` is noise-reduced and contrast-enhanced for template and contour
/// analysis; `color` is the noise-reduced page for color segmentation.
#[derive(Clone, Debug)]
pub struct PreparedPage {
    gray: GrayImage,
    color: RgbImage,
}

impl PreparedPage {
    /// Wraps already-prepared representations.
    pub fn from_parts(gray: GrayImage, color: RgbImage) -> Self {
        Self { gray, color }
    }

    /// Grayscale representation.
    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }

    /// Color representation.
    pub fn color(&self) -> &RgbImage {
        &self.color
    }

    /// Page size as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.color.dimensions()
    }
}

/// Blurs the page, derives grayscale, and equalizes its contrast.
pub fn preprocess_for_detection(page: &RgbImage) -> PreparedPage {
    let color = imageops::blur(page, PAGE_BLUR_SIGMA);
    let gray = imageops::grayscale(&color);
    let gray = clahe(&gray, ClaheParams::default());
    PreparedPage { gray, color }
}

#[cfg(test)]
mod tests {
    use super::preprocess_for_detection;
    use image::{Rgb, RgbImage};

    #[test]
    fn keeps_page_dimensions() {
        let page = RgbImage::from_pixel(100, 60, Rgb([255, 255, 255]));
        let prepared = preprocess_for_detection(&page);
        assert_eq!(prepared.dimensions(), (100, 60));
        assert_eq!(prepared.gray().dimensions(), (100, 60));
    }

    #[test]
    fn white_page_stays_white() {
        let page = RgbImage::from_pixel(40, 40, Rgb([255, 255, 255]));
        let prepared = preprocess_for_detection(&page);
        assert!(prepared.gray().pixels().all(|p| p[0] >= 250));
    }
}
