//! Region-of-interest cropping for downstream OCR.

use crate::region::DetectedRegion;
use image::{ImageBuffer, Pixel};

/// Crops a region from a page, growing it by `padding` pixels on each side.
///
/// The padded box is clamped to the page; `None` if nothing remains.
pub fn crop_roi<P>(
    page: &ImageBuffer<P, Vec<P::Subpixel>>,
    region: &DetectedRegion,
    padding: u32,
) -> Option<ImageBuffer<P, Vec<P::Subpixel>>>
where
    P: Pixel,
{
    let (width, height) = page.dimensions();
    let (x1, y1, x2, y2) = region.bbox();
    let left = x1.saturating_sub(padding).min(width);
    let top = y1.saturating_sub(padding).min(height);
    let right = x2.saturating_add(padding).min(width);
    let bottom = y2.saturating_add(padding).min(height);
    if right <= left || bottom <= top {
        return None;
    }

    Some(ImageBuffer::from_fn(right - left, bottom - top, |x, y| {
        *page.get_pixel(left + x, top + y)
    }))
}

/// Crops every region; regions falling outside the page are skipped.
pub fn crop_rois<'r, P>(
    page: &ImageBuffer<P, Vec<P::Subpixel>>,
    regions: &'r [DetectedRegion],
    padding: u32,
) -> Vec<(&'r DetectedRegion, ImageBuffer<P, Vec<P::Subpixel>>)>
where
    P: Pixel,
{
    regions
        .iter()
        .filter_map(|region| crop_roi(page, region, padding).map(|roi| (region, roi)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{crop_roi, crop_rois};
    use crate::region::{DetectedRegion, DetectionMethod};
    use image::{GrayImage, Luma};

    #[test]
    fn padding_is_clamped_to_page() {
        let page = GrayImage::from_fn(50, 40, |x, y| Luma([(x + y) as u8]));
        let region = DetectedRegion::new(2, 3, 10, 10, 0.9, DetectionMethod::Color).unwrap();
        let roi = crop_roi(&page, &region, 5).unwrap();
        assert_eq!(roi.dimensions(), (17, 18));
        assert_eq!(roi.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn regions_off_page_are_skipped() {
        let page = GrayImage::new(20, 20);
        let inside = DetectedRegion::new(0, 0, 5, 5, 0.9, DetectionMethod::Color).unwrap();
        let outside = DetectedRegion::new(30, 30, 5, 5, 0.9, DetectionMethod::Color).unwrap();
        let regions = [inside, outside];
        let rois = crop_rois(&page, &regions, 0);
        assert_eq!(rois.len(), 1);
        assert_eq!(rois[0].1.dimensions(), (5, 5));
    }
}
