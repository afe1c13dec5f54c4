//! Visual overlays of detection results.

use crate::region::{DetectedRegion, DetectionMethod};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

/// Outline thickness in pixels.
const BOX_THICKNESS: u32 = 2;

/// Outline color for regions from `method`.
pub fn method_color(method: DetectionMethod) -> Rgb<u8> {
    match method {
        DetectionMethod::Template => Rgb([0, 255, 0]),
        DetectionMethod::Contour => Rgb([0, 0, 255]),
        DetectionMethod::Color => Rgb([255, 0, 0]),
    }
}

/// Returns a copy of `page` with every region outlined in its method color.
pub fn draw_detections(page: &RgbImage, regions: &[DetectedRegion]) -> RgbImage {
    let mut canvas = page.clone();
    for region in regions {
        let color = method_color(region.detection_method());
        for inset in 0..BOX_THICKNESS {
            let width = region.width().saturating_sub(2 * inset);
            let height = region.height().saturating_sub(2 * inset);
            if width == 0 || height == 0 {
                break;
            }
            let rect = Rect::at((region.x() + inset) as i32, (region.y() + inset) as i32)
                .of_size(width, height);
            draw_hollow_rect_mut(&mut canvas, rect, color);
        }
    }
    canvas
}
