use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use sealscan::detect::{CONTOUR_NMS_IOU, EDGE_CONFIDENCE_SCALE};
use sealscan::{ContourDetector, DetectionConfig, DetectionMethod};

/// Draws a `thickness`-pixel black frame on a white page.
fn draw_frame(page: &mut GrayImage, x: i32, y: i32, width: u32, height: u32, thickness: u32) {
    for inset in 0..thickness {
        let rect = Rect::at(x + inset as i32, y + inset as i32)
            .of_size(width - 2 * inset, height - 2 * inset);
        draw_hollow_rect_mut(page, rect, Luma([0]));
    }
}

fn white_page(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([255]))
}

#[test]
fn signature_block_frame_is_detected() {
    let mut page = white_page(500, 400);
    draw_frame(&mut page, 150, 200, 180, 45, 3);

    let detector = ContourDetector::new(DetectionConfig::default());
    let regions = detector.find_blocks(&page);

    assert_eq!(regions.len(), 1);
    let block = &regions[0];
    assert_eq!(block.detection_method(), DetectionMethod::Contour);
    assert!(block.x().abs_diff(150) <= 2, "x = {}", block.x());
    assert!(block.y().abs_diff(200) <= 2, "y = {}", block.y());
    assert!(block.width().abs_diff(180) <= 4);
    assert!(block.height().abs_diff(45) <= 4);
    assert!(block.confidence() > 0.9, "confidence = {}", block.confidence());
}

#[test]
fn white_canvas_has_no_blocks() {
    let detector = ContourDetector::new(DetectionConfig::default());
    let page = white_page(500, 500);
    assert!(detector.find_blocks(&page).is_empty());
    assert!(detector.find_blocks_with_edges(&page).is_empty());
}

#[test]
fn every_geometric_bound_must_hold() {
    let mut page = white_page(600, 500);
    // Square: aspect ratio 1 fails.
    draw_frame(&mut page, 20, 20, 120, 120, 3);
    // Too narrow to pass the width bound.
    draw_frame(&mut page, 200, 20, 90, 30, 3);
    // Too tall to pass the aspect bound.
    draw_frame(&mut page, 350, 20, 150, 100, 3);
    // Passes.
    draw_frame(&mut page, 60, 300, 200, 45, 3);

    let detector = ContourDetector::new(DetectionConfig::default());
    let regions = detector.find_blocks(&page);
    assert_eq!(regions.len(), 1);
    assert!(regions[0].y().abs_diff(300) <= 2);
}

#[test]
fn noise_specks_are_removed() {
    let mut page = white_page(300, 200);
    for i in 0..40u32 {
        let x = (i * 37) % 290;
        let y = (i * 53) % 190;
        draw_filled_rect_mut(&mut page, Rect::at(x as i32, y as i32).of_size(1, 1), Luma([0]));
    }
    let detector = ContourDetector::new(DetectionConfig::default());
    assert!(detector.find_blocks(&page).is_empty());
}

#[test]
fn edge_variant_scales_confidence_down() {
    let mut page = white_page(500, 400);
    draw_frame(&mut page, 150, 200, 180, 45, 3);

    let detector = ContourDetector::new(DetectionConfig::default());
    let regions = detector.find_blocks_with_edges(&page);

    assert!(!regions.is_empty());
    for region in &regions {
        assert!(region.confidence() <= EDGE_CONFIDENCE_SCALE + 1e-6);
        assert_eq!(region.detection_method(), DetectionMethod::Contour);
    }
    let best = &regions[0];
    assert!(best.x().abs_diff(150) <= 6);
    assert!(best.y().abs_diff(200) <= 6);
}

#[test]
fn separate_blocks_both_survive() {
    let mut page = white_page(500, 400);
    draw_frame(&mut page, 100, 100, 180, 45, 3);
    draw_frame(&mut page, 100, 250, 180, 45, 3);

    let detector = ContourDetector::new(DetectionConfig::default());
    let regions = detector.find_blocks(&page);
    assert_eq!(regions.len(), 2);
    assert!(regions[0].iou(&regions[1]) <= CONTOUR_NMS_IOU);
    assert!(regions[0].confidence() >= regions[1].confidence());
}
