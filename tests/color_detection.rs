use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use sealscan::detect::COLOR_NMS_IOU;
use sealscan::{ColorDetector, DetectionConfig, DetectionMethod, Hsv};

fn white_page(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
}

#[test]
fn red_seal_is_detected() {
    let mut page = white_page(300, 300);
    draw_filled_circle_mut(&mut page, (150, 140), 30, Rgb([230, 20, 20]));

    let detector = ColorDetector::new(DetectionConfig::default());
    let regions = detector.find_blobs(&page);

    let red: Vec<_> = regions.iter().filter(|r| r.color() == Some("red")).collect();
    assert_eq!(red.len(), 1);
    let seal = red[0];
    assert_eq!(seal.detection_method(), DetectionMethod::Color);
    assert!(seal.confidence() >= 0.6);
    let (cx, cy) = seal.center();
    assert!(cx.abs_diff(150) <= 3 && cy.abs_diff(140) <= 3);
}

#[test]
fn wrapped_red_hue_is_labelled_red() {
    let mut page = white_page(200, 200);
    draw_filled_circle_mut(&mut page, (100, 100), 28, Rgb([255, 0, 40]));

    let detector = ColorDetector::new(DetectionConfig::default());
    let regions = detector.find_blobs(&page);
    assert!(!regions.is_empty());
    assert!(regions.iter().all(|r| r.color() == Some("red")));
}

#[test]
fn blue_and_green_seals_keep_their_labels() {
    let mut page = white_page(400, 200);
    draw_filled_circle_mut(&mut page, (80, 100), 30, Rgb([20, 40, 220]));
    draw_filled_rect_mut(&mut page, Rect::at(250, 70).of_size(50, 50), Rgb([20, 160, 40]));

    let detector = ColorDetector::new(DetectionConfig::default());
    let regions = detector.find_blobs(&page);

    let mut labels: Vec<&str> = regions.iter().filter_map(|r| r.color()).collect();
    labels.sort();
    assert_eq!(labels, ["blue", "green"]);
    for (i, a) in regions.iter().enumerate() {
        for b in &regions[i + 1..] {
            assert!(a.iou(b) <= COLOR_NMS_IOU);
        }
    }
}

#[test]
fn white_canvas_has_no_blobs() {
    let detector = ColorDetector::new(DetectionConfig::default());
    assert!(detector.find_blobs(&white_page(500, 500)).is_empty());
}

#[test]
fn blobs_outside_area_bounds_are_ignored() {
    let mut page = white_page(400, 300);
    draw_filled_circle_mut(&mut page, (60, 60), 6, Rgb([230, 20, 20]));
    draw_filled_circle_mut(&mut page, (250, 150), 60, Rgb([230, 20, 20]));

    let detector = ColorDetector::new(DetectionConfig::default());
    assert!(detector.find_blobs(&page).is_empty());
}

#[test]
fn custom_band_finds_new_color() {
    let mut page = white_page(200, 200);
    draw_filled_circle_mut(&mut page, (100, 100), 30, Rgb([150, 40, 220]));

    let mut detector = ColorDetector::new(DetectionConfig::default());
    assert!(detector.find_blobs(&page).is_empty());

    detector.add_color_range("engineering_purple", Hsv::new(131, 50, 50), Hsv::new(160, 255, 255));
    let regions = detector.find_blobs(&page);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].color(), Some("purple"));
}
