//! Colored seal detection by HSV range segmentation.

use crate::candidate::suppress_overlaps;
use crate::config::DetectionConfig;
use crate::detect::shape::external_shapes;
use crate::detect::RegionDetector;
use crate::raster::hsv::{in_range, to_hsv, Hsv};
use crate::raster::preprocess::PreparedPage;
use crate::region::{DetectedRegion, DetectionMethod};
use crate::trace::{trace_event, trace_span};
use crate::util::math::{clamp_unit, safe_ratio};
use image::{imageops, GrayImage, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, dilate, open};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// IoU above which overlapping blobs are suppressed.
pub const COLOR_NMS_IOU: f32 = 0.3;

/// Gaussian sigma of a 5x5 smoothing kernel.
const COLOR_BLUR_SIGMA: f32 = 1.1;
const BAND_PREFIX: &str = "engineering_";
const WRAP_SUFFIX: &str = "_wrap";
/// Exclusive aspect ratio bounds for squarish blobs.
const SQUARE_ASPECT: (f64, f64) = (0.5, 2.0);

/// A named inclusive HSV range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorBand {
    /// Band name; an `engineering_` prefix is dropped from region tags.
    pub name: String,
    /// Inclusive lower corner.
    pub lower: Hsv,
    /// Inclusive upper corner.
    pub upper: Hsv,
}

impl ColorBand {
    /// Creates a band.
    pub fn new(name: impl Into<String>, lower: Hsv, upper: Hsv) -> Self {
        Self {
            name: name.into(),
            lower,
            upper,
        }
    }

    /// Color tag for regions found in this band, before wrap merging.
    pub fn label(&self) -> &str {
        self.name.strip_prefix(BAND_PREFIX).unwrap_or(&self.name)
    }
}

fn default_bands() -> Vec<ColorBand> {
    vec![
        ColorBand::new("engineering_red", Hsv::new(0, 50, 50), Hsv::new(10, 255, 255)),
        ColorBand::new(
            "engineering_red_wrap",
            Hsv::new(170, 50, 50),
            Hsv::new(180, 255, 255),
        ),
        ColorBand::new("engineering_blue", Hsv::new(100, 50, 50), Hsv::new(130, 255, 255)),
        ColorBand::new("engineering_green", Hsv::new(40, 40, 40), Hsv::new(80, 255, 255)),
        ColorBand::new("engineering_black", Hsv::new(0, 0, 0), Hsv::new(180, 255, 50)),
    ]
}

/// Finds round or squarish blobs printed in seal colors.
#[derive(Clone, Debug)]
pub struct ColorDetector {
    config: DetectionConfig,
    bands: Vec<ColorBand>,
}

impl ColorDetector {
    /// Creates a detector with the red, blue, green, and black bands.
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            bands: default_bands(),
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Adds a band, replacing any existing band with the same name.
    pub fn add_color_range(&mut self, name: impl Into<String>, lower: Hsv, upper: Hsv) {
        let band = ColorBand::new(name, lower, upper);
        trace_event!("color_range_added", band = band.name.as_str());
        match self.bands.iter_mut().find(|b| b.name == band.name) {
            Some(existing) => *existing = band,
            None => self.bands.push(band),
        }
    }

    /// Returns the bands in evaluation order.
    pub fn color_ranges(&self) -> &[ColorBand] {
        &self.bands
    }

    /// Finds seal-colored blobs on an RGB page.
    pub fn find_blobs(&self, page: &RgbImage) -> Vec<DetectedRegion> {
        let _span = trace_span!("color_blobs", bands = self.bands.len()).entered();

        let hsv = to_hsv(&imageops::blur(page, COLOR_BLUR_SIGMA));
        let mut candidates = Vec::new();
        for band in &self.bands {
            let mask = clean_mask(&in_range(&hsv, band.lower, band.upper));
            self.collect_band(&mask, band.label(), &mut candidates);
        }
        merge_wrapped_labels(&mut candidates);

        trace_event!("color_candidates", count = candidates.len());
        suppress_overlaps(candidates, COLOR_NMS_IOU)
    }

    fn collect_band(&self, mask: &GrayImage, label: &str, out: &mut Vec<DetectedRegion>) {
        let cfg = &self.config;
        for shape in external_shapes(mask) {
            if !(cfg.color_min_area < shape.area && shape.area < cfg.color_max_area) {
                continue;
            }
            if shape.perimeter <= 0.0 {
                continue;
            }

            let circularity = 4.0 * PI * shape.area / (shape.perimeter * shape.perimeter);
            let aspect = shape.aspect_ratio();
            let is_circular = circularity > cfg.color_min_circularity;
            let is_square = SQUARE_ASPECT.0 < aspect && aspect < SQUARE_ASPECT.1;
            if !(is_circular || is_square) {
                continue;
            }

            let confidence = blob_confidence(
                circularity,
                aspect,
                shape.area,
                (cfg.color_min_area, cfg.color_max_area),
                is_circular,
            );
            if let Ok(region) = DetectedRegion::new(
                shape.x,
                shape.y,
                shape.width,
                shape.height,
                confidence,
                DetectionMethod::Color,
            ) {
                out.push(region.with_color(label));
            }
        }
    }
}

impl RegionDetector for ColorDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Color
    }

    fn detect(&self, page: &PreparedPage) -> Vec<DetectedRegion> {
        self.find_blobs(page.color())
    }
}

/// Opening removes speckle, closing bridges gaps, one dilation joins neighbours.
fn clean_mask(mask: &GrayImage) -> GrayImage {
    let mask = open(mask, Norm::LInf, 1);
    let mask = close(&mask, Norm::LInf, 2);
    dilate(&mask, Norm::LInf, 1)
}

/// Folds hue-wrap labels such as `red_wrap` into their base color.
fn merge_wrapped_labels(regions: &mut [DetectedRegion]) {
    for region in regions.iter_mut() {
        let merged = region
            .color()
            .and_then(|c| c.strip_suffix(WRAP_SUFFIX))
            .map(str::to_owned);
        if let Some(base) = merged {
            region.set_color(base);
        }
    }
}

/// Confidence of a color blob.
///
/// Base 0.6, plus `0.2 * circularity` for round blobs or
/// `0.15 * (1 - |1 - aspect_ratio|)` for squarish ones, plus up to 0.1 for an
/// area close to the middle of `area_range`. Clamped to `[0, 1]`.
pub fn blob_confidence(
    circularity: f64,
    aspect_ratio: f64,
    area: f64,
    area_range: (f64, f64),
    is_circular: bool,
) -> f32 {
    let mut confidence = 0.6;
    if is_circular {
        confidence += circularity * 0.2;
    } else {
        confidence += (1.0 - (1.0 - aspect_ratio).abs()) * 0.15;
    }

    let ideal_area = (area_range.0 + area_range.1) / 2.0;
    if let Some(deviation) = safe_ratio((area - ideal_area).abs(), ideal_area) {
        confidence += (1.0 - deviation.min(1.0)) * 0.1;
    }
    clamp_unit(confidence as f32)
}

#[cfg(test)]
mod tests {
    use super::{blob_confidence, merge_wrapped_labels, ColorDetector};
    use crate::config::DetectionConfig;
    use crate::raster::hsv::Hsv;
    use crate::region::{DetectedRegion, DetectionMethod};

    #[test]
    fn round_blob_at_ideal_area() {
        let c = blob_confidence(0.9, 1.0, 2650.0, (300.0, 5000.0), true);
        assert!((c - 0.88).abs() < 1e-6);
    }

    #[test]
    fn squarish_blob_uses_aspect_bonus() {
        let c = blob_confidence(0.1, 1.5, 300.0, (300.0, 5000.0), false);
        let area_bonus = (1.0 - 2350.0 / 2650.0) * 0.1;
        let want = 0.6 + 0.5 * 0.15 + area_bonus;
        assert!((f64::from(c) - want).abs() < 1e-6);
    }

    #[test]
    fn zero_area_range_skips_area_bonus() {
        let c = blob_confidence(1.0, 1.0, 10.0, (0.0, 0.0), true);
        assert!((c - 0.8).abs() < 1e-6);
    }

    #[test]
    fn default_bands_and_labels() {
        let detector = ColorDetector::new(DetectionConfig::default());
        let labels: Vec<&str> = detector.color_ranges().iter().map(|b| b.label()).collect();
        assert_eq!(labels, ["red", "red_wrap", "blue", "green", "black"]);
    }

    #[test]
    fn adding_existing_band_replaces_it() {
        let mut detector = ColorDetector::new(DetectionConfig::default());
        detector.add_color_range("engineering_blue", Hsv::new(90, 60, 60), Hsv::new(135, 255, 255));
        detector.add_color_range("purple", Hsv::new(135, 50, 50), Hsv::new(160, 255, 255));

        let bands = detector.color_ranges();
        assert_eq!(bands.len(), 6);
        assert_eq!(bands[2].lower, Hsv::new(90, 60, 60));
        assert_eq!(bands[5].label(), "purple");
    }

    #[test]
    fn wrap_labels_merge_into_base_color() {
        let mut regions = vec![
            DetectedRegion::new(0, 0, 5, 5, 0.7, DetectionMethod::Color)
                .unwrap()
                .with_color("red_wrap"),
            DetectedRegion::new(9, 9, 5, 5, 0.7, DetectionMethod::Color)
                .unwrap()
                .with_color("blue"),
        ];
        merge_wrapped_labels(&mut regions);
        assert_eq!(regions[0].color(), Some("red"));
        assert_eq!(regions[1].color(), Some("blue"));
    }
}
