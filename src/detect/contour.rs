//! Rectangular signature-block detection from outline geometry.

use crate::candidate::suppress_overlaps;
use crate::config::DetectionConfig;
use crate::detect::shape::{adaptive_threshold_inv, external_shapes, Shape};
use crate::detect::RegionDetector;
use crate::raster::preprocess::PreparedPage;
use crate::region::{DetectedRegion, DetectionMethod};
use crate::trace::{trace_event, trace_span};
use crate::util::math::{clamp_unit, safe_ratio};
use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{close, dilate, open};

/// IoU above which overlapping blocks are suppressed.
pub const CONTOUR_NMS_IOU: f32 = 0.5;
/// Confidence multiplier for blocks found on the edge map.
pub const EDGE_CONFIDENCE_SCALE: f32 = 0.8;

/// Gaussian sigma of an 11x11 adaptive threshold window.
const THRESHOLD_SIGMA: f32 = 2.0;
const THRESHOLD_OFFSET: f32 = 2.0;
/// Gaussian sigma of a 5x5 smoothing kernel.
const EDGE_BLUR_SIGMA: f32 = 1.1;
const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;
const IDEAL_ASPECT: f64 = 4.0;

/// Finds wide rectangular outlines that look like signature blocks.
#[derive(Clone, Debug)]
pub struct ContourDetector {
    config: DetectionConfig,
}

impl ContourDetector {
    /// Creates a detector using the contour bounds of `config`.
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Finds blocks on an adaptively thresholded page.
    pub fn find_blocks(&self, gray: &GrayImage) -> Vec<DetectedRegion> {
        let _span = trace_span!("contour_blocks").entered();

        let binary = adaptive_threshold_inv(gray, THRESHOLD_SIGMA, THRESHOLD_OFFSET);
        let binary = close(&binary, Norm::LInf, 1);
        let binary = open(&binary, Norm::LInf, 1);

        let candidates: Vec<_> = external_shapes(&binary)
            .iter()
            .filter_map(|shape| self.block_region(shape, shape.area, 1.0))
            .collect();

        trace_event!("contour_candidates", count = candidates.len());
        suppress_overlaps(candidates, CONTOUR_NMS_IOU)
    }

    /// Finds blocks on a dilated Canny edge map.
    ///
    /// The size filter uses the bounding box area since edge outlines are
    /// rarely closed, and confidences are scaled by `EDGE_CONFIDENCE_SCALE`.
    pub fn find_blocks_with_edges(&self, gray: &GrayImage) -> Vec<DetectedRegion> {
        let _span = trace_span!("contour_edge_blocks").entered();

        let blurred = gaussian_blur_f32(gray, EDGE_BLUR_SIGMA);
        let edges = canny(&blurred, CANNY_LOW, CANNY_HIGH);
        let edges = dilate(&edges, Norm::LInf, 2);

        let candidates: Vec<_> = external_shapes(&edges)
            .iter()
            .filter_map(|shape| self.block_region(shape, shape.bbox_area(), EDGE_CONFIDENCE_SCALE))
            .collect();

        trace_event!("contour_edge_candidates", count = candidates.len());
        suppress_overlaps(candidates, CONTOUR_NMS_IOU)
    }

    /// Scores one outline as a block. `filter_area` is the area checked
    /// against the bounds and `scale` multiplies the confidence.
    fn block_region(&self, shape: &Shape, filter_area: f64, scale: f32) -> Option<DetectedRegion> {
        if shape.is_degenerate() || !self.is_block(filter_area, shape) {
            return None;
        }
        to_region(shape, score_shape(shape) * scale)
    }

    /// All four bounds must hold, each exclusive.
    fn is_block(&self, area: f64, shape: &Shape) -> bool {
        let cfg = &self.config;
        let aspect = shape.aspect_ratio();
        cfg.contour_min_area < area
            && area < cfg.contour_max_area
            && cfg.contour_min_aspect_ratio < aspect
            && aspect < cfg.contour_max_aspect_ratio
            && cfg.contour_min_width < shape.width
            && shape.width < cfg.contour_max_width
            && cfg.contour_min_height < shape.height
            && shape.height < cfg.contour_max_height
    }
}

impl RegionDetector for ContourDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Contour
    }

    fn detect(&self, page: &PreparedPage) -> Vec<DetectedRegion> {
        self.find_blocks(page.gray())
    }
}

fn score_shape(shape: &Shape) -> f32 {
    block_confidence(
        shape.area,
        shape.bbox_area(),
        shape.aspect_ratio(),
        shape.hull_area,
    )
}

fn to_region(shape: &Shape, confidence: f32) -> Option<DetectedRegion> {
    DetectedRegion::new(
        shape.x,
        shape.y,
        shape.width,
        shape.height,
        confidence,
        DetectionMethod::Contour,
    )
    .ok()
}

/// Confidence of a signature-block candidate.
///
/// Base 0.5, plus up to 0.2 for rectangularity (`area / bbox_area`), up to
/// 0.2 for an aspect ratio close to 4:1, and up to 0.1 for solidity
/// (`area / hull_area`). A zero `bbox_area` or `hull_area` contributes no
/// bonus. The result is clamped to `[0, 1]`.
pub fn block_confidence(area: f64, bbox_area: f64, aspect_ratio: f64, hull_area: f64) -> f32 {
    let mut confidence = 0.5;
    if let Some(rectangularity) = safe_ratio(area, bbox_area) {
        confidence += rectangularity * 0.2;
    }
    let aspect_score = 1.0 - ((aspect_ratio - IDEAL_ASPECT).abs() / IDEAL_ASPECT).min(1.0);
    confidence += aspect_score * 0.2;
    if let Some(solidity) = safe_ratio(area, hull_area) {
        confidence += solidity * 0.1;
    }
    clamp_unit(confidence as f32)
}
