//! Tunable detection parameters.
//!
//! Values are accepted as given; out-of-range settings only change how much
//! gets detected.

use serde::{Deserialize, Serialize};

/// Parameter bundle shared by every detector and the orchestrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum ZNCC score for a template placement to become a candidate.
    pub template_confidence_threshold: f32,
    /// Template scale factors span `(min, max)` inclusive.
    pub template_scale_range: (f32, f32),
    /// Number of evenly spaced scales across `template_scale_range`.
    pub template_scale_steps: usize,
    /// Pyramid levels available to template matching. Placements are first
    /// found on the coarsest level that keeps the template at least
    /// `detect::COARSE_MIN_TEMPLATE_SIDE` pixels wide and tall, then confirmed at full
    /// resolution. `1` scores every placement at full resolution.
    pub template_pyramid_levels: usize,
    /// How far below `template_confidence_threshold` a coarse placement may
    /// score and still be confirmed at full resolution.
    pub template_coarse_margin: f32,

    /// Contour area bounds (exclusive).
    pub contour_min_area: f64,
    pub contour_max_area: f64,
    /// Contour width/height ratio bounds (exclusive).
    pub contour_min_aspect_ratio: f64,
    pub contour_max_aspect_ratio: f64,
    /// Bounding box width bounds in pixels (exclusive).
    pub contour_min_width: u32,
    pub contour_max_width: u32,
    /// Bounding box height bounds in pixels (exclusive).
    pub contour_min_height: u32,
    pub contour_max_height: u32,

    /// Color blob area bounds (exclusive).
    pub color_min_area: f64,
    pub color_max_area: f64,
    /// Circularity a blob must exceed to count as round.
    pub color_min_circularity: f64,

    /// Regions below this confidence are dropped after consolidation.
    pub min_confidence: f32,
    /// IoU above which the weaker of two regions is suppressed globally.
    pub nms_threshold: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            template_confidence_threshold: 0.65,
            template_scale_range: (0.5, 1.5),
            template_scale_steps: 10,
            template_pyramid_levels: 4,
            template_coarse_margin: 0.25,
            contour_min_area: 500.0,
            contour_max_area: 10_000.0,
            contour_min_aspect_ratio: 2.0,
            contour_max_aspect_ratio: 8.0,
            contour_min_width: 100,
            contour_max_width: 800,
            contour_min_height: 30,
            contour_max_height: 200,
            color_min_area: 300.0,
            color_max_area: 5_000.0,
            color_min_circularity: 0.6,
            min_confidence: 0.65,
            nms_threshold: 0.3,
        }
    }
}
