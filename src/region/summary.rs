//! Per-page statistics derived from a `DetectionResult`.

use crate::region::{DetectionMethod, DetectionResult};
use serde::Serialize;

/// Confidence above which a region counts as high confidence.
pub const HIGH_CONFIDENCE: f32 = 0.8;
/// Confidence at or above which a region counts as medium confidence.
pub const MEDIUM_CONFIDENCE: f32 = 0.65;

/// Coarse confidence classification used in summaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    /// `> 0.8` is high, `[0.65, 0.8]` medium, everything else low.
    pub fn classify(confidence: f32) -> Self {
        if confidence > HIGH_CONFIDENCE {
            Self::High
        } else if confidence >= MEDIUM_CONFIDENCE {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Region counts per detector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MethodCounts {
    pub template_matching: usize,
    pub contour_detection: usize,
    pub color_detection: usize,
}

impl MethodCounts {
    /// Count for one method.
    pub fn get(&self, method: DetectionMethod) -> usize {
        match method {
            DetectionMethod::Template => self.template_matching,
            DetectionMethod::Contour => self.contour_detection,
            DetectionMethod::Color => self.color_detection,
        }
    }

    fn bump(&mut self, method: DetectionMethod) {
        match method {
            DetectionMethod::Template => self.template_matching += 1,
            DetectionMethod::Contour => self.contour_detection += 1,
            DetectionMethod::Color => self.color_detection += 1,
        }
    }
}

/// Region counts per confidence band.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BandCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Summary statistics for one page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetectionSummary {
    pub page_num: usize,
    pub total_detections: usize,
    /// Seconds spent in detection.
    pub processing_time: f64,
    pub image_dimensions: (u32, u32),
    pub by_method: MethodCounts,
    pub by_confidence: BandCounts,
}

impl DetectionSummary {
    /// Derives the summary from a result without modifying it.
    pub fn from_result(result: &DetectionResult) -> Self {
        let mut by_method = MethodCounts::default();
        let mut by_confidence = BandCounts::default();
        for region in result.regions() {
            by_method.bump(region.detection_method());
            match ConfidenceBand::classify(region.confidence()) {
                ConfidenceBand::High => by_confidence.high += 1,
                ConfidenceBand::Medium => by_confidence.medium += 1,
                ConfidenceBand::Low => by_confidence.low += 1,
            }
        }

        Self {
            page_num: result.page_num(),
            total_detections: result.detection_count(),
            processing_time: result.processing_time().as_secs_f64(),
            image_dimensions: result.image_dimensions(),
            by_method,
            by_confidence,
        }
    }
}
