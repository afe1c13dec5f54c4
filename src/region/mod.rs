//! Detected regions and per-page results.
//!
//! A `DetectedRegion` is an axis-aligned candidate rectangle with a
//! confidence in `[0, 1]` and a tag naming the detector that proposed it.
//! Width and height are non-zero by construction, so every region that
//! reaches a caller has positive area.

use crate::util::math::clamp_unit;
use crate::util::{SealScanError, SealScanResult};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

pub mod roi;
pub mod summary;

/// Detector that proposed a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DetectionMethod {
    /// Multi-scale normalized cross-correlation against a known seal.
    #[serde(rename = "template_matching")]
    Template,
    /// Rectangular signature block from contour geometry.
    #[serde(rename = "contour_detection")]
    Contour,
    /// Colored blob from HSV range segmentation.
    #[serde(rename = "color_detection")]
    Color,
}

impl DetectionMethod {
    /// All methods in pipeline order.
    pub const ALL: [DetectionMethod; 3] = [Self::Template, Self::Contour, Self::Color];

    /// Stable tag used in serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Template => "template_matching",
            Self::Contour => "contour_detection",
            Self::Color => "color_detection",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate seal or signature rectangle.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetectedRegion {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    confidence: f32,
    detection_method: DetectionMethod,
    template_name: Option<String>,
    color: Option<String>,
    page_num: usize,
}

impl DetectedRegion {
    /// Creates a region; the confidence is clamped into `[0, 1]`.
    pub fn new(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        confidence: f32,
        method: DetectionMethod,
    ) -> SealScanResult<Self> {
        if width == 0 || height == 0 {
            return Err(SealScanError::InvalidDimensions {
                width: width as usize,
                height: height as usize,
            });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
            confidence: clamp_unit(confidence),
            detection_method: method,
            template_name: None,
            color: None,
            page_num: 0,
        })
    }

    /// Attaches the name of the template that produced the match.
    pub fn with_template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    /// Attaches the color label of a color blob.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub(crate) fn set_color(&mut self, color: String) {
        self.color = Some(color);
    }

    pub(crate) fn set_page_num(&mut self, page_num: usize) {
        self.page_num = page_num;
    }

    /// Left edge in pixels.
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Top edge in pixels.
    pub fn y(&self) -> u32 {
        self.y
    }

    /// Width in pixels (always > 0).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels (always > 0).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Confidence in `[0, 1]`.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Detector that proposed the region.
    pub fn detection_method(&self) -> DetectionMethod {
        self.detection_method
    }

    /// Template name for template matches.
    pub fn template_name(&self) -> Option<&str> {
        self.template_name.as_deref()
    }

    /// Color label for color blobs.
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Page the region was found on.
    pub fn page_num(&self) -> usize {
        self.page_num
    }

    /// Bounding box as `(x1, y1, x2, y2)` with exclusive right/bottom edges.
    pub fn bbox(&self) -> (u32, u32, u32, u32) {
        (
            self.x,
            self.y,
            self.x.saturating_add(self.width),
            self.y.saturating_add(self.height),
        )
    }

    /// Integer center point.
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Area in square pixels.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Intersection-over-union with another region; 0 when disjoint.
    pub fn iou(&self, other: &DetectedRegion) -> f32 {
        let (ax1, ay1, ax2, ay2) = self.bbox();
        let (bx1, by1, bx2, by2) = other.bbox();
        let ix1 = ax1.max(bx1);
        let iy1 = ay1.max(by1);
        let ix2 = ax2.min(bx2);
        let iy2 = ay2.min(by2);
        if ix2 <= ix1 || iy2 <= iy1 {
            return 0.0;
        }

        let intersection = u64::from(ix2 - ix1) * u64::from(iy2 - iy1);
        let union = self.area() + other.area() - intersection;
        if union == 0 {
            return 0.0;
        }
        (intersection as f64 / union as f64) as f32
    }

    /// True when the IoU with `other` exceeds `threshold`.
    pub fn overlaps_with(&self, other: &DetectedRegion, threshold: f32) -> bool {
        self.iou(other) > threshold
    }
}

/// All regions found on one page.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionResult {
    page_num: usize,
    regions: Vec<DetectedRegion>,
    processing_time: Duration,
    image_dimensions: (u32, u32),
}

/// Plain serializable view of a `DetectionResult`.
#[derive(Debug, Serialize)]
pub struct DetectionRecord<'a> {
    pub page_num: usize,
    pub regions: &'a [DetectedRegion],
    /// Seconds spent in detection.
    pub processing_time: f64,
    pub image_dimensions: (u32, u32),
    pub detection_count: usize,
}

impl DetectionResult {
    /// Assembles a result; regions are kept in the given order.
    pub fn new(
        page_num: usize,
        regions: Vec<DetectedRegion>,
        processing_time: Duration,
        image_dimensions: (u32, u32),
    ) -> Self {
        Self {
            page_num,
            regions,
            processing_time,
            image_dimensions,
        }
    }

    /// Page number echoed from the caller.
    pub fn page_num(&self) -> usize {
        self.page_num
    }

    /// Regions in confidence-descending order.
    pub fn regions(&self) -> &[DetectedRegion] {
        &self.regions
    }

    /// Consumes the result and returns its regions.
    pub fn into_regions(self) -> Vec<DetectedRegion> {
        self.regions
    }

    /// Wall-clock time spent detecting.
    pub fn processing_time(&self) -> Duration {
        self.processing_time
    }

    /// Source page size as `(width, height)`.
    pub fn image_dimensions(&self) -> (u32, u32) {
        self.image_dimensions
    }

    /// True if at least one region was found.
    pub fn has_detections(&self) -> bool {
        !self.regions.is_empty()
    }

    /// Number of regions.
    pub fn detection_count(&self) -> usize {
        self.regions.len()
    }

    /// Regions proposed by a specific detector.
    pub fn regions_by_method(&self, method: DetectionMethod) -> Vec<&DetectedRegion> {
        self.regions
            .iter()
            .filter(|r| r.detection_method == method)
            .collect()
    }

    /// Up to `n` regions with the highest confidence.
    pub fn highest_confidence(&self, n: usize) -> Vec<&DetectedRegion> {
        let mut sorted: Vec<&DetectedRegion> = self.regions.iter().collect();
        sorted.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        sorted.truncate(n);
        sorted
    }

    /// Serializable record consumed by downstream OCR/validation stages.
    pub fn to_record(&self) -> DetectionRecord<'_> {
        DetectionRecord {
            page_num: self.page_num,
            regions: &self.regions,
            processing_time: self.processing_time.as_secs_f64(),
            image_dimensions: self.image_dimensions,
            detection_count: self.regions.len(),
        }
    }
}
