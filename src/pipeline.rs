//! Seal detection orchestrator.
//!
//! `SealDetector` prepares a page once, runs every registered
//! `RegionDetector` on it, and consolidates their candidates:
//!
//! 1. concatenate the per-detector lists,
//! 2. suppress overlaps across all of them at `nms_threshold`,
//! 3. drop regions below `min_confidence`,
//! 4. sort by descending confidence and stamp the page number.
//!
//! Detectors and configuration are fixed at construction, so one detector
//! can serve concurrent calls on different pages.

use crate::candidate::{sort_by_confidence_desc, suppress_overlaps};
use crate::config::DetectionConfig;
use crate::detect::{ColorDetector, ContourDetector, RegionDetector, TemplateMatcher};
use crate::observer::{DetectionEvent, DetectionObserver, TracingObserver};
use crate::raster::io::rgb_from_raw;
use crate::raster::preprocess::{preprocess_for_detection, PreparedPage};
use crate::region::roi::crop_rois;
use crate::region::summary::DetectionSummary;
use crate::region::{DetectedRegion, DetectionResult};
use crate::template::TemplateWarning;
use crate::trace::trace_span;
use crate::util::{SealScanError, SealScanResult};
use image::RgbImage;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Runs all detectors on a page and merges their output.
pub struct SealDetector {
    config: DetectionConfig,
    detectors: Vec<Box<dyn RegionDetector>>,
    template_warnings: Vec<TemplateWarning>,
    observer: Arc<dyn DetectionObserver>,
}

impl SealDetector {
    /// Builds the template, contour, and color detectors.
    ///
    /// Template loading problems never fail construction; they are kept in
    /// `template_warnings` and template matching simply finds nothing.
    pub fn new<P: AsRef<Path>>(config: DetectionConfig, templates_dir: P) -> Self {
        let matcher = TemplateMatcher::new(config.clone(), templates_dir);
        let template_warnings = matcher.warnings().to_vec();
        let detectors: Vec<Box<dyn RegionDetector>> = vec![
            Box::new(matcher),
            Box::new(ContourDetector::new(config.clone())),
            Box::new(ColorDetector::new(config.clone())),
        ];
        let mut detector = Self::from_detectors(config, detectors);
        detector.template_warnings = template_warnings;
        detector
    }

    /// Uses a caller-supplied detector set, run in the given order.
    pub fn from_detectors(config: DetectionConfig, detectors: Vec<Box<dyn RegionDetector>>) -> Self {
        Self {
            config,
            detectors,
            template_warnings: Vec::new(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replaces the progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn DetectionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Problems encountered while loading templates in `new`.
    pub fn template_warnings(&self) -> &[TemplateWarning] {
        &self.template_warnings
    }

    /// Detects seal and signature regions on one RGB page.
    ///
    /// Fails only for an empty page. Finding nothing is a successful result
    /// with no regions.
    pub fn detect(&self, page: &RgbImage, page_num: usize) -> SealScanResult<DetectionResult> {
        let (width, height) = page.dimensions();
        if width == 0 || height == 0 {
            return Err(SealScanError::InvalidDimensions {
                width: width as usize,
                height: height as usize,
            });
        }
        let _span = trace_span!("detect_page", page = page_num).entered();
        let start = Instant::now();
        self.observer.on_event(&DetectionEvent::PageStarted {
            page_num,
            width,
            height,
        });

        let prepared = preprocess_for_detection(page);
        let regions = self.consolidate(self.run_detectors(&prepared, page_num), page_num);

        let elapsed = start.elapsed();
        self.observer.on_event(&DetectionEvent::PageFinished {
            page_num,
            regions: regions.len(),
            elapsed,
        });
        Ok(DetectionResult::new(page_num, regions, elapsed, (width, height)))
    }

    /// Detects on a raw interleaved RGB buffer of `width * height * 3` bytes.
    pub fn detect_buffer(
        &self,
        data: &[u8],
        width: usize,
        height: usize,
        page_num: usize,
    ) -> SealScanResult<DetectionResult> {
        let page = rgb_from_raw(data, width, height)?;
        self.detect(&page, page_num)
    }

    /// Detects on each page independently, numbering pages from zero.
    pub fn detect_multi_page(&self, pages: &[RgbImage]) -> SealScanResult<Vec<DetectionResult>> {
        let results = pages
            .iter()
            .enumerate()
            .map(|(page_num, page)| self.detect(page, page_num))
            .collect::<SealScanResult<Vec<_>>>()?;

        self.observer.on_event(&DetectionEvent::BatchFinished {
            pages: results.len(),
            regions: results.iter().map(DetectionResult::detection_count).sum(),
            pages_with_detections: results.iter().filter(|r| r.has_detections()).count(),
        });
        Ok(results)
    }

    /// Counts a result's regions by method and confidence band.
    pub fn detection_summary(&self, result: &DetectionResult) -> DetectionSummary {
        DetectionSummary::from_result(result)
    }

    /// Crops every region of `result` out of `page`.
    pub fn crop_rois<'r>(
        &self,
        page: &RgbImage,
        result: &'r DetectionResult,
        padding: u32,
    ) -> Vec<(&'r DetectedRegion, RgbImage)> {
        crop_rois(page, result.regions(), padding)
    }

    fn run_detectors(&self, prepared: &PreparedPage, page_num: usize) -> Vec<DetectedRegion> {
        let mut all = Vec::new();
        for detector in &self.detectors {
            let found = detector.detect(prepared);
            self.observer.on_event(&DetectionEvent::DetectorFinished {
                page_num,
                method: detector.method(),
                count: found.len(),
            });
            all.extend(found);
        }
        all
    }

    fn consolidate(&self, candidates: Vec<DetectedRegion>, page_num: usize) -> Vec<DetectedRegion> {
        let before = candidates.len();
        let kept = suppress_overlaps(candidates, self.config.nms_threshold);
        self.observer.on_event(&DetectionEvent::Consolidated {
            page_num,
            before,
            after: kept.len(),
        });

        let min_confidence = self.config.min_confidence;
        let mut regions: Vec<DetectedRegion> = kept
            .into_iter()
            .filter(|r| r.confidence() >= min_confidence)
            .collect();
        self.observer.on_event(&DetectionEvent::Filtered {
            page_num,
            remaining: regions.len(),
        });

        sort_by_confidence_desc(&mut regions);
        for region in &mut regions {
            region.set_page_num(page_num);
        }
        regions
    }
}
