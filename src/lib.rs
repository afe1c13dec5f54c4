//! SealScan locates engineering seal and signature regions on scanned pages.
//!
//! Three independent detectors propose candidate rectangles: multi-scale ZNCC
//! template matching, contour geometry for rectangular signature blocks, and
//! HSV color segmentation for printed seals. `SealDetector` runs them on a
//! preprocessed page and resolves their overlaps into one ranked region set.
//! The correlation scan can run row-parallel with the `rayon` feature, and
//! the `tracing` feature emits spans and events for each stage.

pub mod annotate;
mod candidate;
pub mod config;
pub mod detect;
pub mod kernel;
pub mod lowlevel;
pub mod observer;
pub mod pipeline;
pub mod raster;
pub mod region;
pub mod template;
mod trace;
pub mod util;

pub use annotate::draw_detections;
pub use config::DetectionConfig;
pub use detect::{ColorBand, ColorDetector, ContourDetector, RegionDetector, TemplateMatcher};
pub use observer::{DetectionEvent, DetectionObserver, NoopObserver, TracingObserver};
pub use pipeline::SealDetector;
pub use raster::hsv::Hsv;
pub use raster::io::{load_rgb_image, rgb_from_raw};
pub use raster::preprocess::{preprocess_for_detection, PreparedPage};
pub use raster::ImageView;
pub use region::roi::{crop_roi, crop_rois};
pub use region::summary::{BandCounts, ConfidenceBand, DetectionSummary, MethodCounts};
pub use region::{DetectedRegion, DetectionMethod, DetectionRecord, DetectionResult};
pub use template::{Template, TemplateLibrary, TemplateWarning};
pub use util::{SealScanError, SealScanResult};
