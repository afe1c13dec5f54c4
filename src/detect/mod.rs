//! Region detectors.
//!
//! Each detector proposes axis-aligned candidates with its own confidence
//! heuristic and suppresses its own overlaps before returning. The
//! orchestrator only sees them through `RegionDetector`.

use crate::raster::preprocess::PreparedPage;
use crate::region::{DetectedRegion, DetectionMethod};

mod color;
mod contour;
pub(crate) mod shape;
mod template;

pub use color::{blob_confidence, ColorBand, ColorDetector, COLOR_NMS_IOU};
pub use contour::{block_confidence, ContourDetector, CONTOUR_NMS_IOU, EDGE_CONFIDENCE_SCALE};
pub use template::{TemplateMatcher, COARSE_MIN_TEMPLATE_SIDE};

/// One detection strategy over a prepared page.
///
/// Implementations read whichever representation of the page they need and
/// never fail: an empty list is a valid outcome.
pub trait RegionDetector: Send + Sync {
    /// Tag stamped on every region this detector produces.
    fn method(&self) -> DetectionMethod;

    /// Proposes candidate regions, already free of overlaps among themselves.
    fn detect(&self, page: &PreparedPage) -> Vec<DetectedRegion>;
}
