//! Low-level building blocks for custom detection pipelines.
//!
//! These expose the correlation kernels, template plans, shape scoring, and
//! suppression used inside the detectors. Most users should prefer
//! `SealDetector` or the individual detector types.

pub use crate::candidate::{sort_by_confidence_desc, suppress_overlaps, suppress_peaks};
pub use crate::detect::{blob_confidence, block_confidence};
pub use crate::kernel::scalar::ZnccScalar;
pub use crate::kernel::{zncc_scan, Hit, Kernel, Roi, ScanParams, WindowStats};
pub use crate::raster::clahe::{clahe, ClaheParams};
pub use crate::raster::hsv::{in_range, rgb_to_hsv, to_hsv};
pub use crate::raster::pyramid::{downsample_box, GrayPyramid};
pub use crate::template::TemplatePlan;
