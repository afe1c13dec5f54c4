//! Candidate ordering and pruning utilities.
//!
//! The same greedy overlap suppression runs inside each detector and once
//! more across the combined output of all detectors. Peak suppression thins
//! coarse template placements before they are confirmed at full resolution.

pub(crate) mod nms;

pub use nms::{sort_by_confidence_desc, suppress_overlaps, suppress_peaks};
