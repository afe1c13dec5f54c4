//! Greedy IoU-based non-maximum suppression for detected regions.
//!
//! Candidates are visited in descending confidence. A candidate is kept
//! unless its IoU with an already kept candidate exceeds the threshold. The
//! detector that proposed a region plays no part in the decision, so regions
//! from different detectors compete on confidence alone.
//!
//! The pairwise scan is quadratic in the candidate count. Pages produce tens
//! of candidates after per-detector suppression, so no spatial index is used.

use crate::kernel::Hit;
use crate::region::DetectedRegion;
use std::cmp::Ordering;

fn region_cmp_desc(a: &DetectedRegion, b: &DetectedRegion) -> Ordering {
    b.confidence()
        .total_cmp(&a.confidence())
        .then_with(|| a.y().cmp(&b.y()))
        .then_with(|| a.x().cmp(&b.x()))
        .then_with(|| a.height().cmp(&b.height()))
        .then_with(|| a.width().cmp(&b.width()))
}

/// Sorts regions by descending confidence with deterministic tie-breaking.
///
/// Equal confidences are ordered by position then size; the sort is stable
/// for regions that agree on all of these.
pub fn sort_by_confidence_desc(regions: &mut [DetectedRegion]) {
    regions.sort_by(region_cmp_desc);
}

/// Keeps the strongest regions, dropping any whose IoU with a kept region
/// exceeds `iou_threshold`.
///
/// The returned regions are in descending confidence order.
pub fn suppress_overlaps(mut regions: Vec<DetectedRegion>, iou_threshold: f32) -> Vec<DetectedRegion> {
    if regions.len() < 2 {
        return regions;
    }

    sort_by_confidence_desc(&mut regions);
    let mut kept: Vec<DetectedRegion> = Vec::new();

    'outer: for region in regions {
        for kept_region in kept.iter() {
            if kept_region.iou(&region) > iou_threshold {
                continue 'outer;
            }
        }
        kept.push(region);
    }

    kept
}

fn hit_cmp_desc(a: &Hit, b: &Hit) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.y.cmp(&b.y))
        .then_with(|| a.x.cmp(&b.x))
}

/// Keeps at most `limit` placement peaks, each farther than `radius` in
/// Chebyshev distance from every stronger kept peak.
///
/// The returned hits are in descending score order.
pub fn suppress_peaks(mut hits: Vec<Hit>, radius: usize, limit: usize) -> Vec<Hit> {
    hits.sort_by(hit_cmp_desc);
    let mut kept: Vec<Hit> = Vec::new();

    'outer: for hit in hits {
        if kept.len() >= limit {
            break;
        }
        for kept_hit in kept.iter() {
            let dist = hit.x.abs_diff(kept_hit.x).max(hit.y.abs_diff(kept_hit.y));
            if dist <= radius {
                continue 'outer;
            }
        }
        kept.push(hit);
    }

    kept
}
