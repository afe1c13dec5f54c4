//! Rayon-parallel ZNCC scan (feature-gated).
//!
//! Rows are scored in parallel and concatenated in row order, so the output
//! matches the scalar kernel hit for hit.

use crate::kernel::scalar::{placement_range, zncc_at};
use crate::kernel::{Hit, ScanParams, WindowStats};
use crate::raster::ImageView;
use crate::template::TemplatePlan;
use crate::util::SealScanResult;
use rayon::prelude::*;

/// Row-parallel full scan for the ZNCC kernel.
pub fn zncc_scan_full_par(
    image: ImageView<'_, u8>,
    stats: &WindowStats,
    tpl: &TemplatePlan,
    params: ScanParams,
) -> SealScanResult<Vec<Hit>> {
    let (max_x, max_y) = placement_range(image, tpl)?;

    let row_results: Vec<Vec<Hit>> = (0..=max_y)
        .into_par_iter()
        .map(|y| {
            let mut row_hits = Vec::new();
            for x in 0..=max_x {
                if let Some(score) = zncc_at(image, stats, tpl, x, y, params.min_var_i) {
                    if score >= params.min_score {
                        row_hits.push(Hit { x, y, score });
                    }
                }
            }
            row_hits
        })
        .collect();

    Ok(row_results.into_iter().flatten().collect())
}
