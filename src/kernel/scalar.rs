//! Scalar reference kernel for ZNCC evaluation.

use crate::kernel::{Hit, Kernel, Roi, ScanParams, WindowStats};
use crate::raster::ImageView;
use crate::template::TemplatePlan;
use crate::util::{SealScanError, SealScanResult};

/// Scalar unmasked ZNCC kernel.
pub struct ZnccScalar;

/// Returns the largest valid placement `(max_x, max_y)` for a plan.
pub(crate) fn placement_range(
    image: ImageView<'_, u8>,
    tpl: &TemplatePlan,
) -> SealScanResult<(usize, usize)> {
    let img_width = image.width();
    let img_height = image.height();
    let tpl_width = tpl.width();
    let tpl_height = tpl.height();
    if img_width < tpl_width || img_height < tpl_height {
        return Err(SealScanError::TemplateTooLarge {
            tpl_width,
            tpl_height,
            img_width,
            img_height,
        });
    }
    Ok((img_width - tpl_width, img_height - tpl_height))
}

/// ZNCC at one in-range placement, or `None` for flat windows.
pub(crate) fn zncc_at(
    image: ImageView<'_, u8>,
    stats: &WindowStats,
    tpl: &TemplatePlan,
    x: usize,
    y: usize,
    min_var_i: f32,
) -> Option<f32> {
    let tpl_width = tpl.width();
    let tpl_height = tpl.height();
    let n = (tpl_width * tpl_height) as f64;

    let (sum_i, sum_i2) = stats.window(x, y, tpl_width, tpl_height);
    let var_i = sum_i2 - (sum_i * sum_i) / n;
    if var_i <= f64::from(min_var_i) {
        return None;
    }

    let t_prime = tpl.t_prime();
    let mut dot = 0.0f64;
    for ty in 0..tpl_height {
        let img_row = image.row(y + ty)?;
        let window = img_row.get(x..x + tpl_width)?;
        let base = ty * tpl_width;
        let mut row_dot = 0.0f32;
        for (t, &value) in t_prime[base..base + tpl_width].iter().zip(window) {
            row_dot += t * value as f32;
        }
        dot += f64::from(row_dot);
    }

    let denom = (f64::from(tpl.var_t()) * var_i).sqrt();
    let score = dot / denom;
    score.is_finite().then_some(score as f32)
}

impl Kernel for ZnccScalar {
    type Plan = TemplatePlan;

    fn score_at(
        image: ImageView<'_, u8>,
        stats: &WindowStats,
        tpl: &Self::Plan,
        x: usize,
        y: usize,
        min_var_i: f32,
    ) -> f32 {
        let Ok((max_x, max_y)) = placement_range(image, tpl) else {
            return f32::NEG_INFINITY;
        };
        if x > max_x || y > max_y {
            return f32::NEG_INFINITY;
        }
        zncc_at(image, stats, tpl, x, y, min_var_i).unwrap_or(f32::NEG_INFINITY)
    }

    fn scan_full(
        image: ImageView<'_, u8>,
        stats: &WindowStats,
        tpl: &Self::Plan,
        params: ScanParams,
    ) -> SealScanResult<Vec<Hit>> {
        let (max_x, max_y) = placement_range(image, tpl)?;
        let full = Roi {
            x0: 0,
            y0: 0,
            x1: max_x,
            y1: max_y,
        };
        Self::scan_roi(image, stats, tpl, full, params)
    }

    fn scan_roi(
        image: ImageView<'_, u8>,
        stats: &WindowStats,
        tpl: &Self::Plan,
        roi: Roi,
        params: ScanParams,
    ) -> SealScanResult<Vec<Hit>> {
        let (max_x, max_y) = placement_range(image, tpl)?;

        let mut hits = Vec::new();
        if roi.x0 > max_x || roi.y0 > max_y {
            return Ok(hits);
        }
        for y in roi.y0..=roi.y1.min(max_y) {
            for x in roi.x0..=roi.x1.min(max_x) {
                if let Some(score) = zncc_at(image, stats, tpl, x, y, params.min_var_i) {
                    if score >= params.min_score {
                        hits.push(Hit { x, y, score });
                    }
                }
            }
        }
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::{Kernel, ZnccScalar};
    use crate::kernel::{Roi, ScanParams, WindowStats};
    use crate::raster::ImageView;
    use crate::template::TemplatePlan;
    use crate::util::SealScanError;

    #[test]
    fn zncc_scan_matches_bruteforce() {
        let img_width = 6;
        let img_height = 5;
        let mut image = Vec::with_capacity(img_width * img_height);
        for y in 0..img_height {
            for x in 0..img_width {
                image.push(((x * 17 + y * 9 + x * y) & 0xFF) as u8);
            }
        }
        let tpl_width = 3;
        let tpl_height = 2;
        let mut tpl = Vec::with_capacity(tpl_width * tpl_height);
        for y in 0..tpl_height {
            for x in 0..tpl_width {
                tpl.push(((x * 5 + y * 11 + x * y) & 0xFF) as u8);
            }
        }

        let image_view = ImageView::from_slice(&image, img_width, img_height).unwrap();
        let tpl_view = ImageView::from_slice(&tpl, tpl_width, tpl_height).unwrap();
        let plan = TemplatePlan::from_view(tpl_view).unwrap();
        let stats = WindowStats::new(image_view);

        let hits =
            <ZnccScalar as Kernel>::scan_full(image_view, &stats, &plan, ScanParams::default())
                .unwrap();
        assert_eq!(hits.len(), (img_width - tpl_width + 1) * (img_height - tpl_height + 1));

        let t_prime = plan.t_prime();
        let var_t = plan.var_t() as f64;
        let n = (tpl_width * tpl_height) as f64;
        for hit in &hits {
            let mut dot = 0.0f64;
            let mut sum_i = 0.0f64;
            let mut sum_i2 = 0.0f64;
            for ty in 0..tpl_height {
                let row = image_view.row(hit.y + ty).unwrap();
                for tx in 0..tpl_width {
                    let value = row[hit.x + tx] as f64;
                    dot += t_prime[ty * tpl_width + tx] as f64 * value;
                    sum_i += value;
                    sum_i2 += value * value;
                }
            }
            let var_i = sum_i2 - (sum_i * sum_i) / n;
            let want = dot / (var_t * var_i).sqrt();
            assert!((hit.score as f64 - want).abs() < 1e-5, "at ({}, {})", hit.x, hit.y);
        }
    }

    #[test]
    fn exact_patch_scores_one() {
        let width = 12;
        let height = 10;
        let image: Vec<u8> = (0..width * height).map(|i| ((i * 31) % 253) as u8).collect();
        let view = ImageView::from_slice(&image, width, height).unwrap();
        let mut patch = Vec::new();
        for y in 3..7 {
            patch.extend_from_slice(&view.row(y).unwrap()[4..9]);
        }
        let plan = TemplatePlan::from_view(ImageView::from_slice(&patch, 5, 4).unwrap()).unwrap();
        let stats = WindowStats::new(view);

        let score = <ZnccScalar as Kernel>::score_at(view, &stats, &plan, 4, 3, 1e-6);
        assert!((score - 1.0).abs() < 1e-4);
        assert_eq!(
            <ZnccScalar as Kernel>::score_at(view, &stats, &plan, 8, 0, 1e-6),
            f32::NEG_INFINITY
        );
    }

    #[test]
    fn roi_scan_is_a_window_of_the_full_scan() {
        let width = 20;
        let height = 16;
        let image: Vec<u8> = (0..width * height).map(|i| ((i * 37 + i / 7) % 251) as u8).collect();
        let view = ImageView::from_slice(&image, width, height).unwrap();
        let tpl: Vec<u8> = (0..20).map(|i| ((i * 53) % 241) as u8).collect();
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, 5, 4).unwrap()).unwrap();
        let stats = WindowStats::new(view);
        let params = ScanParams::default();

        let roi = Roi { x0: 3, y0: 2, x1: 40, y1: 5 };
        let windowed = <ZnccScalar as Kernel>::scan_roi(view, &stats, &plan, roi, params).unwrap();
        let full = <ZnccScalar as Kernel>::scan_full(view, &stats, &plan, params).unwrap();
        let want: Vec<_> = full
            .into_iter()
            .filter(|h| (3..=15).contains(&h.x) && (2..=5).contains(&h.y))
            .collect();
        assert_eq!(windowed, want);

        let outside = Roi { x0: 16, y0: 0, x1: 18, y1: 3 };
        assert!(<ZnccScalar as Kernel>::scan_roi(view, &stats, &plan, outside, params)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn flat_windows_are_skipped() {
        let image = vec![200u8; 64];
        let view = ImageView::from_slice(&image, 8, 8).unwrap();
        let tpl: Vec<u8> = (0u8..9).collect();
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, 3, 3).unwrap()).unwrap();
        let stats = WindowStats::new(view);
        let hits =
            <ZnccScalar as Kernel>::scan_full(view, &stats, &plan, ScanParams::default()).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn oversized_template_is_rejected() {
        let image = vec![0u8; 4];
        let view = ImageView::from_slice(&image, 2, 2).unwrap();
        let tpl: Vec<u8> = (0u8..9).collect();
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, 3, 3).unwrap()).unwrap();
        let stats = WindowStats::new(view);
        let err = <ZnccScalar as Kernel>::scan_full(view, &stats, &plan, ScanParams::default())
            .unwrap_err();
        assert_eq!(
            err,
            SealScanError::TemplateTooLarge {
                tpl_width: 3,
                tpl_height: 3,
                img_width: 2,
                img_height: 2,
            }
        );
    }
}
