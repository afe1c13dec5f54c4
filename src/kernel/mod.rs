//! Zero-mean normalized cross-correlation kernels.
//!
//! The score at a placement is
//! `sum(t' * I) / sqrt(var_t * var_i)` where `t'` is the zero-mean template,
//! `var_t` its energy, and `var_i` the energy of the image window around its
//! own mean. Window sums come from integral tables built once per page, so
//! only the dot product depends on the template size.

use crate::raster::ImageView;
use crate::template::TemplatePlan;
use crate::util::SealScanResult;

/// Scan configuration for kernel evaluations.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    /// Windows with energy at or below this are skipped as flat.
    pub min_var_i: f32,
    /// Placements scoring below this are discarded.
    pub min_score: f32,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            min_var_i: 1e-6,
            min_score: f32::NEG_INFINITY,
        }
    }
}

/// Scored template placement (top-left corner).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// X coordinate (column) of the placement.
    pub x: usize,
    /// Y coordinate (row) of the placement.
    pub y: usize,
    /// ZNCC score, approximately in `[-1, 1]`.
    pub score: f32,
}

/// Inclusive rectangle of top-left placements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Roi {
    /// First column.
    pub x0: usize,
    /// First row.
    pub y0: usize,
    /// Last column, inclusive.
    pub x1: usize,
    /// Last row, inclusive.
    pub y1: usize,
}

impl Roi {
    /// Placements within Chebyshev distance `radius` of `(x, y)`, clipped to
    /// `[0, max_x] x [0, max_y]`.
    ///
    /// Returns `None` when the window lies entirely past the valid range.
    pub fn around(x: usize, y: usize, radius: usize, max_x: usize, max_y: usize) -> Option<Self> {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        if x0 > max_x || y0 > max_y {
            return None;
        }
        Some(Self {
            x0,
            y0,
            x1: x.saturating_add(radius).min(max_x),
            y1: y.saturating_add(radius).min(max_y),
        })
    }
}

/// Integral sum and squared-sum tables for constant-time window statistics.
pub struct WindowStats {
    width: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl WindowStats {
    /// Builds the tables for an image.
    pub fn new(image: ImageView<'_, u8>) -> Self {
        let width = image.width() + 1;
        let height = image.height() + 1;
        let mut sum = vec![0u64; width * height];
        let mut sum_sq = vec![0u64; width * height];

        for y in 0..image.height() {
            let Some(row) = image.row(y) else { break };
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;
            for (x, &value) in row.iter().enumerate() {
                let v = u64::from(value);
                row_sum += v;
                row_sq += v * v;
                let idx = (y + 1) * width + x + 1;
                sum[idx] = sum[idx - width] + row_sum;
                sum_sq[idx] = sum_sq[idx - width] + row_sq;
            }
        }

        Self { width, sum, sum_sq }
    }

    /// Returns `(sum, sum_sq)` over the window at `(x, y)` of size `w x h`.
    pub fn window(&self, x: usize, y: usize, w: usize, h: usize) -> (f64, f64) {
        let stride = self.width;
        let a = y * stride + x;
        let b = y * stride + x + w;
        let c = (y + h) * stride + x;
        let d = (y + h) * stride + x + w;
        let s = self.sum[d] + self.sum[a] - self.sum[b] - self.sum[c];
        let sq = self.sum_sq[d] + self.sum_sq[a] - self.sum_sq[b] - self.sum_sq[c];
        (s as f64, sq as f64)
    }
}

/// Kernel trait for scoring and scan operations.
pub trait Kernel {
    type Plan;

    /// Computes the score at a single placement (top-left coordinates).
    ///
    /// Returns `f32::NEG_INFINITY` for invalid or flat placements.
    fn score_at(
        image: ImageView<'_, u8>,
        stats: &WindowStats,
        plan: &Self::Plan,
        x: usize,
        y: usize,
        min_var_i: f32,
    ) -> f32;

    /// Scans every valid placement and returns hits scoring at least
    /// `params.min_score`, in row-major order.
    fn scan_full(
        image: ImageView<'_, u8>,
        stats: &WindowStats,
        plan: &Self::Plan,
        params: ScanParams,
    ) -> SealScanResult<Vec<Hit>>;

    /// Scans the placements inside `roi`, clipped to the valid range, and
    /// returns hits scoring at least `params.min_score` in row-major order.
    fn scan_roi(
        image: ImageView<'_, u8>,
        stats: &WindowStats,
        plan: &Self::Plan,
        roi: Roi,
        params: ScanParams,
    ) -> SealScanResult<Vec<Hit>>;
}

/// Scans with the row-parallel kernel.
#[cfg(feature = "rayon")]
pub fn zncc_scan(
    image: ImageView<'_, u8>,
    stats: &WindowStats,
    plan: &TemplatePlan,
    params: ScanParams,
) -> SealScanResult<Vec<Hit>> {
    self::rayon::zncc_scan_full_par(image, stats, plan, params)
}

/// Scans with the scalar kernel.
#[cfg(not(feature = "rayon"))]
pub fn zncc_scan(
    image: ImageView<'_, u8>,
    stats: &WindowStats,
    plan: &TemplatePlan,
    params: ScanParams,
) -> SealScanResult<Vec<Hit>> {
    <scalar::ZnccScalar as Kernel>::scan_full(image, stats, plan, params)
}

pub mod scalar;

#[cfg(feature = "rayon")]
pub mod rayon;
