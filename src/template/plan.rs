//! Template plan precomputation for ZNCC.

use crate::raster::ImageView;
use crate::util::{SealScanError, SealScanResult};

/// Precomputed zero-mean buffer and energy for one template at one scale.
pub struct TemplatePlan {
    width: usize,
    height: usize,
    mean: f32,
    var_t: f32,
    t_prime: Vec<f32>,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    ///
    /// Flat templates have no correlation structure and are rejected.
    pub fn from_view(tpl: ImageView<'_, u8>) -> SealScanResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width
            .checked_mul(height)
            .ok_or(SealScanError::InvalidDimensions { width, height })?;

        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        for y in 0..height {
            let row = tpl.row(y).ok_or(SealScanError::BufferTooSmall {
                needed: (y + 1) * tpl.stride(),
                got: y * tpl.stride(),
            })?;
            for &value in row {
                let v = value as f64;
                sum += v;
                sum_sq += v * v;
            }
        }

        let count_f = count as f64;
        let mean_f64 = sum / count_f;
        let variance = sum_sq / count_f - mean_f64 * mean_f64;
        if variance <= 1e-8 {
            return Err(SealScanError::DegenerateTemplate {
                reason: "zero variance",
            });
        }

        let mean = mean_f64 as f32;
        let mut t_prime = Vec::with_capacity(count);
        let mut var_t = 0.0f64;
        for y in 0..height {
            let row = tpl.row(y).ok_or(SealScanError::BufferTooSmall {
                needed: (y + 1) * tpl.stride(),
                got: y * tpl.stride(),
            })?;
            for &value in row {
                let centered = value as f64 - mean_f64;
                var_t += centered * centered;
                t_prime.push(centered as f32);
            }
        }

        Ok(Self {
            width,
            height,
            mean,
            var_t: var_t as f32,
            t_prime,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the mean intensity of the template.
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Returns the sum of squared deviations from the mean.
    pub fn var_t(&self) -> f32 {
        self.var_t
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn t_prime(&self) -> &[f32] {
        &self.t_prime
    }
}
