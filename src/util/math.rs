//! Small numeric helpers shared by the detectors.

/// Returns `steps` evenly spaced values from `start` to `end` inclusive.
///
/// A single step yields `[start]`; zero steps yield an empty vector.
pub(crate) fn linspace(start: f32, end: f32, steps: usize) -> Vec<f32> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (steps - 1) as f32;
            (0..steps)
                .map(|i| {
                    if i == steps - 1 {
                        end
                    } else {
                        start + step * i as f32
                    }
                })
                .collect()
        }
    }
}

/// Clamps a score into `[0, 1]`, mapping NaN to zero.
pub(crate) fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Ratio `num / den`, or `None` when the denominator is not positive.
pub(crate) fn safe_ratio(num: f64, den: f64) -> Option<f64> {
    if den > 0.0 {
        Some(num / den)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{clamp_unit, linspace, safe_ratio};

    #[test]
    fn linspace_includes_both_endpoints() {
        let values = linspace(0.5, 1.5, 5);
        assert_eq!(values.len(), 5);
        assert!((values[0] - 0.5).abs() < 1e-6);
        assert!((values[2] - 1.0).abs() < 1e-6);
        assert!((values[4] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn linspace_handles_degenerate_step_counts() {
        assert!(linspace(0.5, 1.5, 0).is_empty());
        assert_eq!(linspace(0.8, 1.5, 1), vec![0.8]);
    }

    #[test]
    fn clamp_unit_maps_nan_and_overflow() {
        assert_eq!(clamp_unit(f32::NAN), 0.0);
        assert_eq!(clamp_unit(1.0000001), 1.0);
        assert_eq!(clamp_unit(-0.2), 0.0);
    }

    #[test]
    fn safe_ratio_rejects_zero_denominator() {
        assert_eq!(safe_ratio(3.0, 0.0), None);
        assert_eq!(safe_ratio(3.0, 2.0), Some(1.5));
    }
}
