//! Sensitivity-scaled normalization of raw accelerometer readings.
//!
//! A reading of 1.0 g on an axis is treated as rest. The distance from rest is
//! compared against a dead zone that shrinks as sensitivity rises, then the
//! remainder is rescaled into `[0, 1]`.

use crate::types::{NormalizedMotionPoint, RawMotionSample};

/// Rest baseline in g.
pub const REST_BASELINE: f64 = 1.0;

const MIN_THRESHOLD: f64 = 0.1;
const THRESHOLD_SPAN: f64 = 0.4;

/// Dead-zone width for a sensitivity in `(0, 1]`.
///
/// Ranges from 0.1 at sensitivity 1.0 to 0.5 at sensitivity 0.0.
pub fn motion_threshold(sensitivity: f64) -> f64 {
    MIN_THRESHOLD + (1.0 - sensitivity) * THRESHOLD_SPAN
}

/// Map one axis reading to a `[0, 1]` intensity.
///
/// Returns 0 whenever the deviation from rest is within the dead zone and
/// never returns NaN.
pub fn normalize(value: f64, sensitivity: f64) -> f64 {
    let threshold = motion_threshold(sensitivity);
    let deviation = (value - REST_BASELINE).abs();
    let scaled = (deviation - threshold) / (1.0 - threshold);
    if scaled.is_nan() {
        return 0.0;
    }
    scaled.clamp(0.0, 1.0)
}

/// Normalize every accel axis of a sample. Gyro rates pass through.
pub fn normalize_sample(sample: &RawMotionSample, sensitivity: f64) -> NormalizedMotionPoint {
    NormalizedMotionPoint {
        x: normalize(sample.accel.x, sensitivity),
        y: normalize(sample.accel.y, sensitivity),
        z: normalize(sample.accel.z, sensitivity),
        pitch: sample.gyro.pitch,
        yaw: sample.gyro.yaw,
        roll: sample.gyro.roll,
        timestamp: sample.timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GyroRates, Vec3};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_threshold_range() {
        assert_abs_diff_eq!(motion_threshold(1.0), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(motion_threshold(0.5), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(motion_threshold(0.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_output_always_in_unit_range() {
        let values = [-50.0, -1.0, 0.0, 0.5, 0.95, 1.0, 1.05, 1.5, 2.0, 3.0, 1e9];
        let sensitivities = [0.01, 0.25, 0.5, 0.75, 1.0];
        for &v in &values {
            for &s in &sensitivities {
                let n = normalize(v, s);
                assert!((0.0..=1.0).contains(&n), "normalize({v}, {s}) = {n}");
            }
        }
    }

    #[test]
    fn test_dead_zone_is_zero() {
        assert_eq!(normalize(1.2, 0.5), 0.0);
        // Exactly on the boundary: deviation 0.3 vs threshold 0.3.
        assert_abs_diff_eq!(normalize(1.3, 0.5), 0.0, epsilon = 1e-12);
        assert_eq!(normalize(1.0, 1.0), 0.0);
        assert_eq!(normalize(0.85, 0.5), 0.0);
    }

    #[test]
    fn test_full_saturation() {
        assert_abs_diff_eq!(normalize(2.0, 1.0), 1.0, epsilon = 1e-12);
        assert_eq!(normalize(5.0, 1.0), 1.0);
        assert_abs_diff_eq!(normalize(0.0, 1.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_deviation_below_rest_is_symmetric() {
        assert_abs_diff_eq!(normalize(1.4, 1.0), normalize(0.6, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_higher_sensitivity_responds_more() {
        assert!(normalize(1.4, 1.0) > normalize(1.4, 0.5));
        assert_eq!(normalize(1.4, 0.0), 0.0);
    }

    #[test]
    fn test_non_finite_input_is_zero() {
        assert_eq!(normalize(f64::NAN, 0.5), 0.0);
        assert_eq!(normalize(f64::INFINITY, 0.5), 1.0);
    }

    #[test]
    fn test_normalize_sample_passes_gyro_through() {
        let sample = RawMotionSample::new(
            Vec3::new(1.4, 1.0, 0.5),
            GyroRates::new(12.0, -3.0, 0.5),
            42.0,
            true,
        );
        let point = normalize_sample(&sample, 1.0);

        assert_abs_diff_eq!(point.x, 1.0 / 3.0, epsilon = 1e-9);
        assert_eq!(point.y, 0.0);
        assert_abs_diff_eq!(point.z, 4.0 / 9.0, epsilon = 1e-9);
        assert_eq!(point.pitch, 12.0);
        assert_eq!(point.yaw, -3.0);
        assert_eq!(point.roll, 0.5);
        assert_eq!(point.timestamp, 42.0);
    }
}
