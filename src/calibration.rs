//! Two-step sensor calibration wizard.

use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, Result};
use crate::rpc::BackendClient;
use crate::types::{Axis, RawMotionSample};

pub const MIN_AXIS_SCALE: f64 = 0.5;
pub const MAX_AXIS_SCALE: f64 = 2.0;
pub const AXIS_SCALE_STEP: f64 = 0.1;

/// Wizard steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationStep {
    /// Device resting flat, waiting for "set zero position"
    ZeroPosition,
    /// Offsets stored, adjusting per-axis scales
    AxisScales,
    Complete,
    Cancelled,
}

/// Clamp to `[0.5, 2.0]` and snap to the 0.1 grid.
pub fn snap_scale(value: f64) -> f64 {
    if !value.is_finite() {
        return 1.0;
    }
    let clamped = value.clamp(MIN_AXIS_SCALE, MAX_AXIS_SCALE);
    (clamped / AXIS_SCALE_STEP).round() * AXIS_SCALE_STEP
}

/// Current accelerometer values, three decimals each.
pub fn readout(sample: &RawMotionSample) -> [String; 3] {
    [
        format!("{:.3}", sample.accel.x),
        format!("{:.3}", sample.accel.y),
        format!("{:.3}", sample.accel.z),
    ]
}

pub struct CalibrationWizard {
    backend: BackendClient,
    step: CalibrationStep,
    scales: [f64; 3],
}

impl CalibrationWizard {
    /// Ask the backend to begin calibrating. The wizard exists only if it agrees.
    pub async fn open(backend: BackendClient) -> Result<Self> {
        backend.start_calibration().await?;
        log::info!("[calibration] started");
        Ok(CalibrationWizard {
            backend,
            step: CalibrationStep::ZeroPosition,
            scales: [1.0; 3],
        })
    }

    pub fn step(&self) -> CalibrationStep {
        self.step
    }

    fn require(&self, expected: CalibrationStep, action: &str) -> Result<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(OverlayError::InvalidState(format!(
                "cannot {} during {:?}",
                action, self.step
            )))
        }
    }

    /// Store the current resting reading as the zero offsets (ZeroPosition → AxisScales).
    pub async fn set_zero_position(&mut self) -> Result<()> {
        self.require(CalibrationStep::ZeroPosition, "set zero position")?;
        self.backend.set_calibration_offsets().await?;
        self.step = CalibrationStep::AxisScales;
        Ok(())
    }

    pub fn scale(&self, axis: Axis) -> f64 {
        self.scales[axis as usize]
    }

    /// Returns the stored (snapped) value.
    pub fn set_scale(&mut self, axis: Axis, value: f64) -> Result<f64> {
        self.require(CalibrationStep::AxisScales, "adjust scales")?;
        let snapped = snap_scale(value);
        self.scales[axis as usize] = snapped;
        Ok(snapped)
    }

    /// AxisScales → ZeroPosition. Scales are kept.
    pub fn back(&mut self) -> Result<()> {
        self.require(CalibrationStep::AxisScales, "go back")?;
        self.step = CalibrationStep::ZeroPosition;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.require(CalibrationStep::ZeroPosition, "cancel")?;
        self.step = CalibrationStep::Cancelled;
        log::info!("[calibration] cancelled");
        Ok(())
    }

    /// Send the scales and close the wizard (AxisScales → Complete).
    pub async fn finish(&mut self) -> Result<[f64; 3]> {
        self.require(CalibrationStep::AxisScales, "finish")?;
        let [sx, sy, sz] = self.scales;
        self.backend.finish_calibration(sx, sy, sz).await?;
        self.step = CalibrationStep::Complete;
        log::info!(
            "[calibration] complete: scales x={:.1} y={:.1} z={:.1}",
            sx,
            sy,
            sz
        );
        Ok(self.scales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::mock::MockTransport;
    use approx::assert_abs_diff_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn scripted() -> Arc<MockTransport> {
        let mock = Arc::new(MockTransport::new());
        for method in ["start_calibration", "set_calibration_offsets", "finish_calibration"] {
            mock.respond(method, json!({ "status": "success" }));
        }
        mock
    }

    #[test]
    fn test_snap_scale() {
        assert_abs_diff_eq!(snap_scale(0.1), 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(snap_scale(3.0), 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(snap_scale(1.26), 1.3, epsilon = 1e-9);
        assert_abs_diff_eq!(snap_scale(1.24), 1.2, epsilon = 1e-9);
        assert_abs_diff_eq!(snap_scale(f64::NAN), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_readout_three_decimals() {
        let sample = RawMotionSample::from_accel(0.01234, -1.0, 0.5, 0.0);
        assert_eq!(readout(&sample), ["0.012", "-1.000", "0.500"]);
    }

    #[tokio::test]
    async fn test_full_walkthrough() {
        let mock = scripted();
        let mut wizard = CalibrationWizard::open(BackendClient::new(mock.clone()))
            .await
            .unwrap();
        assert_eq!(wizard.step(), CalibrationStep::ZeroPosition);

        wizard.set_zero_position().await.unwrap();
        assert_eq!(wizard.step(), CalibrationStep::AxisScales);

        wizard.set_scale(Axis::X, 1.5).unwrap();
        wizard.set_scale(Axis::Z, 0.2).unwrap();
        let scales = wizard.finish().await.unwrap();

        assert_eq!(wizard.step(), CalibrationStep::Complete);
        assert_abs_diff_eq!(scales[0], 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(scales[1], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(scales[2], 0.5, epsilon = 1e-9);

        let calls = mock.calls();
        let names: Vec<&str> = calls.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(
            names,
            vec!["start_calibration", "set_calibration_offsets", "finish_calibration"]
        );
    }

    #[tokio::test]
    async fn test_open_fails_when_backend_refuses() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            "start_calibration",
            json!({ "status": "error", "message": "service not running" }),
        );
        let result = CalibrationWizard::open(BackendClient::new(mock)).await;
        assert!(matches!(result, Err(OverlayError::Rejected { .. })));
    }

    #[tokio::test]
    async fn test_failed_offsets_stay_on_zero_step() {
        let mock = scripted();
        mock.fail_next("set_calibration_offsets", "timeout");
        let mut wizard = CalibrationWizard::open(BackendClient::new(mock))
            .await
            .unwrap();

        assert!(wizard.set_zero_position().await.is_err());
        assert_eq!(wizard.step(), CalibrationStep::ZeroPosition);
    }

    #[tokio::test]
    async fn test_step_rules() {
        let mut wizard = CalibrationWizard::open(BackendClient::new(scripted()))
            .await
            .unwrap();

        assert!(matches!(
            wizard.set_scale(Axis::Y, 1.1),
            Err(OverlayError::InvalidState(_))
        ));
        assert!(wizard.back().is_err());
        assert!(wizard.finish().await.is_err());

        wizard.set_zero_position().await.unwrap();
        wizard.set_scale(Axis::Y, 1.7).unwrap();
        assert!(wizard.cancel().is_err());

        wizard.back().unwrap();
        assert_eq!(wizard.step(), CalibrationStep::ZeroPosition);
        assert_abs_diff_eq!(wizard.scale(Axis::Y), 1.7, epsilon = 1e-9);

        wizard.cancel().unwrap();
        assert_eq!(wizard.step(), CalibrationStep::Cancelled);
    }
}
