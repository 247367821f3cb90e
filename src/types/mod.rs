pub mod vector;

pub use vector::*;

use serde::{Deserialize, Serialize};

use crate::normalize::REST_BASELINE;

/// One snapshot from the backend sensor stream.
///
/// Decoded from the backend's flat wire shape (`accel_x`, `gyro_pitch`, ...).
/// Missing or null accel axes decode as the 1 g rest reading (zero motion),
/// other numeric fields as 0. Any missing accel axis clears `complete`, so
/// the auto-activate gate can skip samples it cannot trust.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "MotionDataWire", into = "MotionDataWire")]
pub struct RawMotionSample {
    pub accel: Vec3,
    pub gyro: GyroRates,
    pub timestamp: f64,
    pub fresh: bool,
    pub complete: bool,
}

impl RawMotionSample {
    pub fn new(accel: Vec3, gyro: GyroRates, timestamp: f64, fresh: bool) -> Self {
        Self {
            accel,
            gyro,
            timestamp,
            fresh,
            complete: accel.is_finite(),
        }
    }

    /// A fresh sample with only acceleration set.
    pub fn from_accel(x: f64, y: f64, z: f64, timestamp: f64) -> Self {
        Self::new(Vec3::new(x, y, z), GyroRates::default(), timestamp, true)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct MotionDataWire {
    #[serde(default)]
    accel_x: Option<f64>,
    #[serde(default)]
    accel_y: Option<f64>,
    #[serde(default)]
    accel_z: Option<f64>,
    #[serde(default)]
    gyro_pitch: Option<f64>,
    #[serde(default)]
    gyro_yaw: Option<f64>,
    #[serde(default)]
    gyro_roll: Option<f64>,
    #[serde(default)]
    timestamp: Option<f64>,
    #[serde(default)]
    fresh: bool,
}

impl From<MotionDataWire> for RawMotionSample {
    fn from(w: MotionDataWire) -> Self {
        let complete = w.accel_x.is_some() && w.accel_y.is_some() && w.accel_z.is_some();
        RawMotionSample {
            accel: Vec3::new(
                w.accel_x.unwrap_or(REST_BASELINE),
                w.accel_y.unwrap_or(REST_BASELINE),
                w.accel_z.unwrap_or(REST_BASELINE),
            ),
            gyro: GyroRates::new(
                w.gyro_pitch.unwrap_or(0.0),
                w.gyro_yaw.unwrap_or(0.0),
                w.gyro_roll.unwrap_or(0.0),
            ),
            timestamp: w.timestamp.unwrap_or(0.0),
            fresh: w.fresh,
            complete,
        }
    }
}

impl From<RawMotionSample> for MotionDataWire {
    fn from(s: RawMotionSample) -> Self {
        MotionDataWire {
            accel_x: Some(s.accel.x),
            accel_y: Some(s.accel.y),
            accel_z: Some(s.accel.z),
            gyro_pitch: Some(s.gyro.pitch),
            gyro_yaw: Some(s.gyro.yaw),
            gyro_roll: Some(s.gyro.roll),
            timestamp: Some(s.timestamp),
            fresh: s.fresh,
        }
    }
}

/// Per-sample intensity derived by the normalizer.
///
/// `x`, `y`, `z` are always within `[0, 1]`. Gyro rates pass through unscaled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMotionPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
    pub timestamp: f64,
}

/// Accelerometer axis selector used by the history buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl NormalizedMotionPoint {
    pub fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

/// Install/run state of the motion daemon as reported by the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub installed: bool,
    #[serde(default)]
    pub running: bool,
}
