use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which sensor stream a sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Accelerometer, gravity included (m/s^2).
    Acceleration,
    /// Magnetometer (uT).
    MagneticField,
}

/// One raw reading from the platform sensor layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub kind: SensorKind,
    pub value: DVec3,
}

impl SensorSample {
    pub fn acceleration(x: f64, y: f64, z: f64) -> Self {
        Self {
            kind: SensorKind::Acceleration,
            value: DVec3::new(x, y, z),
        }
    }

    pub fn magnetic_field(x: f64, y: f64, z: f64) -> Self {
        Self {
            kind: SensorKind::MagneticField,
            value: DVec3::new(x, y, z),
        }
    }
}

/// Device axis selector, used to pick which displacement is plotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    pub fn component(self, v: DVec3) -> f64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}

/// Values handed to the presentation layer after a fused update.
///
/// This is a copy; it never aliases the estimator's live state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readout {
    /// Raw heading in degrees, [-180, 180).
    pub azimuth_deg: f64,
    /// Heading frozen by the last calibrate action (mirrors raw until then).
    pub calibrated_azimuth_deg: f64,
    /// Displacement since session start in meters, after the dead zone.
    pub position: DVec3,
    /// Elapsed seconds covered by the last integration step.
    pub delta_time_s: f64,
    /// Session time of the last fused update.
    pub timestamp: Duration,
    /// Number of fused updates applied so far.
    pub updates: u64,
}

impl Default for Readout {
    fn default() -> Self {
        Self {
            azimuth_deg: 0.0,
            calibrated_azimuth_deg: 0.0,
            position: DVec3::ZERO,
            delta_time_s: 0.0,
            timestamp: Duration::ZERO,
            updates: 0,
        }
    }
}
