use crate::error::Failure;
use crate::types::{SensorKind, SensorSample};
use glam::DVec3;

/// Holds the newest sample of each kind until both are present.
///
/// A newer sample of the same kind replaces the cached one. The slots are
/// only emptied by [`FusionGate::reset`], after a successful fused update.
#[derive(Debug, Clone, Default)]
pub struct FusionGate {
    acceleration: Option<SensorSample>,
    magnetic_field: Option<SensorSample>,
}

impl FusionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache a sample in the slot for its kind.
    pub fn offer(&mut self, sample: SensorSample) {
        match sample.kind {
            SensorKind::Acceleration => self.acceleration = Some(sample),
            SensorKind::MagneticField => self.magnetic_field = Some(sample),
        }
    }

    /// The cached (acceleration, magnetic field) pair, if both slots are full.
    pub fn pair(&self) -> Result<(DVec3, DVec3), Failure> {
        match (&self.acceleration, &self.magnetic_field) {
            (Some(accel), Some(mag)) => Ok((accel.value, mag.value)),
            _ => Err(Failure::IncompleteSampleSet),
        }
    }

    /// Empty both slots so the next update waits for a fresh pair.
    pub fn reset(&mut self) {
        self.acceleration = None;
        self.magnetic_field = None;
    }

    pub fn is_empty(&self) -> bool {
        self.acceleration.is_none() && self.magnetic_field.is_none()
    }
}
