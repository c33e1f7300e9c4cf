/// Heading reference set by the user's calibrate action.
///
/// Calibrating freezes the current raw azimuth as the displayed calibrated
/// value. It is not applied as an offset to later azimuths.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalibrationState {
    reference_deg: Option<f64>,
}

impl CalibrationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `current_azimuth` and return it as the new calibrated azimuth.
    pub fn calibrate(&mut self, current_azimuth: f64) -> f64 {
        self.reference_deg = Some(current_azimuth);
        current_azimuth
    }

    /// Value to display next to `raw_azimuth`.
    pub fn calibrated_azimuth(&self, raw_azimuth: f64) -> f64 {
        self.reference_deg.unwrap_or(raw_azimuth)
    }

    pub fn is_calibrated(&self) -> bool {
        self.reference_deg.is_some()
    }
}
