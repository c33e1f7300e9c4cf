use magcali_motion::reckoner::MotionSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Dead-reckoning tunables.
    pub motion: MotionSettings,
    /// Where sensor samples come from.
    pub source: SourceConfig,
    /// Console labels and refresh rate.
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Recorded sensor log to replay. `None` means simulated sensors.
    pub replay_path: Option<PathBuf>,
    /// Simulated samples per second, per sensor.
    pub simulated_rate_hz: f64,
    /// Heading the simulated device faces (degrees).
    pub simulated_heading_deg: f64,
    /// Simulated geomagnetic field strength (uT). Typically 25-65.
    pub simulated_field_ut: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            replay_path: None,
            simulated_rate_hz: 50.0,
            simulated_heading_deg: 0.0,
            simulated_field_ut: 40.0,
        }
    }
}

/// Localizable strings for the readout lines, plus refresh timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub azimuth_label: String,
    pub calibrated_azimuth_label: String,
    pub x_movement_label: String,
    pub y_movement_label: String,
    pub z_movement_label: String,
    pub time_change_label: String,
    pub degrees_symbol: String,
    pub meters_symbol: String,
    pub seconds_symbol: String,
    /// Title of the displacement chart.
    pub chart_title: String,
    /// Legend of the plotted series.
    pub series_label: String,
    /// Console refresh period in milliseconds.
    pub refresh_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            azimuth_label: "Azimuth:".into(),
            calibrated_azimuth_label: "Calibrated azimuth:".into(),
            x_movement_label: "X movement:".into(),
            y_movement_label: "Y movement:".into(),
            z_movement_label: "Z movement:".into(),
            time_change_label: "Time change:".into(),
            degrees_symbol: "°".into(),
            meters_symbol: "m".into(),
            seconds_symbol: "s".into(),
            chart_title: "Displacement".into(),
            series_label: "Distance moved".into(),
            refresh_ms: 500,
        }
    }
}
