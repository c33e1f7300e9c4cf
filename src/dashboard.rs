use magcali_config::DisplayConfig;
use magcali_motion::trajectory::{Trajectory, TrajectoryPoint};
use magcali_motion::types::Readout;

/// Console rendition of the readout labels and the displacement chart.
pub struct Dashboard {
    display: DisplayConfig,
    series: Trajectory,
}

impl Dashboard {
    pub fn new(display: DisplayConfig) -> Self {
        Self {
            display,
            series: Trajectory::new(),
        }
    }

    /// Append newly emitted points to the plotted series.
    pub fn record(&mut self, points: impl IntoIterator<Item = TrajectoryPoint>) {
        self.series.extend(points);
    }

    pub fn series(&self) -> &Trajectory {
        &self.series
    }

    /// One line per label, `<label> <value><unit>`.
    pub fn lines(&self, readout: &Readout) -> Vec<String> {
        let d = &self.display;
        vec![
            labelled(
                &d.azimuth_label,
                format!("{:.1}", readout.azimuth_deg),
                &d.degrees_symbol,
            ),
            labelled(
                &d.calibrated_azimuth_label,
                format!("{:.1}", readout.calibrated_azimuth_deg),
                &d.degrees_symbol,
            ),
            labelled(
                &d.x_movement_label,
                format!("{:.2}", readout.position.x),
                &d.meters_symbol,
            ),
            labelled(
                &d.y_movement_label,
                format!("{:.2}", readout.position.y),
                &d.meters_symbol,
            ),
            labelled(
                &d.z_movement_label,
                format!("{:.2}", readout.position.z),
                &d.meters_symbol,
            ),
            labelled(
                &d.time_change_label,
                format!("{:.3}", readout.delta_time_s),
                &d.seconds_symbol,
            ),
            self.chart_summary(),
        ]
    }

    fn chart_summary(&self) -> String {
        let d = &self.display;
        match (self.series.last(), self.series.displacement_range()) {
            (Some(last), Some((lo, hi))) => format!(
                "{} [{}]: {} points, latest {:.2}{} -> {:.2}{}, range {:.2}..{:.2}{}",
                d.chart_title,
                d.series_label,
                self.series.len(),
                last.timestamp.as_secs_f64(),
                d.seconds_symbol,
                last.displacement_m,
                d.meters_symbol,
                lo,
                hi,
                d.meters_symbol,
            ),
            _ => format!("{} [{}]: no data", d.chart_title, d.series_label),
        }
    }
}

fn labelled(label: &str, value: String, unit: &str) -> String {
    format!("{label} {value}{unit}")
}
