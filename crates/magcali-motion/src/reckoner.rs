//! One fused update: gate, heading, integration, calibration.

use crate::calibration::CalibrationState;
use crate::error::Failure;
use crate::gate::FusionGate;
use crate::integrator::{
    integrate, subtract_gravity_per_axis, MotionState, DEFAULT_DEAD_ZONE_M, STANDARD_GRAVITY,
};
use crate::orientation::{GravityMagneticSolver, OrientationEstimator, RotationSolver};
use crate::trajectory::TrajectoryPoint;
use crate::types::{Axis, Readout, SensorSample};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for the dead-reckoning core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    /// Subtracted from every accelerometer axis (m/s^2).
    pub gravity: f64,
    /// Positions with smaller magnitude are clamped to zero (meters).
    pub dead_zone_m: f64,
    /// Axis whose displacement is emitted as trajectory points.
    pub trajectory_axis: Axis,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            gravity: STANDARD_GRAVITY,
            dead_zone_m: DEFAULT_DEAD_ZONE_M,
            trajectory_axis: Axis::X,
        }
    }
}

/// Everything emitted by a successful fused update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedUpdate {
    pub readout: Readout,
    pub point: TrajectoryPoint,
}

/// Exclusively owns the motion and calibration state of one session.
pub struct DeadReckoner<S = GravityMagneticSolver> {
    settings: MotionSettings,
    gate: FusionGate,
    estimator: OrientationEstimator<S>,
    calibration: CalibrationState,
    state: MotionState,
    readout: Readout,
}

impl DeadReckoner<GravityMagneticSolver> {
    /// Start a session whose first elapsed interval is measured from `start`.
    pub fn new(settings: MotionSettings, start: Duration) -> Self {
        Self::with_estimator(settings, OrientationEstimator::new(), start)
    }
}

impl<S: RotationSolver> DeadReckoner<S> {
    pub fn with_estimator(
        settings: MotionSettings,
        estimator: OrientationEstimator<S>,
        start: Duration,
    ) -> Self {
        Self {
            settings,
            gate: FusionGate::new(),
            estimator,
            calibration: CalibrationState::new(),
            state: MotionState::at(start),
            readout: Readout {
                timestamp: start,
                ..Readout::default()
            },
        }
    }

    /// Feed one sensor sample observed at session time `now`.
    ///
    /// Runs a fused update once both kinds are cached. Any failure leaves
    /// heading, motion state and cached samples exactly as they were.
    pub fn push(&mut self, sample: SensorSample, now: Duration) -> Result<FusedUpdate, Failure> {
        self.gate.offer(sample);
        let (acceleration, magnetic_field) = self.gate.pair()?;

        let delta_time = self.state.elapsed_secs(now);
        let linear = subtract_gravity_per_axis(acceleration, self.settings.gravity);
        let next = integrate(self.state, linear, delta_time, self.settings.dead_zone_m)?;

        let azimuth = self.estimator.estimate_azimuth(acceleration, magnetic_field)?;

        self.state = MotionState {
            last_timestamp: now,
            ..next
        };
        self.gate.reset();

        self.readout = Readout {
            azimuth_deg: azimuth,
            calibrated_azimuth_deg: self.calibration.calibrated_azimuth(azimuth),
            position: self.state.position,
            delta_time_s: delta_time,
            timestamp: now,
            updates: self.readout.updates + 1,
        };

        Ok(FusedUpdate {
            readout: self.readout,
            point: TrajectoryPoint {
                timestamp: now,
                displacement_m: self.settings.trajectory_axis.component(self.state.position),
            },
        })
    }

    /// Freeze the current raw azimuth as the calibrated azimuth.
    pub fn calibrate(&mut self) -> f64 {
        let calibrated = self.calibration.calibrate(self.estimator.azimuth());
        self.readout.calibrated_azimuth_deg = calibrated;
        calibrated
    }

    /// Measure the next elapsed interval from `now` (sensor delivery restarted).
    pub fn resume(&mut self, now: Duration) {
        self.state.last_timestamp = now;
    }

    /// Latest values for the presentation layer.
    pub fn readout(&self) -> Readout {
        self.readout
    }

    pub fn motion_state(&self) -> MotionState {
        self.state
    }

    pub fn settings(&self) -> &MotionSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    const G: f64 = STANDARD_GRAVITY;

    fn heading_field(deg: f64) -> SensorSample {
        let h = deg.to_radians();
        SensorSample::magnetic_field(-20.0 * h.sin(), 20.0 * h.cos(), -40.0)
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn level_device_pair_keeps_position_at_zero() {
        let mut reckoner = DeadReckoner::new(MotionSettings::default(), Duration::ZERO);

        let waiting = reckoner.push(SensorSample::acceleration(0.0, 0.0, G), ms(10));
        assert_eq!(waiting, Err(Failure::IncompleteSampleSet));

        let update = reckoner
            .push(SensorSample::magnetic_field(20.0, 0.0, -40.0), ms(20))
            .unwrap();
        assert!((update.readout.delta_time_s - 0.02).abs() < 1e-12);
        assert_eq!(update.readout.position, DVec3::ZERO);
        assert_eq!(update.point.displacement_m, 0.0);
        assert_eq!(update.point.timestamp, ms(20));
        assert_eq!(update.readout.updates, 1);
        assert!((update.readout.azimuth_deg + 90.0).abs() < 1e-9);
        // Uncalibrated: mirrors raw.
        assert_eq!(update.readout.calibrated_azimuth_deg, update.readout.azimuth_deg);
    }

    #[test]
    fn successful_update_clears_the_gate() {
        let mut reckoner = DeadReckoner::new(MotionSettings::default(), Duration::ZERO);
        reckoner.push(SensorSample::acceleration(0.0, 0.0, G), ms(10)).unwrap_err();
        reckoner.push(heading_field(0.0), ms(20)).unwrap();

        let stale = reckoner.push(heading_field(10.0), ms(40));
        assert_eq!(stale, Err(Failure::IncompleteSampleSet));
        let update = reckoner.push(SensorSample::acceleration(0.0, 0.0, G), ms(60)).unwrap();
        assert!((update.readout.azimuth_deg - 10.0).abs() < 1e-9);
        assert!((update.readout.delta_time_s - 0.04).abs() < 1e-12);
    }

    #[test]
    fn degenerate_pair_retains_everything() {
        let mut reckoner = DeadReckoner::new(MotionSettings::default(), Duration::ZERO);
        reckoner.push(SensorSample::acceleration(0.0, 0.0, G), ms(10)).unwrap_err();
        let first = reckoner.push(heading_field(30.0), ms(20)).unwrap();

        reckoner.push(SensorSample::acceleration(0.0, 0.0, G), ms(30)).unwrap_err();
        let before = reckoner.motion_state();
        let failed = reckoner.push(SensorSample::magnetic_field(0.0, 0.0, -40.0), ms(40));
        assert_eq!(failed, Err(Failure::DegenerateOrientation));
        assert_eq!(reckoner.motion_state(), before);
        assert_eq!(reckoner.readout(), first.readout);

        // The cached acceleration is still there; a good field completes the pair.
        let update = reckoner.push(heading_field(31.0), ms(60)).unwrap();
        assert!((update.readout.delta_time_s - 0.04).abs() < 1e-12);
    }

    #[test]
    fn clock_going_backwards_skips_the_update() {
        let mut reckoner = DeadReckoner::new(MotionSettings::default(), ms(100));
        reckoner.push(SensorSample::acceleration(0.0, 0.0, G), ms(90)).unwrap_err();
        let result = reckoner.push(heading_field(45.0), ms(100));
        assert!(matches!(result, Err(Failure::NonMonotonicTime { .. })));
        assert_eq!(reckoner.motion_state(), MotionState::at(ms(100)));
        assert_eq!(reckoner.readout().updates, 0);
        assert_eq!(reckoner.readout().azimuth_deg, 0.0);
    }

    #[test]
    fn calibration_freezes_the_displayed_heading() {
        let mut reckoner = DeadReckoner::new(MotionSettings::default(), Duration::ZERO);
        reckoner.push(SensorSample::acceleration(0.0, 0.0, G), ms(10)).unwrap_err();
        reckoner.push(heading_field(42.0), ms(20)).unwrap();

        let calibrated = reckoner.calibrate();
        assert!((calibrated - 42.0).abs() < 1e-9);
        assert_eq!(reckoner.readout().calibrated_azimuth_deg, calibrated);

        reckoner.push(SensorSample::acceleration(0.0, 0.0, G), ms(30)).unwrap_err();
        let update = reckoner.push(heading_field(57.0), ms(40)).unwrap();
        assert!((update.readout.azimuth_deg - 57.0).abs() < 1e-9);
        assert!((update.readout.calibrated_azimuth_deg - 42.0).abs() < 1e-9);
    }

    #[test]
    fn calibrating_before_any_update_freezes_zero() {
        let mut reckoner = DeadReckoner::new(MotionSettings::default(), Duration::ZERO);
        assert_eq!(reckoner.calibrate(), 0.0);
        reckoner.push(SensorSample::acceleration(0.0, 0.0, G), ms(10)).unwrap_err();
        let update = reckoner.push(heading_field(90.0), ms(20)).unwrap();
        assert_eq!(update.readout.calibrated_azimuth_deg, 0.0);
    }

    #[test]
    fn resume_rebases_elapsed_time() {
        let mut reckoner = DeadReckoner::new(MotionSettings::default(), Duration::ZERO);
        reckoner.resume(Duration::from_secs(30));
        reckoner
            .push(SensorSample::acceleration(0.0, 0.0, G), Duration::from_secs(30))
            .unwrap_err();
        let update = reckoner
            .push(heading_field(0.0), Duration::from_millis(30_020))
            .unwrap();
        assert!((update.readout.delta_time_s - 0.02).abs() < 1e-9);
    }

    #[test]
    fn trajectory_follows_selected_axis() {
        let settings = MotionSettings {
            dead_zone_m: 0.0,
            trajectory_axis: Axis::Y,
            ..MotionSettings::default()
        };
        let mut reckoner = DeadReckoner::new(settings, Duration::ZERO);
        // y reads 2g, so linear y = +g after per-axis subtraction.
        reckoner.push(SensorSample::acceleration(0.0, 2.0 * G, G), ms(500)).unwrap_err();
        let update = reckoner.push(heading_field(0.0), Duration::from_secs(1)).unwrap();
        assert!((update.point.displacement_m - G).abs() < 1e-9);
        assert_eq!(update.point.displacement_m, update.readout.position.y);
    }

    #[test]
    fn long_gap_is_integrated_as_one_step() {
        let settings = MotionSettings {
            dead_zone_m: 0.0,
            ..MotionSettings::default()
        };
        let mut reckoner = DeadReckoner::new(settings, Duration::ZERO);
        reckoner.push(SensorSample::acceleration(G + 1.0, G, G), ms(1)).unwrap_err();
        let update = reckoner.push(heading_field(0.0), Duration::from_secs(10)).unwrap();
        assert!((update.readout.delta_time_s - 10.0).abs() < 1e-12);
        assert!((update.readout.position.x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn demo_log_turns_from_north_to_east() {
        use crate::protocol::SampleLogParser;

        let mut parser = SampleLogParser::new();
        parser.push_data(include_bytes!("../../../demos/turn_and_slide.log"));
        let mut reckoner = DeadReckoner::new(MotionSettings::default(), Duration::ZERO);

        let mut headings = Vec::new();
        while let Some(record) = parser.finish() {
            let record = record.unwrap();
            if let Ok(update) = reckoner.push(record.sample, record.offset) {
                headings.push(update.readout.azimuth_deg);
            }
        }

        assert_eq!(headings.len(), 50);
        assert!(headings[0].abs() < 0.01);
        assert!((headings[49] - 90.0).abs() < 0.01);
        for (i, pair) in headings.windows(2).enumerate() {
            let expected = 90.0 / 49.0;
            assert!((pair[1] - pair[0] - expected).abs() < 0.01, "step {i}");
        }
    }
}
