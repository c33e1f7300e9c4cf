//! Dead-reckoning estimator for accelerometer + magnetometer streams.
//!
//! Produces a heading and a relative displacement since session start by
//! double-integrating linear acceleration, with a dead zone on position.

pub mod calibration;
pub mod clock;
pub mod error;
pub mod gate;
pub mod integrator;
pub mod orientation;
pub mod protocol;
pub mod reckoner;
pub mod source;
pub mod trajectory;
pub mod types;

use clock::SampleClock;
use error::Failure;
use reckoner::{DeadReckoner, MotionSettings};
use tokio::sync::{mpsc, watch};
use trajectory::TrajectoryPoint;
use types::{Readout, SensorSample};

pub use reckoner::FusedUpdate;

/// Commands sent to the estimator task.
enum MotionCommand {
    Calibrate,
    Pause,
    Resume,
}

/// Handle to the background estimator.
///
/// The task owns the [`DeadReckoner`]; each fused update is applied in full
/// before the next message is handled, and readouts are published whole.
pub struct MotionClient {
    readout_rx: watch::Receiver<Readout>,
    trajectory_rx: mpsc::UnboundedReceiver<TrajectoryPoint>,
    command_tx: mpsc::UnboundedSender<MotionCommand>,
    _task: tokio::task::JoinHandle<()>,
}

impl MotionClient {
    /// Start processing samples from `samples`, timestamped by `clock`.
    pub fn spawn<C>(
        samples: mpsc::Receiver<SensorSample>,
        settings: MotionSettings,
        clock: C,
    ) -> Self
    where
        C: SampleClock + 'static,
    {
        let reckoner = DeadReckoner::new(settings, clock.now());
        let (readout_tx, readout_rx) = watch::channel(reckoner.readout());
        let (trajectory_tx, trajectory_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        tracing::info!(?settings, "Starting motion estimator");
        let task = tokio::spawn(motion_loop(
            reckoner,
            clock,
            samples,
            command_rx,
            readout_tx,
            trajectory_tx,
        ));

        Self {
            readout_rx,
            trajectory_rx,
            command_tx,
            _task: task,
        }
    }

    /// Latest readout (non-blocking).
    pub fn readout(&self) -> Readout {
        *self.readout_rx.borrow()
    }

    /// A receiver that is notified whenever a new readout is published.
    pub fn subscribe(&self) -> watch::Receiver<Readout> {
        self.readout_rx.clone()
    }

    /// Trajectory points emitted since the last call, oldest first.
    pub fn drain_trajectory(&mut self) -> Vec<TrajectoryPoint> {
        let mut points = Vec::new();
        while let Ok(point) = self.trajectory_rx.try_recv() {
            points.push(point);
        }
        points
    }

    /// Freeze the current heading as the calibrated azimuth.
    pub fn calibrate(&self) {
        let _ = self.command_tx.send(MotionCommand::Calibrate);
    }

    /// Ignore samples until [`MotionClient::resume`].
    pub fn pause(&self) {
        let _ = self.command_tx.send(MotionCommand::Pause);
    }

    /// Accept samples again, measuring the next interval from now.
    pub fn resume(&self) {
        let _ = self.command_tx.send(MotionCommand::Resume);
    }
}

/// Background task: gate samples, run fused updates, publish results.
async fn motion_loop<C: SampleClock>(
    mut reckoner: DeadReckoner,
    clock: C,
    mut samples: mpsc::Receiver<SensorSample>,
    mut command_rx: mpsc::UnboundedReceiver<MotionCommand>,
    readout_tx: watch::Sender<Readout>,
    trajectory_tx: mpsc::UnboundedSender<TrajectoryPoint>,
) {
    let mut paused = false;

    loop {
        tokio::select! {
            biased;

            Some(cmd) = command_rx.recv() => {
                match cmd {
                    MotionCommand::Calibrate => {
                        let calibrated = reckoner.calibrate();
                        tracing::info!(calibrated, "Azimuth calibrated");
                        let _ = readout_tx.send(reckoner.readout());
                    }
                    MotionCommand::Pause => {
                        paused = true;
                        tracing::info!("Sensor processing paused");
                    }
                    MotionCommand::Resume => {
                        paused = false;
                        reckoner.resume(clock.now());
                        tracing::info!("Sensor processing resumed");
                    }
                }
            }
            sample = samples.recv() => {
                let Some(sample) = sample else {
                    tracing::info!("Sensor stream closed");
                    break;
                };
                if paused {
                    continue;
                }
                match reckoner.push(sample, clock.now()) {
                    Ok(update) => {
                        // Point first, so a reader woken by the readout finds it.
                        let _ = trajectory_tx.send(update.point);
                        let _ = readout_tx.send(update.readout);
                        if update.readout.updates % 1000 == 0 {
                            tracing::debug!(
                                updates = update.readout.updates,
                                "Fused updates applied"
                            );
                        }
                    }
                    Err(Failure::IncompleteSampleSet) => {}
                    Err(e) => {
                        tracing::trace!(?e, "Skipping fused update");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clock::ManualClock;
    use glam::DVec3;
    use integrator::STANDARD_GRAVITY;
    use std::time::Duration;

    fn heading_field(deg: f64) -> SensorSample {
        let h = deg.to_radians();
        SensorSample::magnetic_field(-20.0 * h.sin(), 20.0 * h.cos(), -40.0)
    }

    #[tokio::test]
    async fn publishes_readout_and_trajectory_point() {
        let clock = ManualClock::new();
        let (tx, rx) = mpsc::channel(16);
        let mut client = MotionClient::spawn(rx, MotionSettings::default(), clock.clone());
        let mut readouts = client.subscribe();

        clock.set(Duration::from_millis(20));
        tx.send(SensorSample::acceleration(0.0, 0.0, STANDARD_GRAVITY)).await.unwrap();
        tx.send(SensorSample::magnetic_field(20.0, 0.0, -40.0)).await.unwrap();
        readouts.changed().await.unwrap();

        let readout = client.readout();
        assert_eq!(readout.updates, 1);
        assert_eq!(readout.position, DVec3::ZERO);
        assert!((readout.delta_time_s - 0.02).abs() < 1e-9);

        let points = client.drain_trajectory();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].timestamp, Duration::from_millis(20));
        assert!(client.drain_trajectory().is_empty());
    }

    #[tokio::test]
    async fn calibrate_freezes_heading_across_updates() {
        let clock = ManualClock::new();
        let (tx, rx) = mpsc::channel(16);
        let client = MotionClient::spawn(rx, MotionSettings::default(), clock.clone());
        let mut readouts = client.subscribe();

        clock.set(Duration::from_millis(20));
        tx.send(SensorSample::acceleration(0.0, 0.0, STANDARD_GRAVITY)).await.unwrap();
        tx.send(heading_field(42.0)).await.unwrap();
        readouts.changed().await.unwrap();

        client.calibrate();
        readouts.changed().await.unwrap();
        assert!((client.readout().calibrated_azimuth_deg - 42.0).abs() < 1e-9);

        clock.set(Duration::from_millis(40));
        tx.send(SensorSample::acceleration(0.0, 0.0, STANDARD_GRAVITY)).await.unwrap();
        tx.send(heading_field(57.0)).await.unwrap();
        readouts.changed().await.unwrap();

        let readout = client.readout();
        assert!((readout.azimuth_deg - 57.0).abs() < 1e-9);
        assert!((readout.calibrated_azimuth_deg - 42.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn degenerate_pair_publishes_nothing() {
        let clock = ManualClock::new();
        let (tx, rx) = mpsc::channel(16);
        let client = MotionClient::spawn(rx, MotionSettings::default(), clock.clone());
        let mut readouts = client.subscribe();

        clock.set(Duration::from_millis(20));
        tx.send(SensorSample::acceleration(0.0, 0.0, STANDARD_GRAVITY)).await.unwrap();
        tx.send(SensorSample::magnetic_field(0.0, 0.0, -40.0)).await.unwrap();
        drop(tx);

        // The stream ends without any fused update; only the sender drop wakes us.
        assert!(readouts.changed().await.is_err());
        assert_eq!(readouts.borrow().updates, 0);
    }
}
