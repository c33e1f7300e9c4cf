//! Sensor sources that push samples into the estimator's channel.
//!
//! Each source returns once the receiving side is dropped.

use crate::integrator::STANDARD_GRAVITY;
use crate::protocol::{LogRecord, SampleLogParser};
use crate::types::SensorSample;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Magnetic inclination used by the simulated device (degrees below horizon).
const SIMULATED_INCLINATION_DEG: f64 = 60.0;
/// Shortest tick of the simulated device.
const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

/// A level device that never moves, facing a fixed heading.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedDevice {
    /// Samples per second for each sensor.
    pub rate_hz: f64,
    pub heading_deg: f64,
    /// Total field strength (uT).
    pub field_ut: f64,
}

impl SimulatedDevice {
    pub fn acceleration(&self) -> SensorSample {
        SensorSample::acceleration(0.0, 0.0, STANDARD_GRAVITY)
    }

    pub fn magnetic_field(&self) -> SensorSample {
        let inclination = SIMULATED_INCLINATION_DEG.to_radians();
        let horizontal = self.field_ut * inclination.cos();
        let vertical = self.field_ut * inclination.sin();
        let h = self.heading_deg.to_radians();
        SensorSample::magnetic_field(-horizontal * h.sin(), horizontal * h.cos(), -vertical)
    }

    /// Emit one acceleration and one magnetic sample per tick.
    ///
    /// Rates above 1 kHz are capped at one tick per millisecond.
    pub async fn run(self, tx: mpsc::Sender<SensorSample>) -> Result<()> {
        if !self.rate_hz.is_finite() || self.rate_hz <= 0.0 {
            anyhow::bail!("Simulated sample rate must be positive, got {}", self.rate_hz);
        }
        let period = Duration::from_secs_f64(1.0 / self.rate_hz.max(1.0)).max(MIN_TICK_PERIOD);
        let mut ticker = tokio::time::interval(period);
        tracing::info!(
            rate_hz = self.rate_hz,
            heading = self.heading_deg,
            "Simulated sensors started"
        );

        loop {
            ticker.tick().await;
            if tx.send(self.acceleration()).await.is_err()
                || tx.send(self.magnetic_field()).await.is_err()
            {
                tracing::debug!("Sample receiver dropped, simulation exiting");
                return Ok(());
            }
        }
    }
}

/// Replay a recorded log, reproducing its relative timing.
pub async fn replay_log(path: &Path, tx: mpsc::Sender<SensorSample>) -> Result<()> {
    let mut file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open sensor log {}", path.display()))?;
    tracing::info!(path = %path.display(), "Replaying sensor log");

    let mut parser = SampleLogParser::new();
    let mut buf = [0u8; 4096];
    let start = Instant::now();
    let mut replayed: u64 = 0;

    loop {
        let n = file.read(&mut buf).await?;
        if n > 0 {
            parser.push_data(&buf[..n]);
        }

        loop {
            let next = if n == 0 {
                parser.finish()
            } else {
                parser.next_record()
            };
            let Some(result) = next else { break };
            match result {
                Ok(record) => {
                    if !forward(record, start, &tx).await {
                        tracing::debug!("Sample receiver dropped, replay exiting");
                        return Ok(());
                    }
                    replayed += 1;
                }
                Err(e) => tracing::trace!(?e, "Skipping malformed log line"),
            }
        }

        if n == 0 {
            tracing::info!(replayed, "Sensor log finished");
            return Ok(());
        }
    }
}

async fn forward(record: LogRecord, start: Instant, tx: &mpsc::Sender<SensorSample>) -> bool {
    tokio::time::sleep_until(start + record.offset).await;
    tx.send(record.sample).await.is_ok()
}
