mod control;
mod dashboard;

use anyhow::Result;
use control::Control;
use dashboard::Dashboard;
use magcali_config::{AppConfig, SourceConfig};
use magcali_motion::clock::MonotonicClock;
use magcali_motion::source::{self, SimulatedDevice};
use magcali_motion::types::SensorSample;
use magcali_motion::MotionClient;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Samples buffered between the source and the estimator.
const SAMPLE_QUEUE: usize = 256;

/// Start the configured sensor source (replay log, or simulated sensors).
fn spawn_source(
    config: &SourceConfig,
    tx: mpsc::Sender<SensorSample>,
) -> tokio::task::JoinHandle<()> {
    match config.replay_path.clone() {
        Some(path) => tokio::spawn(async move {
            if let Err(e) = source::replay_log(&path, tx).await {
                error!(?e, "Sensor log replay failed");
            }
        }),
        None => {
            let device = SimulatedDevice {
                rate_hz: config.simulated_rate_hz,
                heading_deg: config.simulated_heading_deg,
                field_ut: config.simulated_field_ut,
            };
            tokio::spawn(async move {
                if let Err(e) = device.run(tx).await {
                    error!(?e, "Simulated sensors failed");
                }
            })
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "magcali=info,magcali_motion=info,magcali_config=info".into()),
        )
        .init();

    info!("Magnetic heading and displacement tracker starting");

    let config = magcali_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // A log path on the command line overrides the configured source for this run only.
    let mut source_config = config.source.clone();
    if let Some(path) = std::env::args_os().nth(1) {
        source_config.replay_path = Some(PathBuf::from(path));
    }
    info!(?config.motion, replay = ?source_config.replay_path, "Config loaded");

    let (sample_tx, sample_rx) = mpsc::channel(SAMPLE_QUEUE);
    let source_task = spawn_source(&source_config, sample_tx);
    let mut client = MotionClient::spawn(sample_rx, config.motion, MonotonicClock::new());

    let mut dashboard = Dashboard::new(config.display.clone());
    let mut refresh =
        tokio::time::interval(Duration::from_millis(config.display.refresh_ms.max(16)));
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    println!("{}", control::HELP);

    loop {
        tokio::select! {
            _ = refresh.tick() => {
                dashboard.record(client.drain_trajectory());
                println!("{}\n", dashboard.lines(&client.readout()).join("\n"));
            }
            line = stdin.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => match Control::parse(&line) {
                        Some(Control::Calibrate) => client.calibrate(),
                        Some(Control::Pause) => client.pause(),
                        Some(Control::Resume) => client.resume(),
                        Some(Control::Quit) => break,
                        None => println!("{}", control::HELP),
                    },
                    Ok(None) => {
                        info!("Stdin closed, controls disabled");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!(?e, "Failed to read stdin, controls disabled");
                        stdin_open = false;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    source_task.abort();

    if let Err(e) = magcali_config::save_config(&config) {
        error!(?e, "Failed to save config");
    }

    Ok(())
}
