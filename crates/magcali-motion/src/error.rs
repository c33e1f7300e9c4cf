use thiserror::Error;

/// Reasons a fused update is skipped.
///
/// None of these are fatal: the caller keeps its last good readout and the
/// next sensor callback supersedes the skipped one.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Failure {
    #[error("Gravity and magnetic field do not determine a horizontal plane")]
    DegenerateOrientation,
    #[error("Elapsed time {delta_s}s is not positive")]
    NonMonotonicTime { delta_s: f64 },
    #[error("Waiting for a fresh sample from both sensors")]
    IncompleteSampleSet,
}
