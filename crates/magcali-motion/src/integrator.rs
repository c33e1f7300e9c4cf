//! Double integration of linear acceleration into displacement.

use crate::error::Failure;
use glam::DVec3;
use std::time::Duration;

/// Standard gravity (m/s^2).
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Positions closer to zero than this (meters) are clamped to zero.
pub const DEFAULT_DEAD_ZONE_M: f64 = 1.5;

/// Velocity and displacement carried between fused updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    pub velocity: DVec3,
    pub position: DVec3,
    /// Session time of the last fused update (or of the last rebase).
    pub last_timestamp: Duration,
}

impl MotionState {
    /// Zero motion, with elapsed time measured from `start`.
    pub fn at(start: Duration) -> Self {
        Self {
            velocity: DVec3::ZERO,
            position: DVec3::ZERO,
            last_timestamp: start,
        }
    }

    /// Seconds elapsed between the last update and `now`.
    ///
    /// Negative when the clock went backwards.
    pub fn elapsed_secs(&self, now: Duration) -> f64 {
        now.as_secs_f64() - self.last_timestamp.as_secs_f64()
    }
}

impl Default for MotionState {
    fn default() -> Self {
        Self::at(Duration::ZERO)
    }
}

/// Removes gravity by subtracting `gravity` from every axis.
///
/// Only cancels gravity correctly when each axis already carries a full `g`;
/// a tilt-aware variant can replace this without touching [`integrate`].
pub fn subtract_gravity_per_axis(raw: DVec3, gravity: f64) -> DVec3 {
    raw - DVec3::splat(gravity)
}

/// Zero every component whose magnitude is below `threshold`.
pub fn apply_dead_zone(position: DVec3, threshold: f64) -> DVec3 {
    let clamp = |v: f64| if v.abs() < threshold { 0.0 } else { v };
    DVec3::new(clamp(position.x), clamp(position.y), clamp(position.z))
}

/// Advance `state` by one semi-implicit Euler step.
///
/// The returned state's position has already been through the dead zone and
/// `last_timestamp` is left for the caller to stamp. `delta_time` must be a
/// positive, finite number of seconds.
pub fn integrate(
    state: MotionState,
    linear_acceleration: DVec3,
    delta_time: f64,
    dead_zone: f64,
) -> Result<MotionState, Failure> {
    if !(delta_time > 0.0) || !delta_time.is_finite() {
        return Err(Failure::NonMonotonicTime {
            delta_s: delta_time,
        });
    }

    let velocity = state.velocity + linear_acceleration * delta_time;
    let position = state.position + velocity * delta_time;

    Ok(MotionState {
        velocity,
        position: apply_dead_zone(position, dead_zone),
        last_timestamp: state.last_timestamp,
    })
}
