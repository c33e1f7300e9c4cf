//! Heading from gravity and the geomagnetic field.
//!
//! The rotation-matrix step is an injected capability ([`RotationSolver`]) so
//! a platform primitive can stand in for [`GravityMagneticSolver`].

use crate::error::Failure;
use glam::DVec3;
use nalgebra::{Matrix3, Vector3};

/// Accelerations below a tenth of standard gravity are treated as free fall.
const FREE_FALL_GRAVITY_SQUARED: f64 = 0.01 * 9.81 * 9.81;
/// Minimum norm of (magnetic x gravity) before normalization.
const MIN_EAST_NORM: f64 = 0.1;

/// Computes the device-to-world rotation from gravity and geomagnetic vectors.
pub trait RotationSolver: Send {
    /// Rows of the returned matrix are world east, north and up, expressed in
    /// device coordinates. `None` when the inputs do not pin down a frame.
    fn rotation_matrix(
        &self,
        gravity: &Vector3<f64>,
        geomagnetic: &Vector3<f64>,
    ) -> Option<Matrix3<f64>>;
}

/// Orthonormal basis with up along gravity and north along the horizontal
/// projection of the magnetic field.
#[derive(Debug, Clone, Copy, Default)]
pub struct GravityMagneticSolver;

impl RotationSolver for GravityMagneticSolver {
    fn rotation_matrix(
        &self,
        gravity: &Vector3<f64>,
        geomagnetic: &Vector3<f64>,
    ) -> Option<Matrix3<f64>> {
        if !gravity.iter().chain(geomagnetic.iter()).all(|c| c.is_finite()) {
            return None;
        }
        if gravity.norm_squared() < FREE_FALL_GRAVITY_SQUARED {
            return None;
        }

        let east = geomagnetic.cross(gravity);
        let east_norm = east.norm();
        if east_norm < MIN_EAST_NORM {
            // Parallel vectors, or no usable field.
            return None;
        }
        let east = east / east_norm;
        let up = gravity.normalize();
        let north = up.cross(&east);

        Some(Matrix3::from_rows(&[
            east.transpose(),
            north.transpose(),
            up.transpose(),
        ]))
    }
}

/// Yaw of a rotation matrix in degrees, wrapped to [-180, 180).
pub fn azimuth_from_rotation(rotation: &Matrix3<f64>) -> f64 {
    let degrees = rotation[(0, 1)].atan2(rotation[(1, 1)]).to_degrees();
    if degrees >= 180.0 {
        degrees - 360.0
    } else {
        degrees
    }
}

/// Turns accelerometer + magnetometer pairs into a heading.
///
/// Keeps the last successfully computed azimuth so a failed estimate leaves
/// the displayed heading untouched.
pub struct OrientationEstimator<S = GravityMagneticSolver> {
    solver: S,
    azimuth_deg: f64,
}

impl OrientationEstimator<GravityMagneticSolver> {
    pub fn new() -> Self {
        Self::with_solver(GravityMagneticSolver)
    }
}

impl Default for OrientationEstimator<GravityMagneticSolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RotationSolver> OrientationEstimator<S> {
    pub fn with_solver(solver: S) -> Self {
        Self {
            solver,
            azimuth_deg: 0.0,
        }
    }

    /// Estimate the heading for one sample pair.
    ///
    /// On failure the stored azimuth is not modified.
    pub fn estimate_azimuth(
        &mut self,
        acceleration: DVec3,
        magnetic_field: DVec3,
    ) -> Result<f64, Failure> {
        let gravity = Vector3::new(acceleration.x, acceleration.y, acceleration.z);
        let geomagnetic = Vector3::new(magnetic_field.x, magnetic_field.y, magnetic_field.z);

        let rotation = self
            .solver
            .rotation_matrix(&gravity, &geomagnetic)
            .ok_or(Failure::DegenerateOrientation)?;

        self.azimuth_deg = azimuth_from_rotation(&rotation);
        Ok(self.azimuth_deg)
    }

    /// Last successfully estimated azimuth (0.0 before the first success).
    pub fn azimuth(&self) -> f64 {
        self.azimuth_deg
    }
}
