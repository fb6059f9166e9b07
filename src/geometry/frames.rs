//! Earth rotation and local orbital frames

use chrono::{DateTime, Utc};
use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use serde::Deserialize;

use crate::error::{CzmlError, Result};
use crate::time::iso8601;

const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
/// 2000-01-01T12:00:00Z as a Unix timestamp
const J2000_UNIX_SECONDS: f64 = 946_728_000.0;
const GMST_BASE_DEG: f64 = 280.460_618_37;
const GMST_ROTATION_PER_DAY: f64 = 360.985_647_366_29;
const GMST_CORRECTION: f64 = 0.000_387_933;

/// Greenwich mean sidereal time in radians
pub fn greenwich_mean_sidereal_time(instant: &DateTime<Utc>) -> f64 {
    let unix = instant.timestamp() as f64 + instant.timestamp_subsec_nanos() as f64 * 1e-9;
    let days = (unix - J2000_UNIX_SECONDS) / SECONDS_PER_DAY;
    let centuries = days / DAYS_PER_JULIAN_CENTURY;
    let degrees = GMST_BASE_DEG
        + GMST_ROTATION_PER_DAY * days
        + GMST_CORRECTION * centuries * centuries
        - centuries * centuries * centuries / 38_710_000.0;
    degrees.rem_euclid(360.0).to_radians()
}

/// Rotation taking inertial vectors into the Earth-fixed frame
pub fn inertial_to_fixed(instant: &DateTime<Utc>) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -greenwich_mean_sidereal_time(instant))
}

/// Inertial position expressed in the Earth-fixed frame
pub fn to_fixed(instant: &DateTime<Utc>, inertial: &Vector3<f64>) -> Vector3<f64> {
    inertial_to_fixed(instant) * inertial
}

/// Local orbital frame built from position and velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalOrbitalFrame {
    /// Radial, along-track, orbit normal
    #[default]
    Qsw,
    /// Velocity, in-plane normal, orbit normal
    Tnw,
}

impl LocalOrbitalFrame {
    /// Rotation from local-frame axes to the inertial frame
    pub fn rotation(
        &self,
        epoch: &DateTime<Utc>,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
    ) -> Result<Rotation3<f64>> {
        let momentum = position.cross(velocity);
        let degenerate = || {
            CzmlError::InvalidSamples(format!(
                "degenerate position/velocity at {}",
                iso8601(epoch)
            ))
        };
        let w = momentum.try_normalize(1e-12).ok_or_else(degenerate)?;

        let (x, y) = match self {
            Self::Qsw => {
                let q = position.try_normalize(1e-12).ok_or_else(degenerate)?;
                (q, w.cross(&q))
            }
            Self::Tnw => {
                let t = velocity.try_normalize(1e-12).ok_or_else(degenerate)?;
                (t, w.cross(&t))
            }
        };

        Ok(Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[x, y, w])))
    }
}
