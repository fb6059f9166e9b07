//! Propagated samples consumed by the scene builders
//!
//! The propagation engine lives outside this crate; it hands over ordered lists
//! of these samples, all expressed in an Earth-centered inertial frame.

use chrono::{DateTime, Utc};
use nalgebra::{DMatrix, Matrix3, UnitQuaternion, Vector3};

use crate::error::{CzmlError, Result};
use crate::time::{iso8601, seconds_between, Clock};

/// Earth's gravitational parameter (GM) in m³/s²
pub const MU_EARTH: f64 = 3.986004418e14;

/// WGS-84 equatorial radius in meters
pub const EARTH_EQUATORIAL_RADIUS_M: f64 = 6_378_137.0;

/// WGS-84 flattening
pub const EARTH_FLATTENING: f64 = 1.0 / 298.257223563;

/// Position/velocity sample in the inertial frame
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalState {
    /// Position (meters)
    pub position: Vector3<f64>,

    /// Velocity (m/s)
    pub velocity: Vector3<f64>,

    pub epoch: DateTime<Utc>,
}

impl OrbitalState {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>, epoch: DateTime<Utc>) -> Self {
        Self {
            position,
            velocity,
            epoch,
        }
    }

    /// Create from position/velocity in kilometers and km/s
    pub fn from_km(pos_km: Vector3<f64>, vel_km_s: Vector3<f64>, epoch: DateTime<Utc>) -> Self {
        Self {
            position: pos_km * 1000.0,
            velocity: vel_km_s * 1000.0,
            epoch,
        }
    }

    /// Distance from the central body's center in meters
    pub fn radius(&self) -> f64 {
        self.position.norm()
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Specific orbital energy (vis-viva) in J/kg
    pub fn specific_energy(&self) -> f64 {
        0.5 * self.velocity.norm_squared() - MU_EARTH / self.radius()
    }

    /// Semi-major axis in meters (negative for hyperbolic)
    pub fn semi_major_axis(&self) -> f64 {
        -MU_EARTH / (2.0 * self.specific_energy())
    }

    /// Orbital period in seconds, only for elliptical orbits
    pub fn period(&self) -> Option<f64> {
        let a = self.semi_major_axis();
        if a > 0.0 {
            Some(2.0 * std::f64::consts::PI * (a.powi(3) / MU_EARTH).sqrt())
        } else {
            None
        }
    }
}

/// Cubic Hermite interpolation between two samples, using their velocities
///
/// `epoch` is expected to lie between `a.epoch` and `b.epoch`.
pub fn hermite_state(a: &OrbitalState, b: &OrbitalState, epoch: DateTime<Utc>) -> OrbitalState {
    let h = seconds_between(&a.epoch, &b.epoch);
    if h <= 0.0 {
        return OrbitalState::new(a.position, a.velocity, epoch);
    }
    let s = seconds_between(&a.epoch, &epoch) / h;
    let (s2, s3) = (s * s, s * s * s);

    let position = a.position * (2.0 * s3 - 3.0 * s2 + 1.0)
        + a.velocity * (h * (s3 - 2.0 * s2 + s))
        + b.position * (-2.0 * s3 + 3.0 * s2)
        + b.velocity * (h * (s3 - s2));
    let velocity = a.position * ((6.0 * s2 - 6.0 * s) / h)
        + a.velocity * (3.0 * s2 - 4.0 * s + 1.0)
        + b.position * ((-6.0 * s2 + 6.0 * s) / h)
        + b.velocity * (3.0 * s2 - 2.0 * s);
    OrbitalState::new(position, velocity, epoch)
}

/// State at `epoch` from an ordered sample list, `None` outside the sampled span
pub fn interpolate_state(states: &[OrbitalState], epoch: DateTime<Utc>) -> Option<OrbitalState> {
    let after = states.partition_point(|s| s.epoch <= epoch);
    if after == 0 {
        return None;
    }
    let before = &states[after - 1];
    if before.epoch == epoch {
        return Some(before.clone());
    }
    states.get(after).map(|next| hermite_state(before, next, epoch))
}

/// Spacecraft attitude: rotation from body axes to the inertial frame
#[derive(Debug, Clone, PartialEq)]
pub struct Attitude {
    pub epoch: DateTime<Utc>,
    pub rotation: UnitQuaternion<f64>,
}

impl Attitude {
    pub fn new(epoch: DateTime<Utc>, rotation: UnitQuaternion<f64>) -> Self {
        Self { epoch, rotation }
    }

    /// Body axis expressed in the inertial frame
    pub fn body_axis(&self, axis: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * axis
    }
}

/// State covariance at one instant (inertial frame, position block first)
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceSample {
    pub epoch: DateTime<Utc>,
    matrix: DMatrix<f64>,
}

impl CovarianceSample {
    /// Accepts any square matrix of size 3 or more (3x3 position, 6x6 state, ...)
    pub fn new(epoch: DateTime<Utc>, matrix: DMatrix<f64>) -> Result<Self> {
        if matrix.nrows() < 3 || matrix.ncols() < 3 || matrix.nrows() != matrix.ncols() {
            return Err(CzmlError::InvalidCovariance(format!(
                "expected a square matrix of size >= 3, got {}x{}",
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(CzmlError::InvalidCovariance(format!(
                "non-finite entry at {}",
                iso8601(&epoch)
            )));
        }
        Ok(Self { epoch, matrix })
    }

    pub fn from_position_block(epoch: DateTime<Utc>, block: Matrix3<f64>) -> Self {
        Self {
            epoch,
            matrix: DMatrix::from_iterator(3, 3, block.iter().copied()),
        }
    }

    /// Upper-left 3x3 position block
    pub fn position_block(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).clone_owned()
    }
}

/// Source of propagated samples, implemented by the propagation engine
pub trait Ephemeris {
    fn state_at(&self, instant: &DateTime<Utc>) -> Result<OrbitalState>;

    /// Attitude at `instant`, when the source models one
    fn attitude_at(&self, _instant: &DateTime<Utc>) -> Option<Attitude> {
        None
    }
}

/// States at every clock instant
pub fn sample_states(ephemeris: &dyn Ephemeris, clock: &Clock) -> Result<Vec<OrbitalState>> {
    clock.all_samples().map(|t| ephemeris.state_at(&t)).collect()
}

/// Attitudes at every clock instant the source provides one for
pub fn sample_attitudes(ephemeris: &dyn Ephemeris, clock: &Clock) -> Vec<Attitude> {
    clock
        .all_samples()
        .filter_map(|t| ephemeris.attitude_at(&t))
        .collect()
}

/// Check that instants are strictly increasing and non-empty
pub fn check_increasing(instants: impl IntoIterator<Item = DateTime<Utc>>) -> Result<usize> {
    let mut count = 0usize;
    let mut previous: Option<DateTime<Utc>> = None;
    for instant in instants {
        if let Some(prev) = previous {
            if instant <= prev {
                return Err(CzmlError::InvalidSamples(format!(
                    "instant {} does not follow {}",
                    iso8601(&instant),
                    iso8601(&prev)
                )));
            }
        }
        previous = Some(instant);
        count += 1;
    }
    if count == 0 {
        return Err(CzmlError::InvalidSamples("no samples".into()));
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_orbital_state_iss() {
        // Approximate ISS orbit: 420 km altitude, ~7.66 km/s
        let epoch = Utc.with_ymd_and_hms(2026, 1, 29, 12, 0, 0).unwrap();
        let r = 6_371_000.0 + 420_000.0;
        let v = (MU_EARTH / r).sqrt();

        let state = OrbitalState::new(Vector3::new(r, 0.0, 0.0), Vector3::new(0.0, v, 0.0), epoch);

        assert!((state.speed() / 1000.0 - 7.66).abs() < 0.1);
        assert!((state.semi_major_axis() - r).abs() < 1.0);

        let period = state.period().unwrap();
        assert!((period / 60.0 - 92.0).abs() < 2.0);
    }

    #[test]
    fn test_hyperbolic_has_no_period() {
        let epoch = Utc.with_ymd_and_hms(2026, 1, 29, 12, 0, 0).unwrap();
        let state = OrbitalState::from_km(
            Vector3::new(7000.0, 0.0, 0.0),
            Vector3::new(0.0, 20.0, 0.0),
            epoch,
        );
        assert!(state.period().is_none());
    }

    #[test]
    fn test_covariance_position_block() {
        let epoch = Utc.with_ymd_and_hms(2026, 1, 29, 12, 0, 0).unwrap();
        let full = DMatrix::from_fn(6, 6, |i, j| (i * 6 + j) as f64);
        let sample = CovarianceSample::new(epoch, full).unwrap();
        let block = sample.position_block();
        assert_eq!(block[(0, 0)], 0.0);
        assert_eq!(block[(2, 1)], 13.0);

        assert!(CovarianceSample::new(epoch, DMatrix::zeros(2, 2)).is_err());
        assert!(CovarianceSample::new(epoch, DMatrix::zeros(3, 4)).is_err());
    }

    #[test]
    fn test_state_between_samples() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let r: f64 = 7_000_000.0;
        let n = (MU_EARTH / r.powi(3)).sqrt();
        let exact = |t: f64| {
            let angle = n * t;
            OrbitalState::new(
                Vector3::new(r * angle.cos(), r * angle.sin(), 0.0),
                Vector3::new(-n * r * angle.sin(), n * r * angle.cos(), 0.0),
                crate::time::offset_seconds(&t0, t),
            )
        };
        let states: Vec<_> = (0..5).map(|i| exact(60.0 * i as f64)).collect();

        let mid = interpolate_state(&states, crate::time::offset_seconds(&t0, 90.0)).unwrap();
        let truth = exact(90.0);
        assert!((mid.position - truth.position).norm() < 5.0);
        assert!((mid.velocity - truth.velocity).norm() < 0.05);
        // a stale sample would be ~230 km away
        assert!((states[1].position - truth.position).norm() > 200_000.0);

        let on_sample = interpolate_state(&states, states[2].epoch).unwrap();
        assert_eq!(on_sample, states[2]);
        assert_eq!(interpolate_state(&states, states[4].epoch).unwrap(), states[4]);
        assert!(interpolate_state(&states, crate::time::offset_seconds(&t0, -1.0)).is_none());
        assert!(interpolate_state(&states, crate::time::offset_seconds(&t0, 241.0)).is_none());
    }

    #[test]
    fn test_check_increasing() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 29, 12, 0, 0).unwrap();
        let t1 = t0 + chrono::Duration::seconds(1);
        assert_eq!(check_increasing(vec![t0, t1]).unwrap(), 2);
        assert!(check_increasing(vec![t1, t0]).is_err());
        assert!(check_increasing(vec![t0, t0]).is_err());
        assert!(check_increasing(Vec::new()).is_err());
    }
}
