//! Covariance ellipsoids
//!
//! The position block of a covariance is rotated into the local orbital frame and
//! eigendecomposed. Eigenvectors come back with arbitrary signs, so roughly half
//! of the bases are left-handed; those are corrected by swapping two columns (and
//! the matching eigenvalues) so every sample yields a proper rotation.

use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

use super::frames::LocalOrbitalFrame;
use crate::error::Result;
use crate::state::{CovarianceSample, OrbitalState};

const ORTHONORMAL_TOLERANCE: f64 = 1e-6;

/// Principal axes of a covariance ellipsoid
#[derive(Debug, Clone, PartialEq)]
pub struct EllipsoidAxes {
    /// Semi-axis lengths, one per basis column
    pub radii: Vector3<f64>,
    /// Right-handed eigenbasis (columns are principal directions)
    pub basis: Matrix3<f64>,
    /// Rotation from ellipsoid axes to the frame the covariance was given in
    pub rotation: UnitQuaternion<f64>,
}

/// Build a rotation from a matrix, failing when it is not a proper rotation
///
/// Left-handed (determinant -1) or non-orthonormal matrices return `None`.
pub fn proper_rotation(m: &Matrix3<f64>) -> Option<Rotation3<f64>> {
    let orthonormal = (m.transpose() * m - Matrix3::identity()).norm() < ORTHONORMAL_TOLERANCE;
    if orthonormal && m.determinant() > 0.0 {
        Some(Rotation3::from_matrix_unchecked(*m))
    } else {
        None
    }
}

/// Diagonalize a 3x3 covariance block into semi-axes and a right-handed basis
pub fn diagonalize(covariance: &Matrix3<f64>) -> EllipsoidAxes {
    let symmetric = (covariance + covariance.transpose()) * 0.5;
    let eigen = symmetric.symmetric_eigen();
    let mut basis = eigen.eigenvectors;
    let mut values = eigen.eigenvalues;

    let rotation = match proper_rotation(&basis) {
        Some(rotation) => rotation,
        None => {
            log::trace!("Left-handed eigenbasis, swapping first two axes");
            basis.swap_columns(0, 1);
            values.swap_rows(0, 1);
            Rotation3::from_matrix_unchecked(basis)
        }
    };

    if values.iter().any(|v| *v < 0.0) {
        log::warn!("Covariance has negative eigenvalues {:?}, clamping to zero", values);
    }

    EllipsoidAxes {
        radii: values.map(|v| v.max(0.0).sqrt()),
        basis,
        rotation: UnitQuaternion::from_rotation_matrix(&rotation),
    }
}

/// Ellipsoid of one covariance sample, oriented in the inertial frame
///
/// `scale` multiplies the one-sigma semi-axes.
pub fn covariance_ellipsoid(
    state: &OrbitalState,
    covariance: &CovarianceSample,
    frame: LocalOrbitalFrame,
    scale: f64,
) -> Result<EllipsoidAxes> {
    let lof = frame.rotation(&state.epoch, &state.position, &state.velocity)?;
    let block = covariance.position_block();
    let local = lof.matrix().transpose() * block * lof.matrix();

    let axes = diagonalize(&local);
    Ok(EllipsoidAxes {
        radii: axes.radii * scale,
        rotation: UnitQuaternion::from_rotation_matrix(&lof) * axes.rotation,
        basis: axes.basis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Deterministic pseudo-random stream in [-1, 1)
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> f64 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((self.0 >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
        }

        fn vector(&mut self) -> Vector3<f64> {
            Vector3::new(self.next(), self.next(), self.next())
        }
    }

    fn random_psd(rng: &mut Lcg) -> Matrix3<f64> {
        let a = Matrix3::from_columns(&[rng.vector(), rng.vector(), rng.vector()]);
        a * a.transpose() * 1.0e4
    }

    #[test]
    fn test_basis_always_right_handed() {
        let mut rng = Lcg(42);
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        for _ in 0..200 {
            let cov = random_psd(&mut rng);
            let axis = rng.vector().try_normalize(1e-9).unwrap_or(Vector3::z());
            let r = Rotation3::from_axis_angle(&nalgebra::Unit::new_normalize(axis), rng.next() * 3.0);
            let rotated = r.matrix().transpose() * cov * r.matrix();

            let axes = diagonalize(&rotated);
            assert!((axes.basis.determinant() - 1.0).abs() < 1e-9);
            assert!(proper_rotation(&axes.basis).is_some());
            assert!(axes.radii.iter().all(|v| *v >= 0.0));

            let state = crate::state::OrbitalState::new(
                Vector3::new(7.0e6, 0.0, 0.0) + rng.vector() * 1.0e5,
                Vector3::new(0.0, 7.5e3, 0.0) + rng.vector() * 1.0e2,
                t,
            );
            let sample = CovarianceSample::from_position_block(t, cov);
            let full = covariance_ellipsoid(&state, &sample, LocalOrbitalFrame::Qsw, 1.0).unwrap();
            assert!((full.rotation.to_rotation_matrix().matrix().determinant() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_axes_reconstruct_covariance() {
        let mut rng = Lcg(7);
        for _ in 0..50 {
            let cov = random_psd(&mut rng);
            let axes = diagonalize(&cov);
            let d = Matrix3::from_diagonal(&axes.radii.map(|r| r * r));
            let rebuilt = axes.basis * d * axes.basis.transpose();
            assert!((rebuilt - cov).norm() / cov.norm() < 1e-9);
        }
    }

    #[test]
    fn test_left_handed_rejected() {
        let mirror = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, -1.0));
        assert!(proper_rotation(&mirror).is_none());
        assert!(proper_rotation(&Matrix3::identity()).is_some());
        assert!(proper_rotation(&(Matrix3::identity() * 2.0)).is_none());
    }

    #[test]
    fn test_diagonal_covariance_radii() {
        let cov = Matrix3::from_diagonal(&Vector3::new(4.0, 9.0, 16.0));
        let axes = diagonalize(&cov);
        let mut radii: Vec<f64> = axes.radii.iter().copied().collect();
        radii.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((radii[0] - 2.0).abs() < 1e-12);
        assert!((radii[1] - 3.0).abs() < 1e-12);
        assert!((radii[2] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_scale_and_frame() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        // Radial variance only, satellite on +y: ellipsoid long axis must be inertial y
        let state = OrbitalState::new(Vector3::new(0.0, 7.0e6, 0.0), Vector3::new(-7.5e3, 0.0, 0.0), t);
        let radial = Matrix3::from_diagonal(&Vector3::new(0.0, 100.0, 0.0));
        let sample = CovarianceSample::from_position_block(t, radial);

        let axes = covariance_ellipsoid(&state, &sample, LocalOrbitalFrame::Qsw, 3.0).unwrap();
        let (index, max) = axes.radii.argmax();
        assert!((max - 30.0).abs() < 1e-9);
        let mut unit = Vector3::zeros();
        unit[index] = 1.0;
        let direction = axes.rotation * unit;
        assert!((direction.y.abs() - 1.0).abs() < 1e-9);
    }
}
