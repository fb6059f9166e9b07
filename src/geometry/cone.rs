//! Visibility cone sizing

use nalgebra::{UnitQuaternion, Vector3};

use super::body::BodyShape;

/// Cone dimensions as a cylinder with a zero bottom radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    pub length: f64,
    pub top_radius: f64,
    pub bottom_radius: f64,
}

impl Cone {
    /// Cone of the given length and half-aperture angle (radians), apex at the bottom
    pub fn with_aperture(length: f64, aperture: f64) -> Self {
        Self {
            length,
            top_radius: length * aperture.tan(),
            bottom_radius: 0.0,
        }
    }

    /// Center of the cylinder when the apex sits at `apex` and opens along `axis`
    pub fn center(&self, apex: &Vector3<f64>, axis: &Vector3<f64>) -> Vector3<f64> {
        apex + axis.normalize() * (self.length / 2.0)
    }
}

/// Default cone length: half the observed semi-major axis, or the body's
/// equatorial radius when no orbit is involved
pub fn default_cone_length(observed_semi_major_axis: Option<f64>, body: &BodyShape) -> f64 {
    match observed_semi_major_axis {
        Some(a) if a > 0.0 => a / 2.0,
        _ => body.equatorial_radius,
    }
}

/// Rotation taking the cylinder's +Z axis onto `axis`
pub fn axis_orientation(axis: &Vector3<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::rotation_between(&Vector3::z(), axis).unwrap_or_else(|| {
        // Anti-parallel: any half turn about an axis orthogonal to Z
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI)
    })
}
