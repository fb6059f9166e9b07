//! Projections onto the body surface

use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use super::body::{BodyShape, Geodetic};
use super::frames::inertial_to_fixed;

/// Sub-satellite point of an inertial position, on the surface (height zero)
pub fn ground_footprint(body: &BodyShape, instant: &DateTime<Utc>, inertial: &Vector3<f64>) -> Geodetic {
    let fixed = inertial_to_fixed(instant) * inertial;
    body.to_geodetic(&fixed).at_height(0.0)
}

/// Surface point hit by a pointing direction, in the body-fixed frame
///
/// Both position and direction are inertial. Returns `None` when the ray
/// misses the body.
pub fn project_pointing(
    body: &BodyShape,
    instant: &DateTime<Utc>,
    inertial_position: &Vector3<f64>,
    inertial_direction: &Vector3<f64>,
) -> Option<Vector3<f64>> {
    let rotation = inertial_to_fixed(instant);
    body.intersect_ray(&(rotation * inertial_position), &(rotation * inertial_direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_nadir_pointing_hits_footprint() {
        let earth = BodyShape::wgs84();
        let t = Utc.with_ymd_and_hms(2024, 9, 1, 6, 0, 0).unwrap();
        let position = Vector3::new(4.0e6, 3.0e6, 4.5e6);

        let footprint = ground_footprint(&earth, &t, &position);
        assert_eq!(footprint.height, 0.0);

        let hit = project_pointing(&earth, &t, &position, &(-position)).unwrap();
        let hit_geo = earth.to_geodetic(&hit);
        assert!(hit_geo.height.abs() < 1e-3);
        assert!((hit_geo.longitude - footprint.longitude).abs() < 1e-9);
        // geocentric nadir differs slightly from geodetic footprint latitude
        assert!((hit_geo.latitude - footprint.latitude).abs() < 0.01);
    }

    #[test]
    fn test_zenith_pointing_misses() {
        let earth = BodyShape::wgs84();
        let t = Utc.with_ymd_and_hms(2024, 9, 1, 6, 0, 0).unwrap();
        let position = Vector3::new(7.0e6, 0.0, 0.0);
        assert!(project_pointing(&earth, &t, &position, &position).is_none());
    }
}
