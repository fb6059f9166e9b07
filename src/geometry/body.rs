//! Oblate spheroid body model

use nalgebra::Vector3;
use serde::Deserialize;

use crate::state::{EARTH_EQUATORIAL_RADIUS_M, EARTH_FLATTENING};

/// Geodetic coordinates (radians, meters)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
}

impl Geodetic {
    pub fn from_radians(longitude: f64, latitude: f64, height: f64) -> Self {
        Self {
            longitude,
            latitude,
            height,
        }
    }

    pub fn from_degrees(longitude_deg: f64, latitude_deg: f64, height: f64) -> Self {
        Self::from_radians(longitude_deg.to_radians(), latitude_deg.to_radians(), height)
    }

    /// Same horizontal location at a different height
    pub fn at_height(&self, height: f64) -> Self {
        Self { height, ..*self }
    }
}

/// Body shape parameters: equatorial radius and flattening
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BodyShape {
    pub name: String,
    pub equatorial_radius: f64,
    pub flattening: f64,
}

impl Default for BodyShape {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl BodyShape {
    pub fn new(name: impl Into<String>, equatorial_radius: f64, flattening: f64) -> Self {
        Self {
            name: name.into(),
            equatorial_radius,
            flattening,
        }
    }

    pub fn wgs84() -> Self {
        Self::new("Earth", EARTH_EQUATORIAL_RADIUS_M, EARTH_FLATTENING)
    }

    pub fn moon() -> Self {
        Self::new("Moon", 1_738_100.0, 0.0012)
    }

    pub fn polar_radius(&self) -> f64 {
        self.equatorial_radius * (1.0 - self.flattening)
    }

    /// First eccentricity squared
    fn e2(&self) -> f64 {
        self.flattening * (2.0 - self.flattening)
    }

    /// Body-fixed cartesian position of a geodetic point
    pub fn to_cartesian(&self, point: &Geodetic) -> Vector3<f64> {
        let (sin_lat, cos_lat) = point.latitude.sin_cos();
        let (sin_lon, cos_lon) = point.longitude.sin_cos();
        let e2 = self.e2();
        let n = self.equatorial_radius / (1.0 - e2 * sin_lat * sin_lat).sqrt();

        Vector3::new(
            (n + point.height) * cos_lat * cos_lon,
            (n + point.height) * cos_lat * sin_lon,
            (n * (1.0 - e2) + point.height) * sin_lat,
        )
    }

    /// Geodetic coordinates of a body-fixed cartesian position
    pub fn to_geodetic(&self, position: &Vector3<f64>) -> Geodetic {
        let a = self.equatorial_radius;
        let e2 = self.e2();
        let p = position.x.hypot(position.y);
        let longitude = position.y.atan2(position.x);

        if p < 1e-9 {
            let latitude = std::f64::consts::FRAC_PI_2.copysign(position.z);
            return Geodetic::from_radians(longitude, latitude, position.z.abs() - self.polar_radius());
        }

        let mut latitude = position.z.atan2(p * (1.0 - e2));
        for _ in 0..8 {
            let sin_lat = latitude.sin();
            let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
            latitude = (position.z + e2 * n * sin_lat).atan2(p);
        }

        let (sin_lat, cos_lat) = latitude.sin_cos();
        let height = p * cos_lat + position.z * sin_lat - a * (1.0 - e2 * sin_lat * sin_lat).sqrt();
        Geodetic::from_radians(longitude, latitude, height)
    }

    /// Outward surface normal (local vertical) at a geodetic point
    pub fn local_up(&self, point: &Geodetic) -> Vector3<f64> {
        let (sin_lat, cos_lat) = point.latitude.sin_cos();
        let (sin_lon, cos_lon) = point.longitude.sin_cos();
        Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    /// First intersection of a ray with the surface, if the ray hits it
    pub fn intersect_ray(&self, origin: &Vector3<f64>, direction: &Vector3<f64>) -> Option<Vector3<f64>> {
        // Stretch z so the spheroid becomes a sphere of equatorial radius
        let k = self.equatorial_radius / self.polar_radius();
        let o = Vector3::new(origin.x, origin.y, origin.z * k);
        let d = Vector3::new(direction.x, direction.y, direction.z * k);

        let a = d.dot(&d);
        if a <= 0.0 {
            return None;
        }
        let b = 2.0 * o.dot(&d);
        let c = o.dot(&o) - self.equatorial_radius * self.equatorial_radius;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }

        let t = (-b - disc.sqrt()) / (2.0 * a);
        if t < 0.0 {
            return None;
        }
        Some(origin + direction * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geodetic_round_trip_points() {
        let earth = BodyShape::wgs84();
        for (lon, lat, h) in [(0.0, 0.0, 0.0), (20.2, 67.9, 400.0), (-122.0, -45.0, 35_786_000.0)] {
            let geo = Geodetic::from_degrees(lon, lat, h);
            let back = earth.to_geodetic(&earth.to_cartesian(&geo));
            assert!((back.longitude - geo.longitude).abs() < 1e-9);
            assert!((back.latitude - geo.latitude).abs() < 1e-9);
            assert!((back.height - h).abs() < 1e-3);
        }
    }

    #[test]
    fn test_equator_point() {
        let earth = BodyShape::wgs84();
        let p = earth.to_cartesian(&Geodetic::from_degrees(0.0, 0.0, 0.0));
        assert!((p.x - EARTH_EQUATORIAL_RADIUS_M).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6 && p.z.abs() < 1e-6);
    }

    #[test]
    fn test_pole() {
        let earth = BodyShape::wgs84();
        let geo = earth.to_geodetic(&Vector3::new(0.0, 0.0, earth.polar_radius() + 100.0));
        assert!((geo.latitude - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((geo.height - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_ray_hits_and_misses() {
        let earth = BodyShape::wgs84();
        let origin = Vector3::new(7_000_000.0, 0.0, 0.0);

        let hit = earth.intersect_ray(&origin, &Vector3::new(-1.0, 0.0, 0.0)).unwrap();
        assert!((hit.x - EARTH_EQUATORIAL_RADIUS_M).abs() < 1e-6);

        assert!(earth.intersect_ray(&origin, &Vector3::new(1.0, 0.0, 0.0)).is_none());
        assert!(earth.intersect_ray(&origin, &Vector3::new(0.0, 1.0, 0.0)).is_none());
    }
}
