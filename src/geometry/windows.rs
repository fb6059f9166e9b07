//! Boolean show windows derived from sampled geometry

use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use super::body::{BodyShape, Geodetic};
use super::frames::to_fixed;
use crate::error::{CzmlError, Result};
use crate::state::OrbitalState;
use crate::time::{iso8601, TimeInterval};

/// Collapse per-sample flags into contiguous `(interval, flag)` runs
///
/// Each run ends at the first instant of the next run, so the windows tile the
/// whole sampled span without gaps.
pub fn boolean_windows(instants: &[DateTime<Utc>], flags: &[bool]) -> Vec<(TimeInterval, bool)> {
    let n = instants.len().min(flags.len());
    let mut windows = Vec::new();
    if n == 0 {
        return windows;
    }

    let mut run_start = 0;
    for i in 1..n {
        if flags[i] != flags[run_start] {
            windows.push((
                TimeInterval {
                    start: instants[run_start],
                    stop: instants[i],
                },
                flags[run_start],
            ));
            run_start = i;
        }
    }
    windows.push((
        TimeInterval {
            start: instants[run_start],
            stop: instants[n - 1],
        },
        flags[run_start],
    ));
    windows
}

/// Elevation (radians) of a target above a station's local horizon
pub fn elevation(station: &Vector3<f64>, up: &Vector3<f64>, target: &Vector3<f64>) -> f64 {
    let line = target - station;
    let range = line.norm();
    if range <= 0.0 {
        return std::f64::consts::FRAC_PI_2;
    }
    (line.dot(up) / range).clamp(-1.0, 1.0).asin()
}

/// Windows where a satellite is above `min_elevation` as seen from a station
pub fn visibility_windows(
    body: &BodyShape,
    station: &Geodetic,
    states: &[OrbitalState],
    min_elevation: f64,
) -> Vec<(TimeInterval, bool)> {
    let station_fixed = body.to_cartesian(station);
    let up = body.local_up(station);

    let instants: Vec<_> = states.iter().map(|s| s.epoch).collect();
    let flags: Vec<_> = states
        .iter()
        .map(|s| {
            let target = to_fixed(&s.epoch, &s.position);
            elevation(&station_fixed, &up, &target) >= min_elevation
        })
        .collect();

    boolean_windows(&instants, &flags)
}

/// Closest sampled approach between two objects
#[derive(Debug, Clone, PartialEq)]
pub struct CloseApproach {
    pub epoch: DateTime<Utc>,
    /// Separation in meters
    pub distance: f64,
    /// Relative speed in m/s
    pub relative_speed: f64,
    /// Midpoint of the two positions (inertial)
    pub midpoint: Vector3<f64>,
}

/// Windows where two objects are closer than `threshold` meters, plus the closest approach
///
/// Both lists must be sampled at the same instants.
pub fn close_approach_windows(
    a: &[OrbitalState],
    b: &[OrbitalState],
    threshold: f64,
) -> Result<(Vec<(TimeInterval, bool)>, Option<CloseApproach>)> {
    if a.len() != b.len() {
        return Err(CzmlError::InvalidSamples(format!(
            "close approach needs matching sample lists, got {} and {}",
            a.len(),
            b.len()
        )));
    }

    let mut instants = Vec::with_capacity(a.len());
    let mut flags = Vec::with_capacity(a.len());
    let mut closest: Option<CloseApproach> = None;

    for (sa, sb) in a.iter().zip(b) {
        if sa.epoch != sb.epoch {
            return Err(CzmlError::InvalidSamples(format!(
                "sample instants differ: {} vs {}",
                iso8601(&sa.epoch),
                iso8601(&sb.epoch)
            )));
        }

        let distance = (sa.position - sb.position).norm();
        instants.push(sa.epoch);
        flags.push(distance < threshold);

        if closest.as_ref().map_or(true, |c| distance < c.distance) {
            closest = Some(CloseApproach {
                epoch: sa.epoch,
                distance,
                relative_speed: (sa.velocity - sb.velocity).norm(),
                midpoint: (sa.position + sb.position) * 0.5,
            });
        }
    }

    Ok((boolean_windows(&instants, &flags), closest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::offset_seconds;
    use chrono::TimeZone;

    fn t(i: usize) -> DateTime<Utc> {
        let t0 = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        offset_seconds(&t0, i as f64 * 10.0)
    }

    #[test]
    fn test_boolean_windows_tile_span() {
        let instants: Vec<_> = (0..6).map(t).collect();
        let flags = [false, true, true, false, false, true];
        let windows = boolean_windows(&instants, &flags);

        let shown: Vec<bool> = windows.iter().map(|w| w.1).collect();
        assert_eq!(shown, vec![false, true, false, true]);
        assert_eq!(windows[0].0.start, t(0));
        assert_eq!(windows[1].0.start, t(1));
        assert_eq!(windows[1].0.stop, t(3));
        assert_eq!(windows[3].0.stop, t(5));
    }

    #[test]
    fn test_single_run() {
        let instants: Vec<_> = (0..3).map(t).collect();
        let windows = boolean_windows(&instants, &[true, true, true]);
        assert_eq!(windows.len(), 1);
        assert!(boolean_windows(&[], &[]).is_empty());
    }

    #[test]
    fn test_elevation() {
        let station = Vector3::new(6.4e6, 0.0, 0.0);
        let up = Vector3::x();
        let zenith = elevation(&station, &up, &Vector3::new(7.0e6, 0.0, 0.0));
        assert!((zenith - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        let below = elevation(&station, &up, &Vector3::new(0.0, 7.0e6, 0.0));
        assert!(below < 0.0);
    }

    #[test]
    fn test_close_approach() {
        let a: Vec<_> = (0..5)
            .map(|i| OrbitalState::new(Vector3::new(7.0e6, 0.0, 0.0), Vector3::zeros(), t(i)))
            .collect();
        let gaps = [5000.0, 800.0, 200.0, 900.0, 4000.0];
        let b: Vec<_> = (0..5)
            .map(|i| {
                OrbitalState::new(
                    Vector3::new(7.0e6, gaps[i], 0.0),
                    Vector3::new(0.0, 10.0, 0.0),
                    t(i),
                )
            })
            .collect();

        let (windows, closest) = close_approach_windows(&a, &b, 1000.0).unwrap();
        let closest = closest.unwrap();
        assert_eq!(closest.epoch, t(2));
        assert!((closest.distance - 200.0).abs() < 1e-9);
        assert!((closest.relative_speed - 10.0).abs() < 1e-12);
        assert_eq!(windows.iter().filter(|w| w.1).count(), 1);

        assert!(close_approach_windows(&a, &b[..3], 1000.0).is_err());
    }
}
