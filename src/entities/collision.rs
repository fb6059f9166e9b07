//! Close-approach display between two satellites

use super::{open_block, Entity, Satellite};
use crate::czml::{Color, CzmlStream, ReferenceFrame};
use crate::error::Result;
use crate::geometry::{close_approach_windows, CloseApproach};
use crate::properties::{Label, Point, Polyline, Position, Property, ShowIntervals};
use crate::reference::{entity_id, EntityKind};
use crate::time::{iso8601, TimeInterval};

pub const DEFAULT_COLLISION_THRESHOLD_M: f64 = 5_000.0;

/// Line between two satellites shown while they are closer than a threshold,
/// with a marker at the closest sampled approach
#[derive(Debug, Clone)]
pub struct CollisionDisplay {
    id: String,
    name: String,
    availability: TimeInterval,
    closest: Option<CloseApproach>,
    line: Polyline,
}

impl CollisionDisplay {
    /// Both satellites must be sampled at the same instants
    pub fn new(a: &Satellite, b: &Satellite, threshold: f64) -> Result<Self> {
        let (windows, closest) = close_approach_windows(a.states(), b.states(), threshold)?;
        let id = entity_id(EntityKind::Collision, &format!("{}/{}", a.id(), b.id()));

        let show = ShowIntervals::new(windows);
        if show.shown_seconds() > 0.0 {
            log::info!("{}: {:.0} s closer than {:.0} m", id, show.shown_seconds(), threshold);
        }
        if let Some(c) = &closest {
            log::debug!("{}: closest approach {:.1} m at {}", id, c.distance, iso8601(&c.epoch));
        }

        let line = Polyline::linking(&id, a.id(), b.id(), Color::RED, 2.0).with_show(show);
        let availability = a.interval().intersect(&b.interval()).unwrap_or(a.interval());

        Ok(Self {
            name: format!("{} / {}", a.name(), b.name()),
            id,
            availability,
            closest,
            line,
        })
    }

    pub fn closest_approach(&self) -> Option<&CloseApproach> {
        self.closest.as_ref()
    }
}

impl Entity for CollisionDisplay {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Collision
    }

    fn availability(&self) -> Option<TimeInterval> {
        Some(self.availability)
    }

    fn write_block(&self, stream: &mut CzmlStream) -> Result<()> {
        let mut packet = open_block(stream, &self.id, &self.name, Some(&self.availability));
        if let Some(closest) = &self.closest {
            Position::cartesian(closest.midpoint)
                .with_frame(ReferenceFrame::Inertial)
                .write(&mut packet)?;
            Point::new(Color::RED, 8.0).write(&mut packet)?;
            Label::new(format!(
                "{:.0} m at {}",
                closest.distance,
                iso8601(&closest.epoch)
            ))
            .with_color(Color::RED)
            .write(&mut packet)?;
        }
        self.line.write(&mut packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::fixtures::{circular_orbit, render, LEO_RADIUS};
    use crate::error::CzmlError;

    #[test]
    fn test_same_orbit_offset_radius() {
        let a = Satellite::builder("a", circular_orbit(LEO_RADIUS, 10, 60.0)).build().unwrap();
        let b = Satellite::builder("b", circular_orbit(LEO_RADIUS + 2_000.0, 10, 60.0))
            .build()
            .unwrap();
        let coll = CollisionDisplay::new(&a, &b, DEFAULT_COLLISION_THRESHOLD_M).unwrap();
        assert_eq!(coll.id(), "COLL/SAT/a/SAT/b");

        // Both start on +X; they drift apart as the inner one moves faster
        let closest = coll.closest_approach().unwrap();
        assert_eq!(closest.epoch, a.states()[0].epoch);
        assert!((closest.distance - 2_000.0).abs() < 1e-6);

        let p = &render(&coll)[0];
        assert_eq!(p["polyline"]["show"][0]["boolean"], true);
        assert_eq!(p["position"]["referenceFrame"], "INERTIAL");
        assert!(p["label"]["text"].as_str().unwrap().starts_with("2000 m"));
    }

    #[test]
    fn test_mismatched_sampling() {
        let a = Satellite::builder("a", circular_orbit(LEO_RADIUS, 10, 60.0)).build().unwrap();
        let b = Satellite::builder("b", circular_orbit(LEO_RADIUS, 5, 60.0)).build().unwrap();
        assert!(matches!(
            CollisionDisplay::new(&a, &b, 1000.0),
            Err(CzmlError::InvalidSamples(_))
        ));
    }
}
