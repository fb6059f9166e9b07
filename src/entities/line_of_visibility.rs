//! Station-to-satellite visibility lines

use super::{open_block, Entity, GroundStation, Satellite};
use crate::czml::{Color, CzmlStream};
use crate::error::{CzmlError, Result};
use crate::geometry::visibility_windows;
use crate::properties::{Polyline, Property, ShowIntervals};
use crate::reference::{entity_id, EntityKind};
use crate::time::TimeInterval;

/// Line between a station and a satellite, shown while the satellite is above
/// the station's minimum elevation
#[derive(Debug, Clone)]
pub struct LineOfVisibility {
    id: String,
    name: String,
    availability: TimeInterval,
    line: Polyline,
}

impl LineOfVisibility {
    pub fn builder<'a>(station: &'a GroundStation, satellite: &'a Satellite) -> LineOfVisibilityBuilder<'a> {
        LineOfVisibilityBuilder {
            station,
            satellite,
            min_elevation: 0.0,
            color: Color::GREEN,
            width: 1.0,
        }
    }

    /// Total time the line is shown, in seconds
    pub fn visible_seconds(&self) -> f64 {
        self.line.show().shown_seconds()
    }
}

pub struct LineOfVisibilityBuilder<'a> {
    station: &'a GroundStation,
    satellite: &'a Satellite,
    min_elevation: f64,
    color: Color,
    width: f64,
}

impl LineOfVisibilityBuilder<'_> {
    /// Minimum elevation in degrees
    pub fn min_elevation_deg(mut self, degrees: f64) -> Self {
        self.min_elevation = degrees.to_radians();
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn build(self) -> Result<LineOfVisibility> {
        let states = self.satellite.states();
        if states.is_empty() {
            return Err(CzmlError::InvalidSamples(format!(
                "{} has no samples left",
                self.satellite.id()
            )));
        }

        let windows = visibility_windows(
            self.station.body(),
            self.station.location(),
            states,
            self.min_elevation,
        );
        let id = entity_id(
            EntityKind::LineOfVisibility,
            &format!("{}/{}", self.station.id(), self.satellite.id()),
        );
        let line = Polyline::linking(
            &id,
            self.station.id(),
            self.satellite.id(),
            self.color,
            self.width,
        )
        .with_show(ShowIntervals::new(windows));
        log::debug!(
            "{}: {:.0} s of visibility",
            id,
            line.show().shown_seconds()
        );

        Ok(LineOfVisibility {
            name: format!("{} to {}", self.station.name(), self.satellite.name()),
            availability: TimeInterval {
                start: states[0].epoch,
                stop: states[states.len() - 1].epoch,
            },
            id,
            line,
        })
    }
}

impl Entity for LineOfVisibility {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::LineOfVisibility
    }

    fn availability(&self) -> Option<TimeInterval> {
        Some(self.availability)
    }

    fn write_block(&self, stream: &mut CzmlStream) -> Result<()> {
        let mut packet = open_block(stream, &self.id, &self.name, Some(&self.availability));
        self.line.write(&mut packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::fixtures::{circular_orbit, render, LEO_RADIUS};
    use crate::entities::GroundStationBuilder;
    use crate::geometry::Geodetic;

    #[test]
    fn test_visibility_line() {
        let sat = Satellite::builder("demo", circular_orbit(LEO_RADIUS, 100, 60.0))
            .build()
            .unwrap();
        let gs = GroundStationBuilder::new("equator", Geodetic::from_degrees(0.0, 0.0, 0.0))
            .build()
            .unwrap();
        let lov = LineOfVisibility::builder(&gs, &sat)
            .min_elevation_deg(5.0)
            .build()
            .unwrap();

        assert_eq!(lov.id(), "LOV/GS/equator/SAT/demo");
        let total = lov.availability().unwrap().duration_seconds();
        assert!(lov.visible_seconds() > 0.0);
        assert!(lov.visible_seconds() < total);

        let packets = render(&lov);
        let p = &packets[0]["polyline"];
        assert_eq!(p["positions"]["references"][0], "GS/equator#position");
        assert_eq!(p["positions"]["references"][1], "SAT/demo#position");
        assert!(p["show"].as_array().unwrap().len() >= 2);
    }
}
