//! Boresight trace on the body surface

use nalgebra::Vector3;

use super::{open_block, Entity, Satellite};
use crate::czml::{Color, CzmlStream, Interpolation, ReferenceFrame};
use crate::error::{CzmlError, Result};
use crate::geometry::{boolean_windows, project_pointing, BodyShape};
use crate::properties::{Path, Point, Polyline, Position, PositionValue, Property, ShowIntervals};
use crate::reference::{entity_id, EntityKind};
use crate::time::TimeInterval;

/// Builder for [`AttitudePointing`]
pub struct AttitudePointingBuilder<'a> {
    satellite: &'a Satellite,
    body: BodyShape,
    boresight: Vector3<f64>,
    color: Color,
    trail_time: Option<f64>,
}

impl AttitudePointingBuilder<'_> {
    /// Pointing axis in body coordinates
    pub fn boresight(mut self, axis: Vector3<f64>) -> Self {
        self.boresight = axis;
        self
    }

    pub fn body(mut self, body: BodyShape) -> Self {
        self.body = body;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Seconds of trace kept behind the current point
    pub fn trail_time(mut self, seconds: f64) -> Self {
        self.trail_time = Some(seconds);
        self
    }

    pub fn build(self) -> Result<AttitudePointing> {
        let sat = self.satellite;
        let states = sat.states();
        let attitudes = sat.attitudes();
        if states.is_empty() || attitudes.len() != states.len() {
            return Err(CzmlError::WrongAttitudeVariant(
                "pointing trace needs one attitude per state",
            ));
        }

        let mut hit_instants = Vec::new();
        let mut hits = Vec::new();
        let mut flags = Vec::with_capacity(states.len());
        for (state, attitude) in states.iter().zip(attitudes) {
            let direction = attitude.body_axis(&self.boresight);
            match project_pointing(&self.body, &state.epoch, &state.position, &direction) {
                Some(point) => {
                    hit_instants.push(state.epoch);
                    hits.push(PositionValue::Cartesian(point));
                    flags.push(true);
                }
                None => flags.push(false),
            }
        }

        let missed = flags.iter().filter(|f| !**f).count();
        if hits.is_empty() {
            return Err(CzmlError::InvalidSamples(format!(
                "{} boresight never intersects {}",
                sat.id(),
                self.body.name
            )));
        }
        if missed > 0 {
            log::warn!("{}: boresight misses {} in {} samples", sat.id(), self.body.name, missed);
        }

        let instants: Vec<_> = states.iter().map(|s| s.epoch).collect();
        let availability = TimeInterval {
            start: instants[0],
            stop: instants[instants.len() - 1],
        };
        let id = entity_id(EntityKind::AttitudePointing, sat.id());
        let mut path = Path::new(availability, self.color);
        if let Some(trail) = self.trail_time {
            path = path.with_window(0.0, trail);
        }

        Ok(AttitudePointing {
            name: format!("{} pointing", sat.name()),
            availability,
            position: Some(
                Position::sampled(hit_instants, hits, Interpolation::linear())?
                    .with_frame(ReferenceFrame::Fixed),
            ),
            line: Polyline::linking(&id, sat.id(), &id, self.color, 1.0)
                .with_show(ShowIntervals::new(boolean_windows(&instants, &flags))),
            path,
            marker: Point::new(self.color, 5.0),
            id,
        })
    }
}

/// Surface point hit by a satellite's boresight, with its trace and line of sight
#[derive(Debug, Clone)]
pub struct AttitudePointing {
    id: String,
    name: String,
    availability: TimeInterval,
    position: Option<Position>,
    line: Polyline,
    path: Path,
    marker: Point,
}

impl AttitudePointing {
    pub fn builder(satellite: &Satellite) -> AttitudePointingBuilder<'_> {
        AttitudePointingBuilder {
            satellite,
            body: BodyShape::wgs84(),
            boresight: Vector3::z(),
            color: Color::MAGENTA,
            trail_time: None,
        }
    }
}

impl Entity for AttitudePointing {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::AttitudePointing
    }

    fn availability(&self) -> Option<TimeInterval> {
        Some(self.availability)
    }

    fn write_block(&self, stream: &mut CzmlStream) -> Result<()> {
        let mut packet = open_block(stream, &self.id, &self.name, Some(&self.availability));
        if let Some(position) = &self.position {
            position.write(&mut packet)?;
        }
        self.marker.write(&mut packet)?;
        self.path.write(&mut packet)?;
        self.line.write(&mut packet)
    }

    fn release(&mut self) {
        self.position = None;
    }
}
