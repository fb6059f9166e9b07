//! Visibility cones of stations and satellites

use super::{open_block, Entity, GroundStation, Satellite};
use crate::czml::{Color, CzmlStream, Interpolation, ReferenceFrame};
use crate::error::{CzmlError, Result};
use crate::geometry::{axis_orientation, default_cone_length, inertial_to_fixed, BodyShape, Cone};
use crate::properties::{Cylinder, Orientation, Position, PositionValue, Property};
use crate::reference::{entity_id, EntityKind};
use crate::time::TimeInterval;

pub const DEFAULT_APERTURE_DEG: f64 = 30.0;

enum Observer<'a> {
    Station(&'a GroundStation),
    Satellite(&'a Satellite, BodyShape),
}

/// Builder for [`FieldOfObservation`]
pub struct FieldOfObservationBuilder<'a> {
    observer: Observer<'a>,
    target: Option<&'a Satellite>,
    aperture: f64,
    length: Option<f64>,
    color: Color,
}

impl<'a> FieldOfObservationBuilder<'a> {
    fn new(observer: Observer<'a>) -> Self {
        Self {
            observer,
            target: None,
            aperture: DEFAULT_APERTURE_DEG.to_radians(),
            length: None,
            color: Color::CYAN.with_alpha(60),
        }
    }

    /// Half-aperture angle in degrees
    pub fn aperture_deg(mut self, degrees: f64) -> Self {
        self.aperture = degrees.to_radians();
        self
    }

    /// Satellite whose orbit sizes a station cone
    pub fn observing(mut self, target: &'a Satellite) -> Self {
        self.target = Some(target);
        self
    }

    /// Explicit cone length in meters
    pub fn length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn build(self) -> Result<FieldOfObservation> {
        if !(self.aperture > 0.0 && self.aperture < std::f64::consts::FRAC_PI_2) {
            return Err(CzmlError::InvalidAperture {
                degrees: self.aperture.to_degrees(),
            });
        }

        match self.observer {
            Observer::Station(station) => {
                let length = self.length.unwrap_or_else(|| {
                    default_cone_length(self.target.map(|t| t.semi_major_axis()), station.body())
                });
                let cone = Cone::with_aperture(length, self.aperture);
                let apex = station.body().to_cartesian(station.location());
                let up = station.body().local_up(station.location());

                Ok(FieldOfObservation {
                    id: entity_id(EntityKind::FieldOfObservation, station.id()),
                    name: format!("{} field of view", station.name()),
                    availability: None,
                    position: Some(
                        Position::cartesian(cone.center(&apex, &up)).with_frame(ReferenceFrame::Fixed),
                    ),
                    orientation: Some(Orientation::constant(axis_orientation(&up))),
                    cylinder: Cylinder::cone(cone).with_color(self.color),
                })
            }
            Observer::Satellite(satellite, body) => {
                let states = satellite.states();
                let first = states.first().ok_or_else(|| {
                    CzmlError::InvalidSamples(format!("{} has no samples left", satellite.id()))
                })?;
                let length = self
                    .length
                    .unwrap_or_else(|| default_cone_length(Some(satellite.semi_major_axis()), &body));
                let cone = Cone::with_aperture(length, self.aperture);

                let instants: Vec<_> = states.iter().map(|s| s.epoch).collect();
                let mut centers = Vec::with_capacity(states.len());
                let mut rotations = Vec::with_capacity(states.len());
                for state in states {
                    // Cone opens from the satellite towards the body center
                    let nadir = -state.position;
                    centers.push(PositionValue::Cartesian(cone.center(&state.position, &nadir)));
                    rotations.push(inertial_to_fixed(&state.epoch) * axis_orientation(&nadir));
                }

                Ok(FieldOfObservation {
                    id: entity_id(EntityKind::FieldOfObservation, satellite.id()),
                    name: format!("{} field of view", satellite.name()),
                    availability: Some(TimeInterval {
                        start: first.epoch,
                        stop: states[states.len() - 1].epoch,
                    }),
                    position: Some(
                        Position::sampled(instants.clone(), centers, Interpolation::default())?
                            .with_frame(ReferenceFrame::Inertial),
                    ),
                    orientation: Some(Orientation::sampled(instants, rotations, Interpolation::linear())?),
                    cylinder: Cylinder::cone(cone).with_color(self.color),
                })
            }
        }
    }
}

/// Cone anchored at a station (pointing up) or a satellite (pointing down)
#[derive(Debug, Clone)]
pub struct FieldOfObservation {
    id: String,
    name: String,
    availability: Option<TimeInterval>,
    position: Option<Position>,
    orientation: Option<Orientation>,
    cylinder: Cylinder,
}

impl FieldOfObservation {
    pub fn station(station: &GroundStation) -> FieldOfObservationBuilder<'_> {
        FieldOfObservationBuilder::new(Observer::Station(station))
    }

    pub fn satellite(satellite: &Satellite, body: BodyShape) -> FieldOfObservationBuilder<'_> {
        FieldOfObservationBuilder::new(Observer::Satellite(satellite, body))
    }
}

impl Entity for FieldOfObservation {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::FieldOfObservation
    }

    fn availability(&self) -> Option<TimeInterval> {
        self.availability
    }

    fn write_block(&self, stream: &mut CzmlStream) -> Result<()> {
        let mut packet = open_block(stream, &self.id, &self.name, self.availability.as_ref());
        if let Some(position) = &self.position {
            position.write(&mut packet)?;
        }
        if let Some(orientation) = &self.orientation {
            orientation.write(&mut packet)?;
        }
        self.cylinder.write(&mut packet)
    }

    fn release(&mut self) {
        self.position = None;
        self.orientation = None;
    }
}
