//! Central and third body shapes

use nalgebra::Vector3;

use super::{open_block, Entity};
use crate::czml::{Color, CzmlStream, Interpolation, ReferenceFrame};
use crate::error::Result;
use crate::geometry::BodyShape;
use crate::properties::{Ellipsoid, Label, Position, Property};
use crate::reference::{entity_id, EntityKind};
use crate::state::OrbitalState;
use crate::time::TimeInterval;

/// Spheroid drawn at a body's position
#[derive(Debug, Clone)]
pub struct BodyDisplay {
    id: String,
    shape: BodyShape,
    availability: Option<TimeInterval>,
    position: Option<Position>,
    ellipsoid: Ellipsoid,
}

impl BodyDisplay {
    /// Body at the frame origin, e.g. the central body outline
    pub fn central(shape: BodyShape, color: Color) -> Self {
        let origin = Position::cartesian(Vector3::zeros()).with_frame(ReferenceFrame::Fixed);
        Self::with_position(shape, color, origin, None)
    }

    /// Body moving along sampled inertial states, e.g. the Moon
    pub fn orbiting(shape: BodyShape, color: Color, states: &[OrbitalState]) -> Result<Self> {
        let position = Position::from_states(states, false, Interpolation::default())?;
        let availability = position.interval();
        Ok(Self::with_position(shape, color, position, availability))
    }

    fn with_position(
        shape: BodyShape,
        color: Color,
        position: Position,
        availability: Option<TimeInterval>,
    ) -> Self {
        let radii = Vector3::new(shape.equatorial_radius, shape.equatorial_radius, shape.polar_radius());
        Self {
            id: entity_id(EntityKind::Body, &shape.name),
            availability,
            position: Some(position),
            ellipsoid: Ellipsoid::new(radii)
                .with_color(color)
                .with_outline(false, color)
                .with_partitions(32, 64, 128),
            shape,
        }
    }

    pub fn shape(&self) -> &BodyShape {
        &self.shape
    }
}

impl Entity for BodyDisplay {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.shape.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Body
    }

    fn availability(&self) -> Option<TimeInterval> {
        self.availability
    }

    fn write_block(&self, stream: &mut CzmlStream) -> Result<()> {
        let mut packet = open_block(stream, &self.id, &self.shape.name, self.availability.as_ref());
        if let Some(position) = &self.position {
            position.write(&mut packet)?;
        }
        self.ellipsoid.write(&mut packet)?;
        Label::new(self.shape.name.clone()).write(&mut packet)
    }

    fn release(&mut self) {
        self.position = None;
    }
}
