//! Sub-satellite point and its trace

use super::{open_block, Entity, Satellite};
use crate::czml::{Color, CzmlStream, Interpolation, ReferenceFrame};
use crate::error::{CzmlError, Result};
use crate::geometry::{ground_footprint, BodyShape, Geodetic};
use crate::properties::{Path, Point, Position, PositionValue, Property};
use crate::reference::{entity_id, EntityKind};
use crate::time::TimeInterval;

/// Footprint of a satellite on the body surface
///
/// Written as body-fixed cartesian points so interpolation does not wrap
/// across the antimeridian.
#[derive(Debug, Clone)]
pub struct GroundTrack {
    id: String,
    name: String,
    availability: TimeInterval,
    footprints: Vec<Geodetic>,
    position: Option<Position>,
    path: Path,
    marker: Point,
}

impl GroundTrack {
    pub fn new(satellite: &Satellite, body: &BodyShape) -> Result<Self> {
        Self::with_style(satellite, body, satellite.color(), None)
    }

    /// `trail_time` limits the drawn trace to the last seconds before the current point
    pub fn with_style(
        satellite: &Satellite,
        body: &BodyShape,
        color: Color,
        trail_time: Option<f64>,
    ) -> Result<Self> {
        let states = satellite.states();
        if states.is_empty() {
            return Err(CzmlError::InvalidSamples(format!(
                "{} has no samples left",
                satellite.id()
            )));
        }

        let instants: Vec<_> = states.iter().map(|s| s.epoch).collect();
        let footprints: Vec<_> = states
            .iter()
            .map(|s| ground_footprint(body, &s.epoch, &s.position))
            .collect();
        let values = footprints
            .iter()
            .map(|g| PositionValue::Cartesian(body.to_cartesian(g)))
            .collect();

        let availability = TimeInterval {
            start: instants[0],
            stop: instants[instants.len() - 1],
        };
        let mut path = Path::new(availability, color).with_width(2.0);
        if let Some(trail) = trail_time {
            path = path.with_window(0.0, trail);
        }

        Ok(Self {
            id: entity_id(EntityKind::GroundTrack, satellite.id()),
            name: format!("{} ground track", satellite.name()),
            availability,
            footprints,
            position: Some(
                Position::sampled(instants, values, Interpolation::lagrange(3))?
                    .with_frame(ReferenceFrame::Fixed),
            ),
            path,
            marker: Point::new(color, 4.0),
        })
    }

    pub fn footprints(&self) -> &[Geodetic] {
        &self.footprints
    }
}

impl Entity for GroundTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::GroundTrack
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
        self.path.write(&mut packet)
    }

    fn release(&mut self) {
        self.footprints = Vec::new();
        self.position = None;
    }
}
