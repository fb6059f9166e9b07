//! Axis triad attached to a satellite

use nalgebra::{Matrix3, Vector3};

use super::{open_block, Entity};
use crate::czml::{Color, CzmlStream, Interpolation, ReferenceFrame};
use crate::error::{CzmlError, Result};
use crate::geometry::LocalOrbitalFrame;
use crate::properties::{Polyline, Position, PositionValue, Property};
use crate::reference::{entity_id, EntityKind};
use crate::state::{Attitude, OrbitalState};
use crate::time::TimeInterval;

pub const DEFAULT_AXIS_LENGTH: f64 = 500_000.0;

const AXES: [(&str, Color); 3] = [("X", Color::RED), ("Y", Color::GREEN), ("Z", Color::BLUE)];

/// Where the triad's axes come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSource {
    /// Spacecraft body axes from its attitude
    Body,
    /// Local orbital frame axes
    Orbital(LocalOrbitalFrame),
}

/// Three arrows from a satellite's position along its frame axes
///
/// Each axis is its own packet: the arrow tip is a sampled position and the
/// arrow itself references the satellite's live position.
#[derive(Debug, Clone)]
pub struct ReferenceSystem {
    id: String,
    name: String,
    owner: String,
    availability: TimeInterval,
    tips: Vec<Position>,
}

impl ReferenceSystem {
    /// Triad following `owner` (a satellite id)
    ///
    /// Body axes need one attitude per state, at the same instants.
    pub fn new(
        owner: &str,
        states: &[OrbitalState],
        attitudes: &[Attitude],
        source: AxisSource,
        axis_length: f64,
        interpolation: Interpolation,
    ) -> Result<Self> {
        let first = states
            .first()
            .ok_or_else(|| CzmlError::InvalidSamples(format!("no states for {}", owner)))?;
        let last = &states[states.len() - 1];

        if source == AxisSource::Body && attitudes.len() != states.len() {
            return Err(CzmlError::WrongAttitudeVariant(
                "body axes need one attitude per state",
            ));
        }

        let frames = states
            .iter()
            .enumerate()
            .map(|(i, state)| -> Result<Matrix3<f64>> {
                match source {
                    AxisSource::Body => Ok(*attitudes[i].rotation.to_rotation_matrix().matrix()),
                    AxisSource::Orbital(lof) => Ok(*lof
                        .rotation(&state.epoch, &state.position, &state.velocity)?
                        .matrix()),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let instants: Vec<_> = states.iter().map(|s| s.epoch).collect();
        let mut tips = Vec::with_capacity(3);
        for axis in 0..3 {
            let values = states
                .iter()
                .zip(&frames)
                .map(|(s, m)| {
                    let direction: Vector3<f64> = m.column(axis).into_owned();
                    PositionValue::Cartesian(s.position + direction * axis_length)
                })
                .collect();
            tips.push(
                Position::sampled(instants.clone(), values, interpolation)?
                    .with_frame(ReferenceFrame::Inertial),
            );
        }

        Ok(Self {
            id: entity_id(EntityKind::ReferenceSystem, owner),
            name: format!("{} axes", owner),
            owner: owner.to_string(),
            availability: TimeInterval {
                start: first.epoch,
                stop: last.epoch,
            },
            tips,
        })
    }

    pub fn axis_id(&self, axis: &str) -> String {
        format!("{}/{}", self.id, axis)
    }
}

impl Entity for ReferenceSystem {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::ReferenceSystem
    }

    fn availability(&self) -> Option<TimeInterval> {
        Some(self.availability)
    }

    fn write_block(&self, stream: &mut CzmlStream) -> Result<()> {
        for ((axis, color), tip) in AXES.iter().zip(&self.tips) {
            let id = self.axis_id(axis);
            let arrow = Polyline::linking(&id, &self.owner, &id, *color, 3.0);
            let name = format!("{} {}", self.name, axis);
            let mut packet = open_block(stream, &id, &name, Some(&self.availability));
            tip.write(&mut packet)?;
            arrow.write(&mut packet)?;
        }
        Ok(())
    }

    fn release(&mut self) {
        self.tips.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::fixtures::{circular_orbit, render, LEO_RADIUS};

    #[test]
    fn test_orbital_triad_packets() {
        let states = circular_orbit(LEO_RADIUS, 5, 60.0);
        let triad = ReferenceSystem::new(
            "SAT/demo",
            &states,
            &[],
            AxisSource::Orbital(LocalOrbitalFrame::Qsw),
            1000.0,
            Interpolation::default(),
        )
        .unwrap();
        assert_eq!(triad.id(), "REF/SAT/demo");

        let packets = render(&triad);
        assert_eq!(packets.len(), 3);
        assert_eq!(packets[0]["id"], "REF/SAT/demo/X");
        assert_eq!(packets[2]["id"], "REF/SAT/demo/Z");
        assert_eq!(
            packets[0]["polyline"]["positions"]["references"][0],
            "SAT/demo#position"
        );
        assert_eq!(
            packets[0]["polyline"]["positions"]["references"][1],
            "REF/SAT/demo/X#position"
        );

        // Radial axis tip of the first sample sits 1 km above the satellite
        let x = packets[0]["position"]["cartesian"].as_array().unwrap();
        assert!((x[1].as_f64().unwrap() - (LEO_RADIUS + 1000.0)).abs() < 1e-6);
    }

    #[test]
    fn test_body_axes_need_attitudes() {
        let states = circular_orbit(LEO_RADIUS, 3, 60.0);
        let result = ReferenceSystem::new(
            "SAT/demo",
            &states,
            &[],
            AxisSource::Body,
            1000.0,
            Interpolation::default(),
        );
        assert!(matches!(result, Err(CzmlError::WrongAttitudeVariant(_))));
    }

    #[test]
    fn test_release_keeps_identity() {
        let states = circular_orbit(LEO_RADIUS, 3, 60.0);
        let mut triad = ReferenceSystem::new(
            "SAT/demo",
            &states,
            &[],
            AxisSource::Orbital(LocalOrbitalFrame::Tnw),
            1000.0,
            Interpolation::default(),
        )
        .unwrap();
        triad.release();
        assert_eq!(triad.id(), "REF/SAT/demo");
        assert!(render(&triad).is_empty());
    }
}
