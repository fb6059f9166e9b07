//! Position property

use std::str::FromStr;

use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use super::{Property, Sampled};
use crate::czml::{CzmlValue, Interpolation, PacketWriter, ReferenceFrame};
use crate::error::{CzmlError, Result};
use crate::geometry::Geodetic;
use crate::reference::PropertyReference;
use crate::state::OrbitalState;
use crate::time::TimeInterval;

/// Input shape of raw position components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionKind {
    /// x, y, z in meters
    Cartesian,
    /// x, y, z, vx, vy, vz
    CartesianVelocity,
    /// longitude, latitude (radians), height
    GeodeticRadians,
    /// longitude, latitude (degrees), height
    GeodeticDegrees,
}

impl PositionKind {
    fn component_count(&self) -> usize {
        match self {
            Self::CartesianVelocity => 6,
            _ => 3,
        }
    }
}

impl FromStr for PositionKind {
    type Err = CzmlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cartesian" => Ok(Self::Cartesian),
            "cartesian_velocity" | "cartesianvelocity" => Ok(Self::CartesianVelocity),
            "geodetic_radians" | "cartographicradians" => Ok(Self::GeodeticRadians),
            "geodetic_degrees" | "cartographicdegrees" => Ok(Self::GeodeticDegrees),
            _ => Err(CzmlError::UnknownPositionType(s.to_string())),
        }
    }
}

/// Normalized position value: cartesian (optionally with velocity) or geodetic radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionValue {
    Cartesian(Vector3<f64>),
    CartesianVelocity(Vector3<f64>, Vector3<f64>),
    Geodetic(Geodetic),
}

impl PositionValue {
    /// Normalize raw components of the given input shape
    pub fn from_components(kind: PositionKind, components: &[f64]) -> Result<Self> {
        if components.len() != kind.component_count() {
            return Err(CzmlError::InvalidSamples(format!(
                "{:?} position needs {} components, got {}",
                kind,
                kind.component_count(),
                components.len()
            )));
        }
        let c = components;
        Ok(match kind {
            PositionKind::Cartesian => Self::Cartesian(Vector3::new(c[0], c[1], c[2])),
            PositionKind::CartesianVelocity => Self::CartesianVelocity(
                Vector3::new(c[0], c[1], c[2]),
                Vector3::new(c[3], c[4], c[5]),
            ),
            PositionKind::GeodeticRadians => Self::Geodetic(Geodetic::from_radians(c[0], c[1], c[2])),
            PositionKind::GeodeticDegrees => Self::Geodetic(Geodetic::from_degrees(c[0], c[1], c[2])),
        })
    }

    fn key(&self) -> &'static str {
        match self {
            Self::Cartesian(_) => "cartesian",
            Self::CartesianVelocity(..) => "cartesianVelocity",
            Self::Geodetic(_) => "cartographicRadians",
        }
    }
}

impl CzmlValue for Geodetic {
    fn push_components(&self, out: &mut Vec<f64>) {
        out.extend_from_slice(&[self.longitude, self.latitude, self.height]);
    }
}

impl CzmlValue for PositionValue {
    fn push_components(&self, out: &mut Vec<f64>) {
        match self {
            Self::Cartesian(p) => p.push_components(out),
            Self::CartesianVelocity(p, v) => (*p, *v).push_components(out),
            Self::Geodetic(g) => g.push_components(out),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PositionData {
    Static(PositionValue),
    Sampled(Sampled<PositionValue>),
    Reference(PropertyReference),
}

/// Position of an entity: static, time-sampled, or a reference to another entity's position
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    data: PositionData,
    frame: Option<ReferenceFrame>,
}

impl Position {
    pub fn fixed(value: PositionValue) -> Self {
        Self {
            data: PositionData::Static(value),
            frame: None,
        }
    }

    pub fn cartesian(position: Vector3<f64>) -> Self {
        Self::fixed(PositionValue::Cartesian(position))
    }

    pub fn geodetic(point: Geodetic) -> Self {
        Self::fixed(PositionValue::Geodetic(point))
    }

    /// Time-sampled position; every value must share one encoding
    pub fn sampled(
        instants: Vec<DateTime<Utc>>,
        values: Vec<PositionValue>,
        interpolation: Interpolation,
    ) -> Result<Self> {
        if let Some(first) = values.first() {
            if values.iter().any(|v| v.key() != first.key()) {
                return Err(CzmlError::InvalidSamples(
                    "sampled position mixes encodings".into(),
                ));
            }
        }
        Ok(Self {
            data: PositionData::Sampled(Sampled::new(instants, values, interpolation)?),
            frame: None,
        })
    }

    /// Inertial cartesian samples from propagated states
    pub fn from_states(
        states: &[OrbitalState],
        with_velocity: bool,
        interpolation: Interpolation,
    ) -> Result<Self> {
        let instants = states.iter().map(|s| s.epoch).collect();
        let values = states
            .iter()
            .map(|s| {
                if with_velocity {
                    PositionValue::CartesianVelocity(s.position, s.velocity)
                } else {
                    PositionValue::Cartesian(s.position)
                }
            })
            .collect();
        Ok(Self::sampled(instants, values, interpolation)?.with_frame(ReferenceFrame::Inertial))
    }

    /// Live reference to another entity's property
    pub fn reference(reference: PropertyReference) -> Self {
        Self {
            data: PositionData::Reference(reference),
            frame: None,
        }
    }

    pub fn with_frame(mut self, frame: ReferenceFrame) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn frame(&self) -> Option<ReferenceFrame> {
        self.frame
    }

    pub fn is_sampled(&self) -> bool {
        matches!(self.data, PositionData::Sampled(_))
    }

    /// Span of the samples, for time-sampled positions
    pub fn interval(&self) -> Option<TimeInterval> {
        match &self.data {
            PositionData::Sampled(s) => Some(s.interval()),
            _ => None,
        }
    }

    pub fn sample_count(&self) -> usize {
        match &self.data {
            PositionData::Sampled(s) => s.len(),
            _ => 1,
        }
    }
}

impl Property for Position {
    fn name(&self) -> &'static str {
        "position"
    }

    fn write(&self, packet: &mut PacketWriter<'_>) -> Result<()> {
        let mut prop = packet.open_property(self.name());
        if let Some(frame) = self.frame {
            prop.write_reference_frame(frame);
        }
        match &self.data {
            PositionData::Static(value) => prop.write_components(value.key(), value),
            PositionData::Sampled(samples) => {
                let key = samples.values()[0].key();
                samples.write_into(&mut prop, key);
            }
            PositionData::Reference(reference) => prop.write_reference(reference),
        }
        Ok(())
    }
}
