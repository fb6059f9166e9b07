//! Orientation property

use chrono::{DateTime, Utc};
use nalgebra::UnitQuaternion;

use super::{Property, Sampled};
use crate::czml::{Interpolation, PacketWriter};
use crate::error::{CzmlError, Result};
use crate::geometry::inertial_to_fixed;
use crate::state::Attitude;
use crate::time::TimeInterval;

/// Frame convention applied to attitudes before they are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrientationFrame {
    /// Re-express the body-to-inertial rotation as body-to-Earth-fixed
    #[default]
    EarthFixed,
    /// Leave the rotation as given (caller already composed the final frame)
    Native,
}

#[derive(Debug, Clone, PartialEq)]
enum OrientationData {
    Static(UnitQuaternion<f64>),
    Sampled(Sampled<UnitQuaternion<f64>>),
}

/// Orientation of an entity as a unit quaternion or a quaternion time series
#[derive(Debug, Clone, PartialEq)]
pub struct Orientation {
    data: OrientationData,
}

fn convert(
    epoch: &DateTime<Utc>,
    rotation: &UnitQuaternion<f64>,
    frame: OrientationFrame,
    extra: Option<&UnitQuaternion<f64>>,
) -> UnitQuaternion<f64> {
    let composed = match extra {
        Some(extra) => rotation * extra,
        None => *rotation,
    };
    match frame {
        OrientationFrame::EarthFixed => inertial_to_fixed(epoch) * composed,
        OrientationFrame::Native => composed,
    }
}

impl Orientation {
    /// Static orientation from one attitude
    ///
    /// `extra` is composed on the body side before the frame conversion.
    pub fn from_attitude(
        attitude: &Attitude,
        frame: OrientationFrame,
        extra: Option<UnitQuaternion<f64>>,
    ) -> Self {
        Self {
            data: OrientationData::Static(convert(
                &attitude.epoch,
                &attitude.rotation,
                frame,
                extra.as_ref(),
            )),
        }
    }

    /// Time-sampled orientation from an attitude list
    pub fn from_attitudes(
        attitudes: &[Attitude],
        frame: OrientationFrame,
        extra: Option<UnitQuaternion<f64>>,
        interpolation: Interpolation,
    ) -> Result<Self> {
        let instants = attitudes.iter().map(|a| a.epoch).collect();
        let values = attitudes
            .iter()
            .map(|a| convert(&a.epoch, &a.rotation, frame, extra.as_ref()))
            .collect();
        Ok(Self {
            data: OrientationData::Sampled(Sampled::new(instants, values, interpolation)?),
        })
    }

    /// Quaternions already expressed in their final frame
    pub fn sampled(
        instants: Vec<DateTime<Utc>>,
        rotations: Vec<UnitQuaternion<f64>>,
        interpolation: Interpolation,
    ) -> Result<Self> {
        Ok(Self {
            data: OrientationData::Sampled(Sampled::new(instants, rotations, interpolation)?),
        })
    }

    pub fn constant(rotation: UnitQuaternion<f64>) -> Self {
        Self {
            data: OrientationData::Static(rotation),
        }
    }

    /// The single rotation of a static orientation
    pub fn single_attitude(&self) -> Result<&UnitQuaternion<f64>> {
        match &self.data {
            OrientationData::Static(q) => Ok(q),
            OrientationData::Sampled(_) => Err(CzmlError::WrongAttitudeVariant(
                "single attitude requested from a sampled orientation",
            )),
        }
    }

    /// The rotation series of a sampled orientation
    pub fn attitudes(&self) -> Result<&Sampled<UnitQuaternion<f64>>> {
        match &self.data {
            OrientationData::Sampled(s) => Ok(s),
            OrientationData::Static(_) => Err(CzmlError::WrongAttitudeVariant(
                "attitude list requested from a static orientation",
            )),
        }
    }

    pub fn interval(&self) -> Option<TimeInterval> {
        match &self.data {
            OrientationData::Sampled(s) => Some(s.interval()),
            OrientationData::Static(_) => None,
        }
    }
}

impl Property for Orientation {
    fn name(&self) -> &'static str {
        "orientation"
    }

    fn write(&self, packet: &mut PacketWriter<'_>) -> Result<()> {
        let mut prop = packet.open_property(self.name());
        match &self.data {
            OrientationData::Static(q) => prop.write_components("unitQuaternion", q),
            OrientationData::Sampled(samples) => samples.write_into(&mut prop, "unitQuaternion"),
        }
        Ok(())
    }
}
