//! Secondary properties attached to a primary entity's packet
//!
//! Each property is either static (one value over the entity's availability) or
//! time-sampled ([`Sampled`]: parallel instants and values plus an interpolation
//! scheme). [`Property::write`] opens its own scoped sub-element on the packet.

mod billboard;
mod cylinder;
mod ellipsoid;
mod label;
mod orientation;
mod path;
mod point;
mod polyline;
mod position;
mod show;

pub use billboard::*;
pub use cylinder::*;
pub use ellipsoid::*;
pub use label::*;
pub use orientation::*;
pub use path::*;
pub use point::*;
pub use polyline::*;
pub use position::*;
pub use show::*;

use chrono::{DateTime, Utc};

use crate::czml::{CzmlValue, Interpolation, PacketWriter, PropertyWriter};
use crate::error::{CzmlError, Result};
use crate::state::check_increasing;
use crate::time::TimeInterval;

/// A property writer bound to one packet
pub trait Property {
    /// Key under which the property appears in the packet
    fn name(&self) -> &'static str;

    fn write(&self, packet: &mut PacketWriter<'_>) -> Result<()>;
}

/// Time series with strictly increasing instants
#[derive(Debug, Clone, PartialEq)]
pub struct Sampled<T> {
    instants: Vec<DateTime<Utc>>,
    values: Vec<T>,
    interpolation: Interpolation,
}

impl<T> Sampled<T> {
    pub fn new(
        instants: Vec<DateTime<Utc>>,
        values: Vec<T>,
        interpolation: Interpolation,
    ) -> Result<Self> {
        if instants.len() != values.len() {
            return Err(CzmlError::InvalidSamples(format!(
                "{} instants for {} values",
                instants.len(),
                values.len()
            )));
        }
        check_increasing(instants.iter().copied())?;

        Ok(Self {
            instants,
            values,
            interpolation,
        })
    }

    /// First instant; sample offsets are relative to it
    pub fn epoch(&self) -> DateTime<Utc> {
        self.instants[0]
    }

    pub fn interval(&self) -> TimeInterval {
        TimeInterval {
            start: self.instants[0],
            stop: self.instants[self.instants.len() - 1],
        }
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    pub fn instants(&self) -> &[DateTime<Utc>] {
        &self.instants
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateTime<Utc>, &T)> {
        self.instants.iter().zip(self.values.iter())
    }
}

impl<T: CzmlValue> Sampled<T> {
    /// Write interpolation metadata, epoch and interleaved samples under `key`
    pub fn write_into(&self, prop: &mut PropertyWriter<'_>, key: &str) {
        prop.write_interpolation(&self.interpolation);
        prop.write_samples(key, &self.instants[0], &self.instants, &self.values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::offset_seconds;
    use chrono::TimeZone;

    #[test]
    fn test_sampled_validation() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = offset_seconds(&t0, 1.0);

        let ok = Sampled::new(vec![t0, t1], vec![1.0, 2.0], Interpolation::linear()).unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.interval().duration_seconds(), 1.0);

        assert!(Sampled::new(vec![t0, t1], vec![1.0], Interpolation::linear()).is_err());
        assert!(Sampled::new(vec![t1, t0], vec![1.0, 2.0], Interpolation::linear()).is_err());
        assert!(Sampled::<f64>::new(vec![], vec![], Interpolation::linear()).is_err());
    }
}
