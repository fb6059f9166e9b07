//! Satellite collections

use super::{open_block, Entity, Satellite};
use crate::czml::CzmlStream;
use crate::error::{CzmlError, Result};
use crate::reference::{entity_id, EntityKind};
use crate::time::TimeInterval;

/// Named group of satellites; members point back to it through `parent`
#[derive(Debug, Clone)]
pub struct Constellation {
    id: String,
    name: String,
    availability: TimeInterval,
    satellites: Vec<Satellite>,
}

impl Constellation {
    pub fn new(name: impl Into<String>, mut satellites: Vec<Satellite>) -> Result<Self> {
        let name = name.into();
        let id = entity_id(EntityKind::Constellation, &name);

        let mut availability: Option<TimeInterval> = None;
        for sat in &mut satellites {
            sat.set_parent(&id);
            if let Some(span) = sat.availability() {
                availability = Some(match availability {
                    Some(a) => TimeInterval {
                        start: a.start.min(span.start),
                        stop: a.stop.max(span.stop),
                    },
                    None => span,
                });
            }
        }
        let availability = availability
            .ok_or_else(|| CzmlError::InvalidSamples(format!("constellation {} is empty", name)))?;

        log::debug!("{} groups {} satellites", id, satellites.len());
        Ok(Self {
            id,
            name,
            availability,
            satellites,
        })
    }

    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }
}

impl Entity for Constellation {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Constellation
    }

    fn availability(&self) -> Option<TimeInterval> {
        Some(self.availability)
    }

    fn write_block(&self, stream: &mut CzmlStream) -> Result<()> {
        drop(open_block(stream, &self.id, &self.name, Some(&self.availability)));
        for sat in &self.satellites {
            sat.write_block(stream)?;
        }
        Ok(())
    }

    fn release(&mut self) {
        for sat in &mut self.satellites {
            sat.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::fixtures::{circular_orbit, render, LEO_RADIUS};

    #[test]
    fn test_parent_links() {
        let sats = ["a", "b"]
            .iter()
            .map(|n| Satellite::builder(*n, circular_orbit(LEO_RADIUS, 4, 30.0)).build().unwrap())
            .collect();
        let constellation = Constellation::new("walker", sats).unwrap();
        assert_eq!(constellation.satellites()[1].parent(), Some("CONST/walker"));

        let packets = render(&constellation);
        assert_eq!(packets.len(), 3);
        assert_eq!(packets[0]["id"], "CONST/walker");
        assert_eq!(packets[1]["parent"], "CONST/walker");
        assert_eq!(packets[2]["id"], "SAT/b");
    }

    #[test]
    fn test_empty_constellation() {
        assert!(Constellation::new("none", Vec::new()).is_err());
    }
}
