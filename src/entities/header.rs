//! Document header packet

use super::Entity;
use crate::czml::CzmlStream;
use crate::error::Result;
use crate::reference::{entity_id, EntityKind};
use crate::time::{iso8601, Clock, TimeInterval};

pub const CZML_VERSION: &str = "1.0";

/// First packet of every document; carries the simulation clock
#[derive(Debug, Clone)]
pub struct Header {
    id: String,
    name: String,
    clock: Clock,
}

impl Header {
    pub fn new(name: impl Into<String>, clock: Clock) -> Self {
        Self {
            id: entity_id(EntityKind::Header, ""),
            name: name.into(),
            clock,
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}

impl Entity for Header {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Header
    }

    fn availability(&self) -> Option<TimeInterval> {
        Some(self.clock.interval())
    }

    fn write_block(&self, stream: &mut CzmlStream) -> Result<()> {
        let mut packet = stream.open_packet(&self.id);
        packet.write_name(&self.name);
        packet.write_value("version", CZML_VERSION);

        let mut clock = packet.open_property("clock");
        clock.write_interval(&self.clock.interval());
        clock.write_value("currentTime", iso8601(&self.clock.current()));
        clock.write_value("multiplier", self.clock.multiplier());
        clock.write_value("range", self.clock.range().as_czml());
        clock.write_value("step", self.clock.step().as_czml());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::fixtures::{render, t0};
    use crate::time::{offset_seconds, ClockRange, TimeScale};

    #[test]
    fn test_header_packet() {
        let clock = Clock::new(t0(), offset_seconds(&t0(), 3600.0), TimeScale::Utc, 60.0)
            .unwrap()
            .with_range(ClockRange::Clamped);
        let header = Header::new("LEO demo", clock);
        let packets = render(&header);

        assert_eq!(packets.len(), 1);
        let p = &packets[0];
        assert_eq!(p["id"], "document");
        assert_eq!(p["version"], "1.0");
        assert_eq!(p["clock"]["interval"], "2024-03-20T12:00:00.000Z/2024-03-20T13:00:00.000Z");
        assert_eq!(p["clock"]["currentTime"], "2024-03-20T12:00:00.000Z");
        assert_eq!(p["clock"]["multiplier"], 60.0);
        assert_eq!(p["clock"]["range"], "CLAMPED");
    }
}
