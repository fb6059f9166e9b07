//! Path (trail) property

use super::{Property, ShowIntervals};
use crate::czml::{Color, PacketWriter};
use crate::error::Result;
use crate::time::TimeInterval;

pub const DEFAULT_PATH_WIDTH: f64 = 1.0;
pub const DEFAULT_PATH_RESOLUTION: f64 = 120.0;

/// Trail drawn along an entity's sampled position
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    show: ShowIntervals,
    lead_time: Option<f64>,
    trail_time: Option<f64>,
    width: f64,
    resolution: f64,
    color: Color,
}

impl Path {
    /// Trail shown over `interval` with the full history
    pub fn new(interval: TimeInterval, color: Color) -> Self {
        Self {
            show: ShowIntervals::always(interval),
            lead_time: None,
            trail_time: None,
            width: DEFAULT_PATH_WIDTH,
            resolution: DEFAULT_PATH_RESOLUTION,
            color,
        }
    }

    /// Restrict the trail to a leading and trailing window (seconds)
    pub fn with_window(mut self, lead_time: f64, trail_time: f64) -> Self {
        self.lead_time = Some(lead_time);
        self.trail_time = Some(trail_time);
        self
    }

    /// Show only the last orbital period behind the entity
    pub fn one_period(self, period: f64) -> Self {
        self.with_window(0.0, period)
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_show(mut self, show: ShowIntervals) -> Self {
        self.show = show;
        self
    }

    pub fn trail_time(&self) -> Option<f64> {
        self.trail_time
    }
}

impl Property for Path {
    fn name(&self) -> &'static str {
        "path"
    }

    fn write(&self, packet: &mut PacketWriter<'_>) -> Result<()> {
        let mut prop = packet.open_property(self.name());
        self.show.write_into(&mut prop);
        prop.write_value("width", self.width);
        prop.write_value("resolution", self.resolution);
        if let Some(lead) = self.lead_time {
            prop.write_value("leadTime", lead);
        }
        if let Some(trail) = self.trail_time {
            prop.write_value("trailTime", trail);
        }
        prop.write_solid_color_material(&self.color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::czml::CzmlStream;
    use crate::time::offset_seconds;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    #[test]
    fn test_one_period_window() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let interval = TimeInterval::new(t0, offset_seconds(&t0, 86_400.0)).unwrap();
        let path = Path::new(interval, Color::CYAN).one_period(5_550.0).with_width(2.0);

        let mut stream = CzmlStream::new();
        {
            let mut packet = stream.open_packet("SAT/x");
            path.write(&mut packet).unwrap();
        }
        let doc: Vec<Value> = serde_json::from_slice(&stream.finish().unwrap()).unwrap();
        let p = &doc[0]["path"];
        assert_eq!(p["leadTime"], 0.0);
        assert_eq!(p["trailTime"], 5_550.0);
        assert_eq!(p["width"], 2.0);
        assert_eq!(p["show"][0]["boolean"], true);
        assert_eq!(p["material"]["solidColor"]["color"]["rgba"][1], 255);
    }

    #[test]
    fn test_full_history_has_no_window() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let interval = TimeInterval::new(t0, offset_seconds(&t0, 60.0)).unwrap();
        assert!(Path::new(interval, Color::WHITE).trail_time().is_none());
    }
}
