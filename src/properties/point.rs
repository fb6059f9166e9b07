//! Point markers

use super::Property;
use crate::czml::{Color, PacketWriter};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    color: Color,
    pixel_size: f64,
    outline_color: Color,
    outline_width: f64,
}

impl Default for Point {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            pixel_size: 6.0,
            outline_color: Color::rgba(0, 0, 0, 255),
            outline_width: 1.0,
        }
    }
}

impl Point {
    pub fn new(color: Color, pixel_size: f64) -> Self {
        Self {
            color,
            pixel_size,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_outline(mut self, color: Color, width: f64) -> Self {
        self.outline_color = color;
        self.outline_width = width;
        self
    }
}

impl Property for Point {
    fn name(&self) -> &'static str {
        "point"
    }

    fn write(&self, packet: &mut PacketWriter<'_>) -> Result<()> {
        let mut prop = packet.open_property(self.name());
        prop.write_value("show", true);
        prop.write_value("pixelSize", self.pixel_size);
        {
            let mut color = prop.open_property("color");
            color.write_color(&self.color);
        }
        {
            let mut outline = prop.open_property("outlineColor");
            outline.write_color(&self.outline_color);
        }
        prop.write_value("outlineWidth", self.outline_width);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::czml::CzmlStream;
    use serde_json::Value;

    #[test]
    fn test_point_output() {
        let point = Point::new(Color::RED, 10.0);
        let mut stream = CzmlStream::new();
        {
            let mut packet = stream.open_packet("P");
            point.write(&mut packet).unwrap();
        }
        let doc: Vec<Value> = serde_json::from_slice(&stream.finish().unwrap()).unwrap();
        assert_eq!(doc[0]["point"]["pixelSize"], 10.0);
        assert_eq!(doc[0]["point"]["color"]["rgba"][0], 255);
        assert_eq!(doc[0]["point"]["outlineWidth"], 1.0);
    }
}
