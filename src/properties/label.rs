//! Text labels

use super::Property;
use crate::czml::{Color, PacketWriter};
use crate::error::Result;

pub const DEFAULT_LABEL_FONT: &str = "11pt Lucida Console";

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    text: String,
    color: Color,
    font: String,
    pixel_offset: [f64; 2],
    show: bool,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Color::WHITE,
            font: DEFAULT_LABEL_FONT.to_string(),
            pixel_offset: [12.0, 0.0],
            show: true,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    pub fn with_pixel_offset(mut self, x: f64, y: f64) -> Self {
        self.pixel_offset = [x, y];
        self
    }

    pub fn hidden(mut self) -> Self {
        self.show = false;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Property for Label {
    fn name(&self) -> &'static str {
        "label"
    }

    fn write(&self, packet: &mut PacketWriter<'_>) -> Result<()> {
        let mut prop = packet.open_property(self.name());
        prop.write_value("show", self.show);
        prop.write_value("text", self.text.as_str());
        prop.write_value("font", self.font.as_str());
        prop.write_value("horizontalOrigin", "LEFT");
        {
            let mut fill = prop.open_property("fillColor");
            fill.write_color(&self.color);
        }
        {
            let mut offset = prop.open_property("pixelOffset");
            offset.write_value("cartesian2", self.pixel_offset.to_vec());
        }
        Ok(())
    }
}
