//! Cylinders, used as visibility cones

use chrono::{DateTime, Utc};

use super::{Property, Sampled};
use crate::czml::{Color, Interpolation, PacketWriter};
use crate::error::Result;
use crate::geometry::Cone;

#[derive(Debug, Clone, PartialEq)]
enum CylinderData {
    Static(Cone),
    Sampled {
        length: Sampled<f64>,
        top_radius: Sampled<f64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    data: CylinderData,
    color: Color,
    fill: bool,
    outline: bool,
    outline_color: Color,
    slices: u32,
    vertical_lines: u32,
}

impl Cylinder {
    pub fn cone(cone: Cone) -> Self {
        Self::with_data(CylinderData::Static(cone))
    }

    /// Cone whose length changes over time at a fixed half-aperture
    pub fn sampled_cone(
        instants: Vec<DateTime<Utc>>,
        lengths: Vec<f64>,
        aperture: f64,
        interpolation: Interpolation,
    ) -> Result<Self> {
        let radii = lengths.iter().map(|l| Cone::with_aperture(*l, aperture).top_radius).collect();
        let top_radius = Sampled::new(instants.clone(), radii, interpolation)?;
        let length = Sampled::new(instants, lengths, interpolation)?;
        Ok(Self::with_data(CylinderData::Sampled { length, top_radius }))
    }

    fn with_data(data: CylinderData) -> Self {
        Self {
            data,
            color: Color::CYAN.with_alpha(60),
            fill: true,
            outline: false,
            outline_color: Color::WHITE,
            slices: 128,
            vertical_lines: 16,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_outline(mut self, color: Color) -> Self {
        self.outline = true;
        self.outline_color = color;
        self
    }

    pub fn with_fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_partitions(mut self, slices: u32, vertical_lines: u32) -> Self {
        self.slices = slices;
        self.vertical_lines = vertical_lines;
        self
    }
}

impl Property for Cylinder {
    fn name(&self) -> &'static str {
        "cylinder"
    }

    fn write(&self, packet: &mut PacketWriter<'_>) -> Result<()> {
        let mut prop = packet.open_property(self.name());
        match &self.data {
            CylinderData::Static(cone) => {
                prop.write_value("length", cone.length);
                prop.write_value("topRadius", cone.top_radius);
                prop.write_value("bottomRadius", cone.bottom_radius);
            }
            CylinderData::Sampled { length, top_radius } => {
                {
                    let mut l = prop.open_property("length");
                    length.write_into(&mut l, "number");
                }
                {
                    let mut r = prop.open_property("topRadius");
                    top_radius.write_into(&mut r, "number");
                }
                prop.write_value("bottomRadius", 0.0);
            }
        }
        prop.write_value("fill", self.fill);
        prop.write_solid_color_material(&self.color);
        prop.write_value("outline", self.outline);
        if self.outline {
            let mut outline = prop.open_property("outlineColor");
            outline.write_color(&self.outline_color);
        }
        prop.write_value("slices", self.slices);
        prop.write_value("numberOfVerticalLines", self.vertical_lines);
        Ok(())
    }
}
