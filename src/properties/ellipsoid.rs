//! Ellipsoids, used for covariance and dispersion volumes

use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use super::{Property, Sampled};
use crate::czml::{Color, Interpolation, PacketWriter};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
enum Radii {
    Static(Vector3<f64>),
    Sampled(Sampled<Vector3<f64>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ellipsoid {
    radii: Radii,
    color: Color,
    fill: bool,
    outline: bool,
    outline_color: Color,
    stack_partitions: u32,
    slice_partitions: u32,
    subdivisions: u32,
}

impl Ellipsoid {
    pub fn new(radii: Vector3<f64>) -> Self {
        Self::with_radii(Radii::Static(radii))
    }

    pub fn sampled(
        instants: Vec<DateTime<Utc>>,
        radii: Vec<Vector3<f64>>,
        interpolation: Interpolation,
    ) -> Result<Self> {
        Ok(Self::with_radii(Radii::Sampled(Sampled::new(
            instants,
            radii,
            interpolation,
        )?)))
    }

    fn with_radii(radii: Radii) -> Self {
        Self {
            radii,
            color: Color::YELLOW.with_alpha(90),
            fill: true,
            outline: true,
            outline_color: Color::YELLOW,
            stack_partitions: 16,
            slice_partitions: 16,
            subdivisions: 64,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_outline(mut self, outline: bool, color: Color) -> Self {
        self.outline = outline;
        self.outline_color = color;
        self
    }

    pub fn with_partitions(mut self, stacks: u32, slices: u32, subdivisions: u32) -> Self {
        self.stack_partitions = stacks;
        self.slice_partitions = slices;
        self.subdivisions = subdivisions;
        self
    }

    pub fn is_sampled(&self) -> bool {
        matches!(self.radii, Radii::Sampled(_))
    }
}

impl Property for Ellipsoid {
    fn name(&self) -> &'static str {
        "ellipsoid"
    }

    fn write(&self, packet: &mut PacketWriter<'_>) -> Result<()> {
        let mut prop = packet.open_property(self.name());
        {
            let mut radii = prop.open_property("radii");
            match &self.radii {
                Radii::Static(r) => radii.write_components("cartesian", r),
                Radii::Sampled(samples) => samples.write_into(&mut radii, "cartesian"),
            }
        }
        prop.write_value("fill", self.fill);
        prop.write_solid_color_material(&self.color);
        prop.write_value("outline", self.outline);
        {
            let mut outline = prop.open_property("outlineColor");
            outline.write_color(&self.outline_color);
        }
        prop.write_value("stackPartitions", self.stack_partitions);
        prop.write_value("slicePartitions", self.slice_partitions);
        prop.write_value("subdivisions", self.subdivisions);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::czml::CzmlStream;
    use crate::time::offset_seconds;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn render(ellipsoid: &Ellipsoid) -> Value {
        let mut stream = CzmlStream::new();
        {
            let mut packet = stream.open_packet("COV/x");
            ellipsoid.write(&mut packet).unwrap();
        }
        let doc: Vec<Value> = serde_json::from_slice(&stream.finish().unwrap()).unwrap();
        doc[0]["ellipsoid"].clone()
    }

    #[test]
    fn test_static_radii() {
        let e = render(&Ellipsoid::new(Vector3::new(10.0, 20.0, 30.0)));
        assert_eq!(e["radii"]["cartesian"], json!([10.0, 20.0, 30.0]));
        assert_eq!(e["stackPartitions"], 16);
    }

    #[test]
    fn test_sampled_radii() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ellipsoid = Ellipsoid::sampled(
            vec![t0, offset_seconds(&t0, 10.0)],
            vec![Vector3::repeat(1.0), Vector3::repeat(2.0)],
            Interpolation::linear(),
        )
        .unwrap();
        assert!(ellipsoid.is_sampled());
        let e = render(&ellipsoid);
        assert_eq!(e["radii"]["cartesian"].as_array().unwrap().len(), 8);
        assert_eq!(e["radii"]["interpolationAlgorithm"], "LINEAR");
    }
}
