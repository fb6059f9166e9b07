//! Polylines: explicit vectors or lines anchored to other entities

use nalgebra::Vector3;

use super::{Property, ShowIntervals};
use crate::czml::{Color, PacketWriter, ReferenceFrame};
use crate::error::{CzmlError, Result};
use crate::reference::PropertyReference;

/// One end of a reference-mode polyline
#[derive(Debug, Clone, PartialEq)]
pub enum PolylineEndpoint {
    Fixed(Vector3<f64>),
    Reference(PropertyReference),
}

#[derive(Debug, Clone, PartialEq)]
enum PolylineMode {
    /// Arrow between two literal points
    Vector([Vector3<f64>; 2]),
    Endpoints {
        start: Option<PolylineEndpoint>,
        end: Option<PolylineEndpoint>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    /// Owner description used in error messages
    owner: String,
    mode: PolylineMode,
    color: Color,
    width: f64,
    frame: Option<ReferenceFrame>,
    show: ShowIntervals,
}

impl Polyline {
    /// Arrow polyline from exactly two positions
    pub fn vector(owner: impl Into<String>, positions: &[Vector3<f64>], color: Color, width: f64) -> Result<Self> {
        let [start, end] = positions else {
            return Err(CzmlError::PolylineSize {
                actual: positions.len(),
            });
        };
        Ok(Self {
            owner: owner.into(),
            mode: PolylineMode::Vector([*start, *end]),
            color,
            width,
            frame: None,
            show: ShowIntervals::default(),
        })
    }

    /// Polyline whose endpoints are set later with [`Polyline::set_start`] and [`Polyline::set_end`]
    ///
    /// Both endpoints must be literal positions or both must be references: a
    /// CZML `positions` value is either `cartesian` or `references`, never a mix.
    /// A mixed pair fails with [`CzmlError::MixedEndpoints`] and a missing one
    /// with [`CzmlError::MissingReference`] when the line is validated or written.
    pub fn between(owner: impl Into<String>, color: Color, width: f64) -> Self {
        Self {
            owner: owner.into(),
            mode: PolylineMode::Endpoints {
                start: None,
                end: None,
            },
            color,
            width,
            frame: None,
            show: ShowIntervals::default(),
        }
    }

    /// Line between the live positions of two entities
    pub fn linking(owner: impl Into<String>, from: &str, to: &str, color: Color, width: f64) -> Self {
        let mut line = Self::between(owner, color, width);
        line.set_start(PolylineEndpoint::Reference(PropertyReference::position_of(from)));
        line.set_end(PolylineEndpoint::Reference(PropertyReference::position_of(to)));
        line
    }

    pub fn set_start(&mut self, endpoint: PolylineEndpoint) {
        if let PolylineMode::Endpoints { start, .. } = &mut self.mode {
            *start = Some(endpoint);
        }
    }

    pub fn set_end(&mut self, endpoint: PolylineEndpoint) {
        if let PolylineMode::Endpoints { end, .. } = &mut self.mode {
            *end = Some(endpoint);
        }
    }

    pub fn with_frame(mut self, frame: ReferenceFrame) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn with_show(mut self, show: ShowIntervals) -> Self {
        self.show = show;
        self
    }

    pub fn show(&self) -> &ShowIntervals {
        &self.show
    }

    pub fn is_vector(&self) -> bool {
        matches!(self.mode, PolylineMode::Vector(_))
    }

    /// Both positions of a vector polyline
    pub fn vector_positions(&self) -> Result<&[Vector3<f64>; 2]> {
        match &self.mode {
            PolylineMode::Vector(positions) => Ok(positions),
            PolylineMode::Endpoints { .. } => Err(CzmlError::NotAVector(self.owner.clone())),
        }
    }

    /// Check that a reference polyline can be written
    pub fn validate(&self) -> Result<()> {
        match &self.mode {
            PolylineMode::Vector(_) => Ok(()),
            PolylineMode::Endpoints { start, end } => match (start, end) {
                (Some(PolylineEndpoint::Fixed(_)), Some(PolylineEndpoint::Fixed(_)))
                | (Some(PolylineEndpoint::Reference(_)), Some(PolylineEndpoint::Reference(_))) => Ok(()),
                (Some(_), Some(_)) => Err(CzmlError::MixedEndpoints(self.owner.clone())),
                _ => Err(CzmlError::MissingReference(self.owner.clone())),
            },
        }
    }
}

impl Property for Polyline {
    fn name(&self) -> &'static str {
        "polyline"
    }

    fn write(&self, packet: &mut PacketWriter<'_>) -> Result<()> {
        self.validate()?;

        let mut prop = packet.open_property(self.name());
        self.show.write_into(&mut prop);
        prop.write_value("width", self.width);
        prop.write_value("arcType", "NONE");
        {
            let mut positions = prop.open_property("positions");
            if let Some(frame) = self.frame {
                positions.write_reference_frame(frame);
            }
            match &self.mode {
                PolylineMode::Vector([a, b]) => positions.write_components("cartesian", &(*a, *b)),
                PolylineMode::Endpoints {
                    start: Some(PolylineEndpoint::Fixed(a)),
                    end: Some(PolylineEndpoint::Fixed(b)),
                } => positions.write_components("cartesian", &(*a, *b)),
                PolylineMode::Endpoints {
                    start: Some(PolylineEndpoint::Reference(a)),
                    end: Some(PolylineEndpoint::Reference(b)),
                } => positions.write_references(&[a.clone(), b.clone()]),
                PolylineMode::Endpoints { .. } => {}
            }
        }

        let mut material = prop.open_property("material");
        let kind = if self.is_vector() { "polylineArrow" } else { "solidColor" };
        let mut inner = material.open_property(kind);
        let mut color = inner.open_property("color");
        color.write_color(&self.color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::czml::CzmlStream;
    use crate::time::{offset_seconds, TimeInterval};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    fn render(line: &Polyline) -> Result<Value> {
        let mut stream = CzmlStream::new();
        {
            let mut packet = stream.open_packet("L");
            line.write(&mut packet)?;
        }
        let doc: Vec<Value> = serde_json::from_slice(&stream.finish()?)?;
        Ok(doc[0].clone())
    }

    #[test]
    fn test_vector_size_validation() {
        let points: Vec<_> = (0..4).map(|i| Vector3::new(i as f64, 0.0, 0.0)).collect();
        for n in [0usize, 1, 3, 4] {
            assert!(matches!(
                Polyline::vector("arrow", &points[..n], Color::RED, 2.0),
                Err(CzmlError::PolylineSize { actual }) if actual == n
            ));
        }
        let line = Polyline::vector("arrow", &points[..2], Color::RED, 2.0).unwrap();
        assert_eq!(line.vector_positions().unwrap(), &[points[0], points[1]]);
    }

    #[test]
    fn test_vector_accessor_on_reference_line() {
        let line = Polyline::linking("LOV/x", "GS/a", "SAT/b", Color::GREEN, 1.0);
        assert!(matches!(line.vector_positions(), Err(CzmlError::NotAVector(_))));
    }

    #[test]
    fn test_missing_and_mixed_endpoints() {
        let mut line = Polyline::between("LOV/x", Color::GREEN, 1.0);
        assert!(matches!(render(&line), Err(CzmlError::MissingReference(_))));

        line.set_start(PolylineEndpoint::Reference(PropertyReference::position_of("GS/a")));
        assert!(matches!(render(&line), Err(CzmlError::MissingReference(_))));

        line.set_end(PolylineEndpoint::Fixed(Vector3::zeros()));
        assert!(matches!(render(&line), Err(CzmlError::MixedEndpoints(_))));
    }

    #[test]
    fn test_reference_output_with_show() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let show = ShowIntervals::new(vec![
            (TimeInterval::new(t0, offset_seconds(&t0, 60.0)).unwrap(), false),
            (TimeInterval::new(offset_seconds(&t0, 60.0), offset_seconds(&t0, 120.0)).unwrap(), true),
        ]);
        let line = Polyline::linking("LOV/x", "GS/a", "SAT/b", Color::GREEN, 1.0).with_show(show);
        let packet = render(&line).unwrap();
        let p = &packet["polyline"];
        assert_eq!(p["positions"]["references"], json!(["GS/a#position", "SAT/b#position"]));
        assert_eq!(p["show"].as_array().unwrap().len(), 2);
        assert_eq!(p["show"][1]["boolean"], true);
        assert!(p["material"]["solidColor"].is_object());
    }

    #[test]
    fn test_vector_output() {
        let line = Polyline::vector(
            "MAN/x/0",
            &[Vector3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 5.0, 6.0)],
            Color::ORANGE,
            3.0,
        )
        .unwrap()
        .with_frame(ReferenceFrame::Inertial);
        let packet = render(&line).unwrap();
        let p = &packet["polyline"];
        assert_eq!(p["positions"]["cartesian"], json!([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        assert_eq!(p["positions"]["referenceFrame"], "INERTIAL");
        assert!(p["material"]["polylineArrow"]["color"]["rgba"].is_array());
    }
}
