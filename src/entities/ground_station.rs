//! Ground stations

use std::path::PathBuf;

use super::{open_block, Entity};
use crate::czml::{Color, CzmlStream};
use crate::error::{CzmlError, Result};
use crate::geometry::{BodyShape, Geodetic};
use crate::properties::{Label, Marker, Point, Position, Property};
use crate::reference::{entity_id, EntityKind};
use crate::time::TimeInterval;

/// Fixed site on a body surface
#[derive(Debug, Clone)]
pub struct GroundStation {
    id: String,
    name: String,
    location: Geodetic,
    body: BodyShape,
    marker: Marker,
    label: Option<Label>,
}

impl GroundStation {
    pub fn location(&self) -> &Geodetic {
        &self.location
    }

    pub fn body(&self) -> &BodyShape {
        &self.body
    }
}

impl Entity for GroundStation {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::GroundStation
    }

    fn availability(&self) -> Option<TimeInterval> {
        None
    }

    fn write_block(&self, stream: &mut CzmlStream) -> Result<()> {
        let mut packet = open_block(stream, &self.id, &self.name, None);
        Position::geodetic(self.location).write(&mut packet)?;
        self.marker.write(&mut packet)?;
        if let Some(label) = &self.label {
            label.write(&mut packet)?;
        }
        Ok(())
    }
}

fn station(
    name: String,
    location: Geodetic,
    body: &BodyShape,
    model: Option<&PathBuf>,
    color: Color,
    show_label: bool,
) -> Result<GroundStation> {
    let marker = match model {
        Some(asset) => Marker::from_asset(asset.clone())?.with_color(color),
        None => Marker::Point(Point::new(color, 10.0)),
    };
    let label = show_label.then(|| Label::new(name.clone()).with_color(color));
    Ok(GroundStation {
        id: entity_id(EntityKind::GroundStation, &name),
        name,
        location,
        body: body.clone(),
        marker,
        label,
    })
}

/// Builder for one station
pub struct GroundStationBuilder {
    name: String,
    location: Geodetic,
    body: BodyShape,
    models: Vec<PathBuf>,
    color: Color,
    show_label: bool,
}

impl GroundStationBuilder {
    pub fn new(name: impl Into<String>, location: Geodetic) -> Self {
        Self {
            name: name.into(),
            location,
            body: BodyShape::wgs84(),
            models: Vec::new(),
            color: Color::GREEN,
            show_label: true,
        }
    }

    pub fn body(mut self, body: BodyShape) -> Self {
        self.body = body;
        self
    }

    pub fn model(mut self, asset: impl Into<PathBuf>) -> Self {
        self.models.push(asset.into());
        self
    }

    pub fn models(mut self, assets: Vec<PathBuf>) -> Self {
        self.models = assets;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn show_label(mut self, show: bool) -> Self {
        self.show_label = show;
        self
    }

    pub fn build(self) -> Result<GroundStation> {
        if self.models.len() > 1 {
            return Err(CzmlError::MultipleModels {
                count: self.models.len(),
            });
        }
        station(
            self.name,
            self.location,
            &self.body,
            self.models.first(),
            self.color,
            self.show_label,
        )
    }
}

/// Builder for a network of stations sharing one style
///
/// Models are either shared (none or one) or given one per station.
pub struct GroundStationsBuilder {
    sites: Vec<(String, Geodetic)>,
    body: BodyShape,
    models: Vec<PathBuf>,
    color: Color,
    show_label: bool,
}

impl GroundStationsBuilder {
    pub fn new(sites: Vec<(String, Geodetic)>) -> Self {
        Self {
            sites,
            body: BodyShape::wgs84(),
            models: Vec::new(),
            color: Color::GREEN,
            show_label: true,
        }
    }

    pub fn body(mut self, body: BodyShape) -> Self {
        self.body = body;
        self
    }

    pub fn models(mut self, assets: Vec<PathBuf>) -> Self {
        self.models = assets;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn show_label(mut self, show: bool) -> Self {
        self.show_label = show;
        self
    }

    pub fn build(self) -> Result<Vec<GroundStation>> {
        let per_station = self.models.len() == self.sites.len();
        if self.models.len() > 1 && !per_station {
            return Err(CzmlError::MultipleModels {
                count: self.models.len(),
            });
        }

        self.sites
            .into_iter()
            .enumerate()
            .map(|(i, (name, location))| {
                let model = if per_station {
                    self.models.get(i)
                } else {
                    self.models.first()
                };
                station(name, location, &self.body, model, self.color, self.show_label)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::fixtures::render;

    fn toulouse() -> Geodetic {
        Geodetic::from_degrees(1.44, 43.6, 150.0)
    }

    #[test]
    fn test_station_packet() {
        let gs = GroundStationBuilder::new("Toulouse", toulouse()).build().unwrap();
        assert_eq!(gs.id(), "GS/Toulouse");
        let packets = render(&gs);
        let p = &packets[0];
        let pos = p["position"]["cartographicRadians"].as_array().unwrap();
        assert!((pos[1].as_f64().unwrap() - 43.6f64.to_radians()).abs() < 1e-12);
        assert_eq!(pos[2], 150.0);
        assert!(p["point"].is_object());
        assert!(p.get("availability").is_none());
    }

    #[test]
    fn test_single_station_rejects_many_models() {
        let result = GroundStationBuilder::new("Toulouse", toulouse())
            .model("a.glb")
            .model("b.glb")
            .build();
        assert!(matches!(result, Err(CzmlError::MultipleModels { count: 2 })));

        let gs = GroundStationBuilder::new("Toulouse", toulouse())
            .model("dish.glb")
            .build()
            .unwrap();
        assert_eq!(render(&gs)[0]["model"]["gltf"], "dish.glb");
    }

    #[test]
    fn test_station_network() {
        let sites = vec![
            ("Kourou".to_string(), Geodetic::from_degrees(-52.8, 5.2, 0.0)),
            ("Kiruna".to_string(), Geodetic::from_degrees(20.2, 67.9, 0.0)),
        ];
        let stations = GroundStationsBuilder::new(sites.clone())
            .models(vec!["a.glb".into(), "b.glb".into()])
            .build()
            .unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(render(&stations[1])[0]["model"]["gltf"], "b.glb");

        let result = GroundStationsBuilder::new(sites)
            .models(vec!["a.glb".into(), "b.glb".into(), "c.glb".into()])
            .build();
        assert!(matches!(result, Err(CzmlError::MultipleModels { count: 3 })));
    }
}
