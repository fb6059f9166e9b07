//! Satellite entity

use std::path::PathBuf;

use super::{open_block, AxisSource, Entity, ReferenceSystem, DEFAULT_AXIS_LENGTH};
use crate::czml::{Color, CzmlStream, Interpolation};
use crate::error::{CzmlError, Result};
use crate::geometry::LocalOrbitalFrame;
use crate::properties::{
    Label, Marker, Orientation, OrientationFrame, Path, Point, Position, Property,
};
use crate::reference::{entity_id, EntityKind};
use crate::state::{
    check_increasing, sample_attitudes, sample_states, Attitude, Ephemeris, OrbitalState,
};
use crate::time::{Clock, TimeInterval};

/// Display options of a satellite
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteConfig {
    pub color: Color,
    /// Image or glTF asset; a colored point when unset
    pub marker: Option<PathBuf>,
    pub show_label: bool,
    /// Trail limited to the last orbital period instead of the full history
    pub display_one_period: bool,
    /// Write the attitude as the entity orientation
    pub display_attitude: bool,
    /// Add an axis triad following the satellite
    pub display_reference_system: bool,
    pub reference_axis_length: f64,
    pub interpolation: Interpolation,
    /// Write position with velocity (enables Hermite interpolation)
    pub with_velocity: bool,
}

impl Default for SatelliteConfig {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            marker: None,
            show_label: true,
            display_one_period: false,
            display_attitude: false,
            display_reference_system: false,
            reference_axis_length: DEFAULT_AXIS_LENGTH,
            interpolation: Interpolation::default(),
            with_velocity: false,
        }
    }
}

/// Builder for [`Satellite`]
pub struct SatelliteBuilder {
    name: String,
    states: Vec<OrbitalState>,
    attitudes: Vec<Attitude>,
    config: SatelliteConfig,
}

impl SatelliteBuilder {
    pub fn new(name: impl Into<String>, states: Vec<OrbitalState>) -> Self {
        Self {
            name: name.into(),
            states,
            attitudes: Vec::new(),
            config: SatelliteConfig::default(),
        }
    }

    /// Sample an ephemeris at every clock instant
    pub fn from_ephemeris(
        name: impl Into<String>,
        ephemeris: &dyn Ephemeris,
        clock: &Clock,
    ) -> Result<Self> {
        let states = sample_states(ephemeris, clock)?;
        let attitudes = sample_attitudes(ephemeris, clock);
        Ok(Self::new(name, states).attitudes(attitudes))
    }

    pub fn attitudes(mut self, attitudes: Vec<Attitude>) -> Self {
        self.attitudes = attitudes;
        self
    }

    pub fn config(mut self, config: SatelliteConfig) -> Self {
        self.config = config;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.config.color = color;
        self
    }

    pub fn marker(mut self, asset: impl Into<PathBuf>) -> Self {
        self.config.marker = Some(asset.into());
        self
    }

    pub fn show_label(mut self, show: bool) -> Self {
        self.config.show_label = show;
        self
    }

    pub fn display_one_period(mut self, enabled: bool) -> Self {
        self.config.display_one_period = enabled;
        self
    }

    pub fn display_attitude(mut self, enabled: bool) -> Self {
        self.config.display_attitude = enabled;
        self
    }

    pub fn display_reference_system(mut self, enabled: bool) -> Self {
        self.config.display_reference_system = enabled;
        self
    }

    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.config.interpolation = interpolation;
        self
    }

    pub fn interpolation_degree(mut self, degree: u32) -> Self {
        self.config.interpolation.degree = degree;
        self
    }

    pub fn with_velocity(mut self, enabled: bool) -> Self {
        self.config.with_velocity = enabled;
        self
    }

    pub fn build(self) -> Result<Satellite> {
        let config = self.config;
        check_increasing(self.states.iter().map(|s| s.epoch))?;
        let id = entity_id(EntityKind::Satellite, &self.name);
        let first = &self.states[0];
        let availability = TimeInterval {
            start: first.epoch,
            stop: self.states[self.states.len() - 1].epoch,
        };

        let position = Position::from_states(&self.states, config.with_velocity, config.interpolation)?;

        let orientation = if config.display_attitude {
            if self.attitudes.is_empty() {
                return Err(CzmlError::WrongAttitudeVariant(
                    "attitude display requested without an attitude list",
                ));
            }
            Some(Orientation::from_attitudes(
                &self.attitudes,
                OrientationFrame::EarthFixed,
                None,
                config.interpolation,
            )?)
        } else {
            None
        };

        let mut path = Path::new(availability, config.color);
        if config.display_one_period {
            match first.period() {
                Some(period) => path = path.one_period(period),
                None => log::warn!("{} is not on a closed orbit, showing its full trail", id),
            }
        }

        let marker = match &config.marker {
            Some(asset) => Marker::from_asset(asset.clone())?.with_color(config.color),
            None => Marker::Point(Point::new(config.color, 8.0)),
        };
        let label = config
            .show_label
            .then(|| Label::new(self.name.clone()).with_color(config.color));

        let reference_system = if config.display_reference_system {
            let source = if self.attitudes.len() == self.states.len() {
                AxisSource::Body
            } else {
                AxisSource::Orbital(LocalOrbitalFrame::Qsw)
            };
            Some(ReferenceSystem::new(
                &id,
                &self.states,
                &self.attitudes,
                source,
                config.reference_axis_length,
                config.interpolation,
            )?)
        } else {
            None
        };

        log::debug!("Built {} with {} samples", id, self.states.len());

        Ok(Satellite {
            id,
            name: self.name,
            parent: None,
            availability,
            color: config.color,
            semi_major_axis: first.semi_major_axis(),
            states: self.states,
            attitudes: self.attitudes,
            position: Some(position),
            orientation,
            path,
            marker,
            label,
            reference_system,
        })
    }
}

/// Satellite with a sampled inertial trajectory
#[derive(Debug, Clone)]
pub struct Satellite {
    id: String,
    name: String,
    parent: Option<String>,
    availability: TimeInterval,
    color: Color,
    semi_major_axis: f64,
    states: Vec<OrbitalState>,
    attitudes: Vec<Attitude>,
    position: Option<Position>,
    orientation: Option<Orientation>,
    path: Path,
    marker: Marker,
    label: Option<Label>,
    reference_system: Option<ReferenceSystem>,
}

impl Satellite {
    pub fn builder(name: impl Into<String>, states: Vec<OrbitalState>) -> SatelliteBuilder {
        SatelliteBuilder::new(name, states)
    }

    /// Span of the trajectory samples
    pub fn interval(&self) -> TimeInterval {
        self.availability
    }

    pub fn states(&self) -> &[OrbitalState] {
        &self.states
    }

    pub fn attitudes(&self) -> &[Attitude] {
        &self.attitudes
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Semi-major axis at the first sample, in meters
    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub(crate) fn set_parent(&mut self, parent: &str) {
        self.parent = Some(parent.to_string());
    }
}

impl Entity for Satellite {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Satellite
    }

    fn availability(&self) -> Option<TimeInterval> {
        Some(self.availability)
    }

    fn write_block(&self, stream: &mut CzmlStream) -> Result<()> {
        {
            let mut packet = open_block(stream, &self.id, &self.name, Some(&self.availability));
            if let Some(parent) = &self.parent {
                packet.write_parent(parent);
            }
            if let Some(position) = &self.position {
                position.write(&mut packet)?;
            }
            if let Some(orientation) = &self.orientation {
                orientation.write(&mut packet)?;
            }
            self.marker.write(&mut packet)?;
            if let Some(label) = &self.label {
                label.write(&mut packet)?;
            }
            self.path.write(&mut packet)?;
        }

        if let Some(triad) = &self.reference_system {
            triad.write_block(stream)?;
        }
        Ok(())
    }

    fn release(&mut self) {
        self.states = Vec::new();
        self.attitudes = Vec::new();
        self.position = None;
        self.orientation = None;
        if let Some(triad) = &mut self.reference_system {
            triad.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::fixtures::{circular_orbit, render, t0, CircularOrbit, LEO_RADIUS};
    use crate::time::{offset_seconds, TimeScale};

    #[test]
    fn test_satellite_from_clock() {
        let clock = Clock::new(t0(), offset_seconds(&t0(), 3600.0), TimeScale::Utc, 60.0).unwrap();
        let orbit = CircularOrbit { radius: LEO_RADIUS };
        let sat = SatelliteBuilder::from_ephemeris("demo", &orbit, &clock)
            .unwrap()
            .color(Color::RED)
            .build()
            .unwrap();

        assert_eq!(sat.id(), "SAT/demo");
        assert_eq!(sat.states().len(), 60);
        let packets = render(&sat);
        assert_eq!(packets.len(), 1);
        let p = &packets[0];
        assert_eq!(p["position"]["cartesian"].as_array().unwrap().len(), 60 * 4);
        assert_eq!(p["position"]["interpolationDegree"], 5);
        assert_eq!(p["point"]["color"]["rgba"][0], 255);
        assert_eq!(p["label"]["text"], "demo");
        assert!(p.get("orientation").is_none());
    }

    #[test]
    fn test_display_options() {
        let states = circular_orbit(LEO_RADIUS, 10, 60.0);
        let attitudes: Vec<_> = states
            .iter()
            .map(|s| Attitude::new(s.epoch, nalgebra::UnitQuaternion::identity()))
            .collect();
        let sat = Satellite::builder("demo", states)
            .attitudes(attitudes)
            .display_one_period(true)
            .display_attitude(true)
            .display_reference_system(true)
            .interpolation_degree(7)
            .show_label(false)
            .build()
            .unwrap();

        let packets = render(&sat);
        assert_eq!(packets.len(), 4);
        let p = &packets[0];
        let period = sat.states()[0].period().unwrap();
        assert!((p["path"]["trailTime"].as_f64().unwrap() - period).abs() < 1e-6);
        assert_eq!(p["path"]["leadTime"], 0.0);
        assert!(p["orientation"]["unitQuaternion"].is_array());
        assert_eq!(p["position"]["interpolationDegree"], 7);
        assert!(p.get("label").is_none());
        assert_eq!(packets[1]["id"], "REF/SAT/demo/X");
    }

    #[test]
    fn test_attitude_display_without_attitudes() {
        let result = Satellite::builder("demo", circular_orbit(LEO_RADIUS, 3, 60.0))
            .display_attitude(true)
            .build();
        assert!(matches!(result, Err(CzmlError::WrongAttitudeVariant(_))));
    }

    #[test]
    fn test_unknown_marker_extension() {
        let result = Satellite::builder("demo", circular_orbit(LEO_RADIUS, 3, 60.0))
            .marker("sat.obj")
            .build();
        assert!(matches!(result, Err(CzmlError::UnknownAssetExtension(_))));
    }

    #[test]
    fn test_release_drops_samples() {
        let mut sat = Satellite::builder("demo", circular_orbit(LEO_RADIUS, 3, 60.0))
            .build()
            .unwrap();
        sat.release();
        assert!(sat.states().is_empty());
        assert_eq!(sat.id(), "SAT/demo");
        let packets = render(&sat);
        assert!(packets[0].get("position").is_none());
    }

    #[test]
    fn test_empty_states_rejected() {
        assert!(Satellite::builder("demo", Vec::new()).build().is_err());
    }
}
