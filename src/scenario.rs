//! Scenario files: JSON description of a scene, loaded and turned into a [`Document`]
//!
//! A scenario lists the clock, the central body, satellites with their
//! propagated samples, ground stations and the derived displays linking them.
//! Entities refer to each other by name. Files ending in `.gz` are read through
//! a gzip decoder.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use nalgebra::{DMatrix, Quaternion, UnitQuaternion, Vector3};
use serde::Deserialize;

use crate::czml::{Color, Interpolation};
use crate::document::Document;
use crate::entities::{
    AttitudePointing, BodyDisplay, CollisionDisplay, Constellation, CovarianceDisplay, Entity,
    FieldOfObservation, GroundStation, GroundStationBuilder, GroundTrack, Header,
    LineOfVisibility, Maneuver, ManeuverDisplay, ManeuverStyle, Satellite, SatelliteBuilder,
    DEFAULT_APERTURE_DEG, DEFAULT_COLLISION_THRESHOLD_M,
};
use crate::geometry::{BodyShape, Geodetic, LocalOrbitalFrame};
use crate::state::{Attitude, CovarianceSample, OrbitalState};
use crate::time::{Clock, ClockRange, ClockStep, TimeScale};

/// Scene clock bounds and playback policy
#[derive(Debug, Clone, Deserialize)]
pub struct ClockSpec {
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    #[serde(default)]
    pub scale: TimeScale,
    /// Sampling tick in seconds
    pub tick: f64,
    #[serde(default)]
    pub range: ClockRange,
    /// Current instant, in the same scale as the bounds
    #[serde(default)]
    pub current: Option<DateTime<Utc>>,
    /// Playback speed; defaults to the tick
    #[serde(default)]
    pub multiplier: Option<f64>,
    #[serde(default)]
    pub step: ClockStep,
}

impl ClockSpec {
    /// Clock with every bound shifted from the declared scale to UTC
    pub fn to_clock(&self) -> Result<Clock> {
        let mut clock = Clock::new(self.start, self.stop, self.scale, self.tick)
            .context("Invalid scenario clock")?
            .with_range(self.range)
            .with_playback(self.multiplier.unwrap_or(self.tick), self.step)
            .context("Invalid scenario clock playback")?;
        if let Some(current) = self.current {
            clock = clock
                .with_current(self.scale.to_utc(current))
                .context("Invalid scenario clock current instant")?;
        }
        Ok(clock)
    }
}

/// Central body shape and whether it is drawn
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BodySpec {
    pub shape: BodyShape,
    pub show: bool,
    pub color: Color,
}

impl Default for BodySpec {
    fn default() -> Self {
        Self {
            shape: BodyShape::wgs84(),
            show: false,
            color: Color::BLUE.with_alpha(80),
        }
    }
}

/// Body moving along its own samples (e.g. the Moon)
#[derive(Debug, Clone, Deserialize)]
pub struct OrbitingBodySpec {
    pub shape: BodyShape,
    #[serde(default = "default_body_color")]
    pub color: Color,
    pub samples: Vec<SampleSpec>,
}

fn default_body_color() -> Color {
    Color::WHITE.with_alpha(200)
}

/// One propagated sample (meters, m/s, inertial)
#[derive(Debug, Clone, Deserialize)]
pub struct SampleSpec {
    pub epoch: DateTime<Utc>,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    /// Body-to-inertial quaternion, scalar first
    #[serde(default)]
    pub attitude: Option<[f64; 4]>,
    /// Square state covariance, row-major, position block first
    #[serde(default)]
    pub covariance: Option<Vec<Vec<f64>>>,
}

impl SampleSpec {
    fn state(&self) -> OrbitalState {
        OrbitalState::new(
            Vector3::from(self.position),
            Vector3::from(self.velocity),
            self.epoch,
        )
    }

    fn attitude(&self) -> Option<Attitude> {
        self.attitude.map(|[w, x, y, z]| {
            Attitude::new(
                self.epoch,
                UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)),
            )
        })
    }

    fn covariance(&self) -> Result<Option<CovarianceSample>> {
        let Some(rows) = &self.covariance else {
            return Ok(None);
        };
        let n = rows.len();
        if rows.iter().any(|row| row.len() != n) {
            bail!("Covariance at {} is not square", self.epoch);
        }
        let matrix = DMatrix::from_fn(n, n, |i, j| rows[i][j]);
        Ok(Some(CovarianceSample::new(self.epoch, matrix)?))
    }
}

/// Covariance ellipsoid options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CovarianceSpec {
    pub frame: LocalOrbitalFrame,
    pub sigma: f64,
}

impl Default for CovarianceSpec {
    fn default() -> Self {
        Self {
            frame: LocalOrbitalFrame::Qsw,
            sigma: 1.0,
        }
    }
}

/// Visibility cone options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConeSpec {
    pub aperture_deg: f64,
    pub length: Option<f64>,
    /// Satellite sizing a station cone
    pub observing: Option<String>,
}

impl Default for ConeSpec {
    fn default() -> Self {
        Self {
            aperture_deg: DEFAULT_APERTURE_DEG,
            length: None,
            observing: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManeuverSpec {
    pub epoch: DateTime<Utc>,
    /// Burn duration in seconds; zero for an impulse
    #[serde(default)]
    pub duration: f64,
    pub delta_v: [f64; 3],
}

/// Satellite with its samples and display flags
#[derive(Debug, Clone, Deserialize)]
pub struct SatelliteSpec {
    pub name: String,
    /// Constellation the satellite is grouped under
    #[serde(default)]
    pub constellation: Option<String>,
    pub samples: Vec<SampleSpec>,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub marker: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub show_label: bool,
    #[serde(default)]
    pub display_one_period: bool,
    #[serde(default)]
    pub display_attitude: bool,
    #[serde(default)]
    pub display_reference_system: bool,
    #[serde(default)]
    pub interpolation: Option<Interpolation>,
    #[serde(default)]
    pub with_velocity: bool,
    #[serde(default)]
    pub ground_track: bool,
    #[serde(default)]
    pub attitude_pointing: bool,
    #[serde(default)]
    pub field_of_observation: Option<ConeSpec>,
    #[serde(default)]
    pub covariance: Option<CovarianceSpec>,
    #[serde(default)]
    pub maneuvers: Vec<ManeuverSpec>,
}

fn default_true() -> bool {
    true
}

/// Ground station given in degrees and meters
#[derive(Debug, Clone, Deserialize)]
pub struct GroundStationSpec {
    pub name: String,
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub model: Option<PathBuf>,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub field_of_observation: Option<ConeSpec>,
}

/// Station-to-satellite line shown above a minimum elevation
#[derive(Debug, Clone, Deserialize)]
pub struct VisibilitySpec {
    pub station: String,
    pub satellite: String,
    #[serde(default)]
    pub min_elevation_deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollisionSpec {
    pub first: String,
    pub second: String,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_COLLISION_THRESHOLD_M
}

/// Complete scene description
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub clock: ClockSpec,
    #[serde(default)]
    pub body: BodySpec,
    #[serde(default)]
    pub orbiting_bodies: Vec<OrbitingBodySpec>,
    #[serde(default)]
    pub satellites: Vec<SatelliteSpec>,
    #[serde(default)]
    pub ground_stations: Vec<GroundStationSpec>,
    #[serde(default)]
    pub visibility: Vec<VisibilitySpec>,
    #[serde(default)]
    pub collisions: Vec<CollisionSpec>,
}

/// Load a scenario from JSON, gzip-compressed when the path ends in `.gz`
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    log::info!("Loading scenario from {:?}", path);

    let file =
        File::open(path).with_context(|| format!("Failed to open scenario file: {:?}", path))?;
    let reader = BufReader::new(file);

    let gzipped = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("gz"));
    let scenario: Scenario = if gzipped {
        serde_json::from_reader(GzDecoder::new(reader))
    } else {
        serde_json::from_reader(reader)
    }
    .with_context(|| format!("Failed to parse scenario JSON: {:?}", path))?;

    log::info!(
        "Loaded scenario {:?}: {} satellites, {} ground stations",
        scenario.name,
        scenario.satellites.len(),
        scenario.ground_stations.len()
    );
    Ok(scenario)
}

impl Scenario {
    pub fn clock(&self) -> Result<Clock> {
        self.clock.to_clock()
    }

    /// Build every entity; derived displays come after the entities they follow
    pub fn build_document(&self) -> Result<Document> {
        let clock = self.clock()?;
        let body = &self.body.shape;
        let mut document = Document::builder().header(Header::new(self.name.clone(), clock));

        if self.body.show {
            document = document.with(BodyDisplay::central(body.clone(), self.body.color));
        }
        for spec in &self.orbiting_bodies {
            let states: Vec<_> = spec.samples.iter().map(SampleSpec::state).collect();
            document = document.with(
                BodyDisplay::orbiting(spec.shape.clone(), spec.color, &states)
                    .with_context(|| format!("Invalid samples for body {:?}", spec.shape.name))?,
            );
        }

        let satellites = self.build_satellites()?;
        let by_name: HashMap<&str, &Satellite> = self
            .satellites
            .iter()
            .map(|s| s.name.as_str())
            .zip(satellites.iter())
            .collect();
        let stations = self.build_stations()?;

        // Displays derived from the satellites and stations
        let mut derived: Vec<Box<dyn Entity>> = Vec::new();
        for (spec, sat) in self.satellites.iter().zip(&satellites) {
            if spec.ground_track {
                derived.push(Box::new(GroundTrack::new(sat, body)?));
            }
            if spec.attitude_pointing {
                derived.push(Box::new(
                    AttitudePointing::builder(sat)
                        .body(body.clone())
                        .build()
                        .with_context(|| format!("Attitude pointing of {:?}", spec.name))?,
                ));
            }
            if let Some(cone) = &spec.field_of_observation {
                let mut builder =
                    FieldOfObservation::satellite(sat, body.clone()).aperture_deg(cone.aperture_deg);
                if let Some(length) = cone.length {
                    builder = builder.length(length);
                }
                derived.push(Box::new(builder.build()?));
            }
            if let Some(cov) = &spec.covariance {
                let samples = spec
                    .samples
                    .iter()
                    .map(SampleSpec::covariance)
                    .filter_map(Result::transpose)
                    .collect::<Result<Vec<_>>>()?;
                if samples.is_empty() {
                    bail!("Satellite {:?} requests a covariance display without covariance samples", spec.name);
                }
                derived.push(Box::new(
                    CovarianceDisplay::builder(sat, samples)
                        .frame(cov.frame)
                        .sigma(cov.sigma)
                        .build()
                        .with_context(|| format!("Covariance display of {:?}", spec.name))?,
                ));
            }
            if !spec.maneuvers.is_empty() {
                let maneuvers: Vec<_> = spec
                    .maneuvers
                    .iter()
                    .map(|m| Maneuver::new(m.epoch, m.duration, Vector3::from(m.delta_v)))
                    .collect();
                derived.push(Box::new(ManeuverDisplay::new(
                    sat,
                    &maneuvers,
                    &ManeuverStyle::default(),
                )?));
            }
        }

        for (spec, gs) in self.ground_stations.iter().zip(&stations) {
            if let Some(cone) = &spec.field_of_observation {
                let mut builder = FieldOfObservation::station(gs).aperture_deg(cone.aperture_deg);
                if let Some(target) = &cone.observing {
                    builder = builder.observing(find_satellite(&by_name, target)?);
                }
                if let Some(length) = cone.length {
                    builder = builder.length(length);
                }
                derived.push(Box::new(builder.build()?));
            }
        }

        for spec in &self.visibility {
            derived.push(Box::new(
                LineOfVisibility::builder(
                    find_station(&stations, &spec.station)?,
                    find_satellite(&by_name, &spec.satellite)?,
                )
                    .min_elevation_deg(spec.min_elevation_deg)
                    .build()?,
            ));
        }

        for spec in &self.collisions {
            derived.push(Box::new(CollisionDisplay::new(
                find_satellite(&by_name, &spec.first)?,
                find_satellite(&by_name, &spec.second)?,
                spec.threshold,
            )?));
        }

        document = document.with_all(stations);
        for entity in self.group_satellites(satellites)? {
            document = document.with_boxed(entity);
        }
        for entity in derived {
            document = document.with_boxed(entity);
        }
        Ok(document.build()?)
    }

    fn build_satellites(&self) -> Result<Vec<Satellite>> {
        let mut seen = HashMap::new();
        let mut satellites = Vec::with_capacity(self.satellites.len());
        for spec in &self.satellites {
            if seen.insert(spec.name.as_str(), ()).is_some() {
                bail!("Duplicate satellite name {:?}", spec.name);
            }

            let states = spec.samples.iter().map(SampleSpec::state).collect();
            let attitudes = spec.samples.iter().filter_map(SampleSpec::attitude).collect();

            let mut builder = SatelliteBuilder::new(spec.name.clone(), states)
                .attitudes(attitudes)
                .show_label(spec.show_label)
                .display_one_period(spec.display_one_period)
                .display_attitude(spec.display_attitude)
                .display_reference_system(spec.display_reference_system)
                .with_velocity(spec.with_velocity);
            if let Some(color) = spec.color {
                builder = builder.color(color);
            }
            if let Some(marker) = &spec.marker {
                builder = builder.marker(marker.clone());
            }
            if let Some(interpolation) = spec.interpolation {
                builder = builder.interpolation(interpolation);
            }

            satellites.push(
                builder
                    .build()
                    .with_context(|| format!("Invalid satellite {:?}", spec.name))?,
            );
        }
        Ok(satellites)
    }

    fn build_stations(&self) -> Result<Vec<GroundStation>> {
        self.ground_stations
            .iter()
            .map(|spec| {
                let location = Geodetic::from_degrees(spec.longitude_deg, spec.latitude_deg, spec.height);
                let mut builder =
                    GroundStationBuilder::new(spec.name.clone(), location).body(self.body.shape.clone());
                if let Some(model) = &spec.model {
                    builder = builder.model(model.clone());
                }
                if let Some(color) = spec.color {
                    builder = builder.color(color);
                }
                builder
                    .build()
                    .with_context(|| format!("Invalid ground station {:?}", spec.name))
            })
            .collect()
    }

    /// Ungrouped satellites in file order, each constellation at its first member
    fn group_satellites(&self, satellites: Vec<Satellite>) -> Result<Vec<Box<dyn Entity>>> {
        let mut entities: Vec<Box<dyn Entity>> = Vec::new();
        let mut groups: Vec<(String, Vec<Satellite>)> = Vec::new();
        let mut slots: Vec<Option<usize>> = Vec::new();

        for (spec, sat) in self.satellites.iter().zip(satellites) {
            match &spec.constellation {
                Some(name) => match groups.iter().position(|(n, _)| n == name) {
                    Some(index) => groups[index].1.push(sat),
                    None => {
                        slots.push(Some(groups.len()));
                        groups.push((name.clone(), vec![sat]));
                    }
                },
                None => {
                    slots.push(None);
                    entities.push(Box::new(sat));
                }
            }
        }

        let mut ungrouped = entities.into_iter();
        let mut groups = groups.into_iter();
        let mut ordered: Vec<Box<dyn Entity>> = Vec::with_capacity(slots.len());
        for slot in slots {
            let next: Option<Box<dyn Entity>> = match slot {
                None => ungrouped.next(),
                Some(_) => match groups.next() {
                    Some((name, members)) => Some(Box::new(Constellation::new(name, members)?)),
                    None => None,
                },
            };
            ordered.extend(next);
        }
        Ok(ordered)
    }
}

fn find_satellite<'a>(by_name: &HashMap<&str, &'a Satellite>, name: &str) -> Result<&'a Satellite> {
    by_name
        .get(name)
        .copied()
        .with_context(|| format!("Unknown satellite {:?}", name))
}

fn find_station<'a>(stations: &'a [GroundStation], name: &str) -> Result<&'a GroundStation> {
    stations
        .iter()
        .find(|s| s.name() == name)
        .with_context(|| format!("Unknown ground station {:?}", name))
}
