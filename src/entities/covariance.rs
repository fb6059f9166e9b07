//! Covariance ellipsoids following a satellite

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::{open_block, Entity, Satellite};
use crate::czml::{Color, CzmlStream, Interpolation};
use crate::error::{CzmlError, Result};
use crate::geometry::{covariance_ellipsoid, inertial_to_fixed, LocalOrbitalFrame};
use crate::properties::{Ellipsoid, Orientation, Position, Property};
use crate::reference::{entity_id, EntityKind, PropertyReference};
use crate::state::{check_increasing, CovarianceSample, OrbitalState};
use crate::time::{iso8601, TimeInterval};

/// Builder for [`CovarianceDisplay`]
pub struct CovarianceDisplayBuilder<'a> {
    satellite: &'a Satellite,
    covariances: Vec<CovarianceSample>,
    frame: LocalOrbitalFrame,
    sigma: f64,
    color: Color,
    interpolation: Interpolation,
}

impl CovarianceDisplayBuilder<'_> {
    /// Local orbital frame the covariance is rotated into before diagonalization
    pub fn frame(mut self, frame: LocalOrbitalFrame) -> Self {
        self.frame = frame;
        self
    }

    /// Number of standard deviations drawn (1.0 draws the one-sigma ellipsoid)
    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn build(self) -> Result<CovarianceDisplay> {
        let sat = self.satellite;
        check_increasing(self.covariances.iter().map(|c| c.epoch))?;
        if !(self.sigma > 0.0) {
            return Err(CzmlError::InvalidCovariance(format!(
                "sigma scale must be positive, got {}",
                self.sigma
            )));
        }

        let states: HashMap<DateTime<Utc>, &OrbitalState> =
            sat.states().iter().map(|s| (s.epoch, s)).collect();

        let mut instants = Vec::with_capacity(self.covariances.len());
        let mut radii = Vec::with_capacity(self.covariances.len());
        let mut rotations = Vec::with_capacity(self.covariances.len());
        for covariance in &self.covariances {
            let state = states.get(&covariance.epoch).ok_or_else(|| {
                CzmlError::InvalidCovariance(format!(
                    "no {} state at {}",
                    sat.id(),
                    iso8601(&covariance.epoch)
                ))
            })?;
            let axes = covariance_ellipsoid(state, covariance, self.frame, self.sigma)?;
            log::trace!("{} radii {:?}", iso8601(&covariance.epoch), axes.radii);

            instants.push(covariance.epoch);
            radii.push(axes.radii);
            // Orientation is written in the fixed frame directly
            rotations.push(inertial_to_fixed(&covariance.epoch) * axes.rotation);
        }

        let geometry = if instants.len() == 1 {
            CovarianceGeometry {
                ellipsoid: Ellipsoid::new(radii[0]).with_color(self.color),
                orientation: Orientation::constant(rotations[0]),
            }
        } else {
            CovarianceGeometry {
                ellipsoid: Ellipsoid::sampled(instants.clone(), radii, self.interpolation)?
                    .with_color(self.color),
                orientation: Orientation::sampled(instants.clone(), rotations, self.interpolation)?,
            }
        };

        Ok(CovarianceDisplay {
            id: entity_id(EntityKind::Covariance, sat.id()),
            name: format!("{} covariance", sat.name()),
            owner: sat.id().to_string(),
            availability: TimeInterval {
                start: instants[0],
                stop: instants[instants.len() - 1],
            },
            geometry: Some(geometry),
        })
    }
}

/// Static when built from a single covariance
#[derive(Debug, Clone)]
struct CovarianceGeometry {
    ellipsoid: Ellipsoid,
    orientation: Orientation,
}

/// Ellipsoid drawn around a satellite from its position covariance
///
/// The position is a reference to the satellite's own position, so only the
/// radii and orientation are sampled here.
#[derive(Debug, Clone)]
pub struct CovarianceDisplay {
    id: String,
    name: String,
    owner: String,
    availability: TimeInterval,
    geometry: Option<CovarianceGeometry>,
}

impl CovarianceDisplay {
    pub fn builder(satellite: &Satellite, covariances: Vec<CovarianceSample>) -> CovarianceDisplayBuilder<'_> {
        CovarianceDisplayBuilder {
            satellite,
            covariances,
            frame: LocalOrbitalFrame::default(),
            sigma: 1.0,
            color: Color::YELLOW.with_alpha(90),
            interpolation: Interpolation::lagrange(3),
        }
    }

    pub fn is_single_instant(&self) -> bool {
        self.geometry
            .as_ref()
            .map_or(false, |g| !g.ellipsoid.is_sampled())
    }
}

impl Entity for CovarianceDisplay {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Covariance
    }

    fn availability(&self) -> Option<TimeInterval> {
        Some(self.availability)
    }

    fn write_block(&self, stream: &mut CzmlStream) -> Result<()> {
        let Some(geometry) = &self.geometry else {
            return Ok(());
        };
        // A single covariance has no span of its own; it stays visible with its satellite
        let availability = geometry
            .ellipsoid
            .is_sampled()
            .then_some(&self.availability);

        let mut packet = open_block(stream, &self.id, &self.name, availability);
        Position::reference(PropertyReference::position_of(&self.owner)).write(&mut packet)?;
        geometry.orientation.write(&mut packet)?;
        geometry.ellipsoid.write(&mut packet)
    }

    fn release(&mut self) {
        self.geometry = None;
    }
}
