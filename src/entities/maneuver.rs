//! Maneuver arrows

use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use super::{open_block, Entity, Satellite};
use crate::czml::{Color, CzmlStream, ReferenceFrame};
use crate::error::{CzmlError, Result};
use crate::properties::{Polyline, Property};
use crate::reference::{entity_id, EntityKind};
use crate::state::interpolate_state;
use crate::time::{iso8601, offset_seconds, TimeInterval};

/// Impulsive or finite burn, inertial frame
#[derive(Debug, Clone, PartialEq)]
pub struct Maneuver {
    pub epoch: DateTime<Utc>,
    /// Burn duration in seconds (zero for impulsive)
    pub duration: f64,
    /// Velocity increment in m/s
    pub delta_v: Vector3<f64>,
}

impl Maneuver {
    pub fn new(epoch: DateTime<Utc>, duration: f64, delta_v: Vector3<f64>) -> Self {
        Self {
            epoch,
            duration,
            delta_v,
        }
    }

    /// Mean acceleration over the burn; impulsive burns have none
    pub fn acceleration(&self) -> Option<Vector3<f64>> {
        (self.duration > 0.0).then(|| self.delta_v / self.duration)
    }
}

/// Display options for maneuver arrows
#[derive(Debug, Clone, PartialEq)]
pub struct ManeuverStyle {
    pub show_thrust: bool,
    pub show_acceleration: bool,
    /// Arrow length per m/s of delta-v, in meters
    pub thrust_scale: f64,
    /// Arrow length per m/s² of acceleration, in meters
    pub acceleration_scale: f64,
    /// Minimum time an arrow stays visible, in seconds
    pub display_time: f64,
    pub thrust_color: Color,
    pub acceleration_color: Color,
}

impl Default for ManeuverStyle {
    fn default() -> Self {
        Self {
            show_thrust: true,
            show_acceleration: false,
            thrust_scale: 50_000.0,
            acceleration_scale: 5.0e6,
            display_time: 600.0,
            thrust_color: Color::ORANGE,
            acceleration_color: Color::MAGENTA,
        }
    }
}

#[derive(Debug, Clone)]
struct Arrow {
    id: String,
    availability: TimeInterval,
    line: Polyline,
}

/// Sequence of arrows drawn at a satellite's maneuvers
#[derive(Debug, Clone)]
pub struct ManeuverDisplay {
    id: String,
    name: String,
    availability: Option<TimeInterval>,
    arrows: Vec<Arrow>,
}

impl ManeuverDisplay {
    pub fn new(satellite: &Satellite, maneuvers: &[Maneuver], style: &ManeuverStyle) -> Result<Self> {
        let id = entity_id(EntityKind::Maneuver, satellite.id());
        if !style.show_thrust && !style.show_acceleration {
            log::warn!("{}: neither thrust nor acceleration arrows enabled", id);
        }

        let states = satellite.states();
        let mut arrows = Vec::new();
        for (index, maneuver) in maneuvers.iter().enumerate() {
            // Arrow starts at the state interpolated to the burn instant
            let origin = interpolate_state(states, maneuver.epoch)
                .ok_or_else(|| {
                    CzmlError::InvalidSamples(format!(
                        "maneuver at {} outside {} samples",
                        iso8601(&maneuver.epoch),
                        satellite.id()
                    ))
                })?
                .position;
            let shown = maneuver.duration.max(style.display_time);
            let availability = TimeInterval::new(maneuver.epoch, offset_seconds(&maneuver.epoch, shown))?;
            let arrow_id = format!("{}/{}", id, index);

            if style.show_thrust {
                let tip = origin + maneuver.delta_v * style.thrust_scale;
                arrows.push(Arrow {
                    line: Polyline::vector(&arrow_id, &[origin, tip], style.thrust_color, 8.0)?
                        .with_frame(ReferenceFrame::Inertial),
                    id: arrow_id.clone(),
                    availability,
                });
            }
            if style.show_acceleration {
                match maneuver.acceleration() {
                    Some(acceleration) => {
                        let tip = origin + acceleration * style.acceleration_scale;
                        let acc_id = format!("{}/acceleration", arrow_id);
                        arrows.push(Arrow {
                            line: Polyline::vector(&acc_id, &[origin, tip], style.acceleration_color, 6.0)?
                                .with_frame(ReferenceFrame::Inertial),
                            id: acc_id,
                            availability,
                        });
                    }
                    None => log::debug!("{}: impulsive burn, no acceleration arrow", arrow_id),
                }
            }
        }

        let availability = match (arrows.first(), arrows.last()) {
            (Some(first), Some(last)) => Some(TimeInterval {
                start: first.availability.start,
                stop: last.availability.stop.max(first.availability.stop),
            }),
            _ => None,
        };

        Ok(Self {
            name: format!("{} maneuvers", satellite.name()),
            id,
            availability,
            arrows,
        })
    }

    pub fn arrow_count(&self) -> usize {
        self.arrows.len()
    }
}

impl Entity for ManeuverDisplay {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Maneuver
    }

    fn availability(&self) -> Option<TimeInterval> {
        self.availability
    }

    fn write_block(&self, stream: &mut CzmlStream) -> Result<()> {
        for arrow in &self.arrows {
            let mut packet = open_block(stream, &arrow.id, &self.name, Some(&arrow.availability));
            arrow.line.write(&mut packet)?;
        }
        Ok(())
    }

    fn release(&mut self) {
        self.arrows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::fixtures::{circular_orbit, render, t0, LEO_RADIUS};

    fn satellite() -> Satellite {
        Satellite::builder("demo", circular_orbit(LEO_RADIUS, 20, 60.0)).build().unwrap()
    }

    #[test]
    fn test_thrust_and_acceleration_arrows() {
        let sat = satellite();
        let burns = [
            Maneuver::new(offset_seconds(&t0(), 90.0), 10.0, Vector3::new(0.0, 2.0, 0.0)),
            Maneuver::new(offset_seconds(&t0(), 600.0), 0.0, Vector3::new(0.0, -1.0, 0.0)),
        ];
        let style = ManeuverStyle {
            show_acceleration: true,
            ..Default::default()
        };
        let display = ManeuverDisplay::new(&sat, &burns, &style).unwrap();
        // Impulsive burn has no acceleration arrow
        assert_eq!(display.arrow_count(), 3);

        let packets = render(&display);
        assert_eq!(packets[0]["id"], "MAN/SAT/demo/0");
        assert_eq!(packets[1]["id"], "MAN/SAT/demo/0/acceleration");
        assert_eq!(packets[2]["id"], "MAN/SAT/demo/1");

        let positions = packets[0]["polyline"]["positions"]["cartesian"].as_array().unwrap();
        let origin_y = positions[1].as_f64().unwrap();
        let tip_y = positions[4].as_f64().unwrap();
        assert!((tip_y - origin_y - 100_000.0).abs() < 1e-6);
        assert!(packets[0]["polyline"]["material"]["polylineArrow"].is_object());
    }

    #[test]
    fn test_arrow_starts_at_burn_instant() {
        let sat = satellite();
        let epoch = offset_seconds(&t0(), 90.0);
        let burn = Maneuver::new(epoch, 0.0, Vector3::new(0.0, 1.0, 0.0));
        let display = ManeuverDisplay::new(&sat, &[burn], &ManeuverStyle::default()).unwrap();

        let packets = render(&display);
        let positions = packets[0]["polyline"]["positions"]["cartesian"].as_array().unwrap();
        let origin = Vector3::new(
            positions[0].as_f64().unwrap(),
            positions[1].as_f64().unwrap(),
            positions[2].as_f64().unwrap(),
        );
        let n = (crate::state::MU_EARTH / LEO_RADIUS.powi(3)).sqrt();
        let angle = n * 90.0;
        let truth = Vector3::new(LEO_RADIUS * angle.cos(), LEO_RADIUS * angle.sin(), 0.0);
        assert!((origin - truth).norm() < 5.0);
        assert!((origin - sat.states()[1].position).norm() > 100_000.0);
    }

    #[test]
    fn test_maneuver_outside_samples() {
        let sat = satellite();
        let early = Maneuver::new(offset_seconds(&t0(), -60.0), 0.0, Vector3::x());
        assert!(ManeuverDisplay::new(&sat, &[early], &ManeuverStyle::default()).is_err());
    }

    #[test]
    fn test_no_arrows_enabled() {
        let sat = satellite();
        let burn = Maneuver::new(offset_seconds(&t0(), 60.0), 0.0, Vector3::x());
        let style = ManeuverStyle {
            show_thrust: false,
            ..Default::default()
        };
        let display = ManeuverDisplay::new(&sat, &[burn], &style).unwrap();
        assert_eq!(display.arrow_count(), 0);
        assert!(display.availability().is_none());
    }
}
