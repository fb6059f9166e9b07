//! Primary scene entities
//!
//! Every entity owns an id (see [`crate::reference::entity_id`]), a display name and
//! an optional availability interval. [`Entity::write_block`] opens one packet per
//! id it needs; [`Entity::release`] drops the heavy per-sample buffers once the
//! block has been written.
//!
//! # Available entities
//!
//! - **Header**: document packet carrying the clock
//! - **Satellite** / **Constellation**: sampled trajectories with markers and trails
//! - **GroundStation**: fixed site on the body surface
//! - **LineOfVisibility**: station-to-satellite line shown while above the horizon
//! - **FieldOfObservation**: visibility cone of a station or a satellite
//! - **AttitudePointing**: boresight trace projected on the body surface
//! - **CovarianceDisplay**: covariance ellipsoid following its satellite
//! - **GroundTrack**: sub-satellite point
//! - **CollisionDisplay**: close-approach line and marker
//! - **ManeuverDisplay**: thrust and acceleration arrows
//! - **ReferenceSystem**: body or local-orbital axis triad
//! - **BodyDisplay**: central or third body shape

mod attitude_pointing;
mod body_display;
mod collision;
mod constellation;
mod covariance;
mod field_of_observation;
mod ground_station;
mod ground_track;
mod header;
mod line_of_visibility;
mod maneuver;
mod reference_system;
mod satellite;

pub use attitude_pointing::*;
pub use body_display::*;
pub use collision::*;
pub use constellation::*;
pub use covariance::*;
pub use field_of_observation::*;
pub use ground_station::*;
pub use ground_track::*;
pub use header::*;
pub use line_of_visibility::*;
pub use maneuver::*;
pub use reference_system::*;
pub use satellite::*;

use crate::czml::{CzmlStream, PacketWriter};
use crate::error::Result;
use crate::reference::EntityKind;
use crate::time::TimeInterval;

/// An independent, addressable scene entity
pub trait Entity {
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    fn kind(&self) -> EntityKind;

    /// Interval over which the entity is shown; `None` means always
    fn availability(&self) -> Option<TimeInterval>;

    /// Serialize every packet of this entity
    fn write_block(&self, stream: &mut CzmlStream) -> Result<()>;

    /// Drop per-sample buffers after the block has been written
    ///
    /// Id and name stay valid.
    fn release(&mut self) {}
}

/// Open a packet with the common id, name and availability fields
pub(crate) fn open_block<'s>(
    stream: &'s mut CzmlStream,
    id: &str,
    name: &str,
    availability: Option<&TimeInterval>,
) -> PacketWriter<'s> {
    let mut packet = stream.open_packet(id);
    packet.write_name(name);
    if let Some(interval) = availability {
        packet.write_availability(interval);
    }
    packet
}
