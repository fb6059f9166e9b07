//! Low-level document writer
//!
//! Packets and properties are scoped guards: a [`PacketWriter`] or
//! [`PropertyWriter`] closes its element when dropped, so every exit path
//! (including early `?` returns) leaves the output well nested.
//!
//! # Example
//!
//! ```ignore
//! let mut stream = CzmlStream::new();
//! {
//!     let mut packet = stream.open_packet("SAT/ISS");
//!     packet.write_name("ISS");
//!     let mut position = packet.open_property("position");
//!     position.write_reference_frame(ReferenceFrame::Inertial);
//!     position.write_components("cartesian", &Vector3::new(7e6, 0.0, 0.0));
//! }
//! let bytes = stream.finish()?;
//! ```

mod stream;
mod values;

pub use stream::{CzmlStream, PacketWriter, PropertyWriter};
pub use values::*;
