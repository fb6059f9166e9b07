//! Simulation time base
//!
//! A [`Clock`] is built once per scene and passed by reference into every builder
//! that needs per-step data, so all entities sample the same instants.

mod clock;
mod interval;

pub use clock::*;
pub use interval::*;
