//! orbit-czml - time-tagged scene documents for orbital mechanics outputs
//!
//! Turns propagated satellite states, ground stations and derived geometry
//! (visibility lines, cones, covariance ellipsoids, ground tracks, maneuvers)
//! into a CZML document: a JSON array of packets that a 3D globe viewer plays
//! back over a shared clock.
//!
//! # Modules
//!
//! - **time**: scene clock, sample instants and intervals
//! - **czml**: scoped packet/property writers over an in-memory stream
//! - **reference**: entity ids and cross-entity property references
//! - **state**: orbital states, attitudes, covariances and the ephemeris trait
//! - **geometry**: body shape, frames, covariance diagonalization, cones, windows
//! - **properties**: position, orientation, markers, paths, polylines, solids
//! - **entities**: header and every primary entity
//! - **document**: assembly, dedup and output
//! - **scenario**: JSON scenario loading

pub mod czml;
pub mod document;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod properties;
pub mod reference;
pub mod scenario;
pub mod state;
pub mod time;

pub use document::{Document, DocumentBuilder};
pub use entities::Entity;
pub use error::{CzmlError, Result};
pub use time::Clock;
