//! Derived geometry computed from propagated samples
//!
//! - **body**: oblate spheroid, geodetic conversions, ray intersection
//! - **frames**: Earth rotation and local orbital frames
//! - **covariance**: covariance-to-ellipsoid diagonalization with handedness correction
//! - **cone**: visibility cone sizing
//! - **projection**: ground footprints and attitude pointing on the body surface
//! - **windows**: boolean show windows (station visibility, close approaches)

mod body;
mod cone;
mod covariance;
mod frames;
mod projection;
mod windows;

pub use body::*;
pub use cone::*;
pub use covariance::*;
pub use frames::*;
pub use projection::*;
pub use windows::*;
