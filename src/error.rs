//! Error types for scene construction and document assembly
//!
//! Every variant names the invariant that was violated. Configuration errors are
//! raised by builders before any output is produced; assembly errors are raised
//! when the document is rendered.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CzmlError>;

#[derive(Debug, Error)]
pub enum CzmlError {
    /// Clock with a non-positive tick or an empty/inverted interval
    #[error("Invalid clock: {0}")]
    InvalidClock(String),

    /// Asset path whose extension is neither an image nor a 3D model
    #[error("Unknown asset file extension: {0:?}")]
    UnknownAssetExtension(String),

    /// Position type name that does not map to a known input shape
    #[error("Unknown position type: {0:?}")]
    UnknownPositionType(String),

    /// More than one model given to a single-station builder
    #[error("A single ground station accepts one model, got {count}")]
    MultipleModels { count: usize },

    /// Vector-only accessor called on a reference polyline
    #[error("Polyline {0:?} is not a vector polyline")]
    NotAVector(String),

    /// Vector polyline built from a position list of the wrong length
    #[error("Vector polyline needs exactly 2 positions, got {actual}")]
    PolylineSize { actual: usize },

    /// Reference polyline serialized before both endpoints were set
    #[error("Polyline {0:?} is missing an endpoint")]
    MissingReference(String),

    /// Reference polyline mixing a literal endpoint with a referenced one
    #[error("Polyline {0:?} mixes literal and referenced endpoints")]
    MixedEndpoints(String),

    /// Cone aperture half-angle outside (0, 90) degrees
    #[error("Aperture {degrees:.2} deg outside (0, 90)")]
    InvalidAperture { degrees: f64 },

    /// Single-attitude accessor on a sampled orientation or the reverse
    #[error("Wrong attitude variant: {0}")]
    WrongAttitudeVariant(&'static str),

    /// Time series with mismatched lengths, unordered instants or no samples
    #[error("Invalid samples: {0}")]
    InvalidSamples(String),

    /// Covariance matrix smaller than 3x3 or not finite
    #[error("Invalid covariance: {0}")]
    InvalidCovariance(String),

    /// Document rendered with no entities at all
    #[error("Document has no entities")]
    NoEntities,

    /// Document rendered without a header entity
    #[error("Document has no header")]
    NoHeader,

    /// Document holding more than one header entity
    #[error("Document has {0} headers, expected exactly one")]
    MultipleHeaders(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
