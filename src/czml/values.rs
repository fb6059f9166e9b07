//! Typed payload values written into packets

use std::str::FromStr;

use nalgebra::{UnitQuaternion, Vector3};
use serde::Deserialize;

use crate::error::CzmlError;

/// Value that flattens into a fixed number of numeric components
///
/// Sampled properties interleave `[t, c0, c1, ...]` per sample.
pub trait CzmlValue {
    fn push_components(&self, out: &mut Vec<f64>);
}

impl CzmlValue for f64 {
    fn push_components(&self, out: &mut Vec<f64>) {
        out.push(*self);
    }
}

impl CzmlValue for Vector3<f64> {
    fn push_components(&self, out: &mut Vec<f64>) {
        out.extend_from_slice(&[self.x, self.y, self.z]);
    }
}

/// Quaternions are written `x, y, z, w`
impl CzmlValue for UnitQuaternion<f64> {
    fn push_components(&self, out: &mut Vec<f64>) {
        let q = self.as_ref();
        out.extend_from_slice(&[q.i, q.j, q.k, q.w]);
    }
}

/// Position followed by velocity
impl CzmlValue for (Vector3<f64>, Vector3<f64>) {
    fn push_components(&self, out: &mut Vec<f64>) {
        self.0.push_components(out);
        self.1.push_components(out);
    }
}

/// RGBA color, 0-255 per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "[u8; 4]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    pub const GREEN: Color = Color::rgba(0, 255, 0, 255);
    pub const BLUE: Color = Color::rgba(0, 0, 255, 255);
    pub const YELLOW: Color = Color::rgba(255, 255, 0, 255);
    pub const CYAN: Color = Color::rgba(0, 255, 255, 255);
    pub const MAGENTA: Color = Color::rgba(255, 0, 255, 255);
    pub const ORANGE: Color = Color::rgba(255, 165, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[u8; 4]> for Color {
    fn from(c: [u8; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }
}

/// Interpolation scheme for sampled properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationAlgorithm {
    Linear,
    Lagrange,
    Hermite,
}

impl InterpolationAlgorithm {
    pub fn as_czml(&self) -> &'static str {
        match self {
            Self::Linear => "LINEAR",
            Self::Lagrange => "LAGRANGE",
            Self::Hermite => "HERMITE",
        }
    }
}

impl FromStr for InterpolationAlgorithm {
    type Err = CzmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "lagrange" => Ok(Self::Lagrange),
            "hermite" => Ok(Self::Hermite),
            other => Err(CzmlError::InvalidSamples(format!(
                "unknown interpolation algorithm {:?}",
                other
            ))),
        }
    }
}

/// Algorithm plus fit degree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Interpolation {
    pub algorithm: InterpolationAlgorithm,
    pub degree: u32,
}

impl Interpolation {
    pub const fn linear() -> Self {
        Self {
            algorithm: InterpolationAlgorithm::Linear,
            degree: 1,
        }
    }

    pub const fn lagrange(degree: u32) -> Self {
        Self {
            algorithm: InterpolationAlgorithm::Lagrange,
            degree,
        }
    }

    pub const fn hermite(degree: u32) -> Self {
        Self {
            algorithm: InterpolationAlgorithm::Hermite,
            degree,
        }
    }
}

/// Lagrange degree 5, the default for propagated positions
impl Default for Interpolation {
    fn default() -> Self {
        Self::lagrange(5)
    }
}

/// Frame tag attached to cartesian positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceFrame {
    #[default]
    Fixed,
    Inertial,
}

impl ReferenceFrame {
    pub fn as_czml(&self) -> &'static str {
        match self {
            Self::Fixed => "FIXED",
            Self::Inertial => "INERTIAL",
        }
    }
}

/// Scalar that varies between two camera distances
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearFarScalar {
    pub near: f64,
    pub near_value: f64,
    pub far: f64,
    pub far_value: f64,
}

impl NearFarScalar {
    pub fn new(near: f64, near_value: f64, far: f64, far_value: f64) -> Self {
        Self {
            near,
            near_value,
            far,
            far_value,
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.near, self.near_value, self.far, self.far_value]
    }
}
