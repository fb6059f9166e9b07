//! Billboard icons and 3D models
//!
//! Markers scale with distance through a near/far law so they stay legible
//! from close range out to a full-globe view.

use std::path::{Path as FsPath, PathBuf};

use super::{Point, Property};
use crate::czml::{Color, NearFarScalar, PacketWriter};
use crate::error::{CzmlError, Result};

/// On-screen height (pixels) a billboard is scaled to
pub const BILLBOARD_TARGET_PIXELS: f64 = 80.0;
const NEAR_DISTANCE: f64 = 1.0;
const FAR_DISTANCE: f64 = 1.0e9;

/// What an asset file renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Model,
}

/// Classify an asset by its file extension
pub fn classify_asset(path: &FsPath) -> Result<AssetKind> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "svg" => Ok(AssetKind::Image),
        "gltf" | "glb" => Ok(AssetKind::Model),
        _ => Err(CzmlError::UnknownAssetExtension(path.display().to_string())),
    }
}

/// Scale law keeping an image of `pixel_height` at a constant on-screen size
pub fn legible_scale(pixel_height: u32) -> NearFarScalar {
    let value = BILLBOARD_TARGET_PIXELS / f64::from(pixel_height.max(1));
    NearFarScalar::new(NEAR_DISTANCE, value, FAR_DISTANCE, value)
}

/// 2D icon
#[derive(Debug, Clone, PartialEq)]
pub struct Billboard {
    image: String,
    color: Color,
    scale: f64,
    scale_by_distance: Option<NearFarScalar>,
    show: bool,
}

impl Billboard {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            color: Color::WHITE,
            scale: 1.0,
            scale_by_distance: None,
            show: true,
        }
    }

    /// Billboard whose scale law is derived from the image's pixel height
    pub fn from_image_file(path: &FsPath) -> Result<Self> {
        let (_, height) = image::image_dimensions(path)?;
        log::debug!("Billboard {} is {} px high", path.display(), height);
        Ok(Self::new(path.display().to_string()).with_pixel_height(height))
    }

    pub fn with_pixel_height(mut self, pixel_height: u32) -> Self {
        self.scale_by_distance = Some(legible_scale(pixel_height));
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn scale_by_distance(&self) -> Option<&NearFarScalar> {
        self.scale_by_distance.as_ref()
    }
}

impl Property for Billboard {
    fn name(&self) -> &'static str {
        "billboard"
    }

    fn write(&self, packet: &mut PacketWriter<'_>) -> Result<()> {
        let mut prop = packet.open_property(self.name());
        prop.write_value("show", self.show);
        prop.write_value("image", self.image.as_str());
        prop.write_value("scale", self.scale);
        {
            let mut color = prop.open_property("color");
            color.write_color(&self.color);
        }
        if let Some(scalar) = &self.scale_by_distance {
            prop.write_near_far("scaleByDistance", scalar);
        }
        Ok(())
    }
}

/// glTF model
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    gltf: String,
    scale: f64,
    minimum_pixel_size: f64,
    maximum_scale: Option<f64>,
}

impl Model {
    pub fn new(gltf: impl Into<String>) -> Self {
        Self {
            gltf: gltf.into(),
            scale: 1.0,
            minimum_pixel_size: 64.0,
            maximum_scale: None,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_minimum_pixel_size(mut self, pixels: f64) -> Self {
        self.minimum_pixel_size = pixels;
        self
    }

    pub fn with_maximum_scale(mut self, scale: f64) -> Self {
        self.maximum_scale = Some(scale);
        self
    }
}

impl Property for Model {
    fn name(&self) -> &'static str {
        "model"
    }

    fn write(&self, packet: &mut PacketWriter<'_>) -> Result<()> {
        let mut prop = packet.open_property(self.name());
        prop.write_value("show", true);
        prop.write_value("gltf", self.gltf.as_str());
        prop.write_value("scale", self.scale);
        prop.write_value("minimumPixelSize", self.minimum_pixel_size);
        if let Some(max) = self.maximum_scale {
            prop.write_value("maximumScale", max);
        }
        Ok(())
    }
}

/// Visual marker of an entity
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    Billboard(Billboard),
    Model(Model),
    Point(Point),
}

impl Marker {
    /// Billboard or model depending on the asset's extension
    ///
    /// Image files that exist on disk get a pixel-height scale law.
    pub fn from_asset(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match classify_asset(&path)? {
            AssetKind::Model => Ok(Self::Model(Model::new(path.display().to_string()))),
            AssetKind::Image if path.is_file() => {
                Ok(Self::Billboard(Billboard::from_image_file(&path)?))
            }
            AssetKind::Image => Ok(Self::Billboard(Billboard::new(path.display().to_string()))),
        }
    }

    pub fn with_color(self, color: Color) -> Self {
        match self {
            Self::Billboard(b) => Self::Billboard(b.with_color(color)),
            Self::Point(p) => Self::Point(p.with_color(color)),
            model => model,
        }
    }

    pub fn write(&self, packet: &mut PacketWriter<'_>) -> Result<()> {
        match self {
            Self::Billboard(b) => b.write(packet),
            Self::Model(m) => m.write(packet),
            Self::Point(p) => p.write(packet),
        }
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::Point(Point::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::czml::CzmlStream;
    use serde_json::Value;

    fn render(marker: &Marker) -> Value {
        let mut stream = CzmlStream::new();
        {
            let mut packet = stream.open_packet("M");
            marker.write(&mut packet).unwrap();
        }
        let doc: Vec<Value> = serde_json::from_slice(&stream.finish().unwrap()).unwrap();
        doc[0].clone()
    }

    #[test]
    fn test_classify_asset() {
        assert_eq!(classify_asset(FsPath::new("sat.PNG")).unwrap(), AssetKind::Image);
        assert_eq!(classify_asset(FsPath::new("models/sat.glb")).unwrap(), AssetKind::Model);
        assert!(matches!(
            classify_asset(FsPath::new("sat.obj")),
            Err(CzmlError::UnknownAssetExtension(_))
        ));
        assert!(classify_asset(FsPath::new("noext")).is_err());
    }

    #[test]
    fn test_legible_scale_anchors() {
        for h in [16u32, 40, 80, 256] {
            let scalar = legible_scale(h);
            let expected = 80.0 / h as f64;
            assert_eq!(scalar.near, 1.0);
            assert_eq!(scalar.far, 1.0e9);
            assert!((scalar.near_value - expected).abs() < 1e-12);
            assert!((scalar.far_value - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_image_file_pixel_height() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.png");
        image::RgbaImage::new(16, 40).save(&path).unwrap();

        let marker = Marker::from_asset(&path).unwrap();
        let packet = render(&marker);
        let scalar = packet["billboard"]["scaleByDistance"]["nearFarScalar"]
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(scalar[1], 2.0);
        assert_eq!(scalar[3], 2.0);
    }

    #[test]
    fn test_model_marker() {
        let marker = Marker::from_asset("assets/iss.gltf").unwrap();
        let packet = render(&marker);
        assert_eq!(packet["model"]["gltf"], "assets/iss.gltf");
        assert!(packet.get("billboard").is_none());
    }
}
