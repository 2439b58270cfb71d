//! Common types used across ddsdecode

use serde::{Deserialize, Serialize};

/// A single 8-bit-per-channel RGBA pixel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build from an RGB triple and a separate alpha value
    pub const fn from_rgb(rgb: [u8; 3], a: u8) -> Self {
        Self { r: rgb[0], g: rgb[1], b: rgb[2], a }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from(value: [u8; 4]) -> Self {
        Self::new(value[0], value[1], value[2], value[3])
    }
}

impl From<Rgba8> for [u8; 4] {
    fn from(value: Rgba8) -> Self {
        value.to_array()
    }
}

impl std::fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

/// Width and height of an image in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Check whether `(x, y)` lies inside `[0, width) x [0, height)`
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Abstract color model advertised by a pixel format.
///
/// Advisory metadata only: decoded surfaces are always RGBA8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorModel {
    /// Four 8-bit channels
    Rgba8,
    /// Four 16-bit channels
    Rgba16,
    /// Luma plus two chroma channels
    YCbCr,
    /// 8-bit luminance
    Gray8,
    /// 16-bit luminance
    Gray16,
    /// Alpha channel only
    Alpha,
}

impl std::fmt::Display for ColorModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColorModel::Rgba8 => "RGBA8",
            ColorModel::Rgba16 => "RGBA16",
            ColorModel::YCbCr => "YCbCr",
            ColorModel::Gray8 => "Gray8",
            ColorModel::Gray16 => "Gray16",
            ColorModel::Alpha => "Alpha",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_array_conversion() {
        let px = Rgba8::new(1, 2, 3, 4);
        let arr: [u8; 4] = px.into();
        assert_eq!(arr, [1, 2, 3, 4]);
        assert_eq!(Rgba8::from(arr), px);
    }

    #[test]
    fn test_rgba_display() {
        assert_eq!(Rgba8::new(170, 85, 0, 255).to_string(), "#AA5500FF");
    }

    #[test]
    fn test_dimensions_contains() {
        let dims = Dimensions::new(5, 5);
        assert!(dims.contains(4, 4));
        assert!(!dims.contains(5, 0));
        assert!(!dims.contains(0, 5));
        assert_eq!(dims.pixel_count(), 25);
    }
}
