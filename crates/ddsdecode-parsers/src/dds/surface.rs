//! Decoded pixel surfaces

use ddsdecode_core::{Dimensions, Rgba8};

use super::uncompressed::UncompressedUnpacker;

/// A decoded, read-only 2-D pixel store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelSurface {
    /// Materialized row-major RGBA8 bytes (block-compressed sources)
    Dense {
        dimensions: Dimensions,
        pixels: Vec<u8>,
    },
    /// Pixels computed on access (uncompressed sources)
    Packed(UncompressedUnpacker),
}

impl PixelSurface {
    /// Wrap a dense buffer; `pixels` must hold `width * height * 4` bytes
    pub(crate) fn dense(dimensions: Dimensions, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len() as u64, dimensions.pixel_count() * 4);
        PixelSurface::Dense { dimensions, pixels }
    }

    pub fn dimensions(&self) -> Dimensions {
        match self {
            PixelSurface::Dense { dimensions, .. } => *dimensions,
            PixelSurface::Packed(unpacker) => unpacker.dimensions(),
        }
    }

    pub fn width(&self) -> u32 {
        self.dimensions().width
    }

    pub fn height(&self) -> u32 {
        self.dimensions().height
    }

    /// Pixel at `(x, y)`, or `None` outside the bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        match self {
            PixelSurface::Dense { dimensions, pixels } => {
                if !dimensions.contains(x, y) {
                    return None;
                }
                let offset = 4 * (y as usize * dimensions.width as usize + x as usize);
                let px = pixels.get(offset..offset + 4)?;
                Some(Rgba8::new(px[0], px[1], px[2], px[3]))
            }
            PixelSurface::Packed(unpacker) => unpacker.pixel(x, y),
        }
    }

    /// Borrow the dense buffer when the surface is materialized
    pub fn as_rgba8(&self) -> Option<&[u8]> {
        match self {
            PixelSurface::Dense { pixels, .. } => Some(pixels),
            PixelSurface::Packed(_) => None,
        }
    }

    /// Row-major RGBA8 bytes for the whole surface
    pub fn to_rgba8(&self) -> Vec<u8> {
        match self {
            PixelSurface::Dense { pixels, .. } => pixels.clone(),
            PixelSurface::Packed(unpacker) => {
                let Dimensions { width, height } = unpacker.dimensions();
                let mut out = Vec::with_capacity(width as usize * height as usize * 4);
                for y in 0..height {
                    for x in 0..width {
                        let px = unpacker.pixel(x, y).unwrap_or_default();
                        out.extend_from_slice(&px.to_array());
                    }
                }
                out
            }
        }
    }

    /// Consume the surface into row-major RGBA8 bytes
    pub fn into_rgba8(self) -> Vec<u8> {
        match self {
            PixelSurface::Dense { pixels, .. } => pixels,
            packed @ PixelSurface::Packed(_) => packed.to_rgba8(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_lookup() {
        let pixels: Vec<u8> = (0..24).collect();
        let surface = PixelSurface::dense(Dimensions::new(3, 2), pixels);

        assert_eq!(surface.width(), 3);
        assert_eq!(surface.height(), 2);
        assert_eq!(surface.pixel(0, 0), Some(Rgba8::new(0, 1, 2, 3)));
        assert_eq!(surface.pixel(2, 1), Some(Rgba8::new(20, 21, 22, 23)));
        assert_eq!(surface.pixel(3, 0), None);
        assert_eq!(surface.pixel(0, 2), None);
    }

    #[test]
    fn test_into_rgba8_dense() {
        let surface = PixelSurface::dense(Dimensions::new(1, 1), vec![9, 8, 7, 6]);
        assert_eq!(surface.as_rgba8(), Some(&[9u8, 8, 7, 6][..]));
        assert_eq!(surface.into_rgba8(), vec![9, 8, 7, 6]);
    }
}
