//! Uncompressed, bit-mask described pixel data
//!
//! Pixels are unpacked on access: the raw rows are kept as read and each
//! lookup extracts the channels through the header's masks.

use std::io::Read;

use ddsdecode_core::{DdsError, DdsResult, Dimensions, Rgba8};

use super::header::{pf_flags, PixelFormat};

/// Bit counts the unpacker accepts
pub const SUPPORTED_BIT_COUNTS: [u32; 4] = [8, 16, 32, 64];

/// Pull-based accessor over bit-packed pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncompressedUnpacker {
    dimensions: Dimensions,
    /// Bytes per row
    pitch: usize,
    /// Bytes per pixel
    stride: usize,
    masks: [u64; 4],
    shifts: [u32; 4],
    buf: Vec<u8>,
}

impl UncompressedUnpacker {
    /// Validate the pixel format and compute the row layout, before any
    /// pixel data is read
    pub fn layout(pf: &PixelFormat, width: u32) -> DdsResult<(usize, usize)> {
        let unsupported = || DdsError::UnsupportedPixelFormat {
            flags: pf.flags,
            rgb_bit_count: pf.rgb_bit_count,
        };

        if !pf.has_flags(pf_flags::ALPHAPIXELS | pf_flags::RGB) {
            return Err(unsupported());
        }
        if !SUPPORTED_BIT_COUNTS.contains(&pf.rgb_bit_count) {
            return Err(unsupported());
        }

        let bits = pf.rgb_bit_count as usize;
        let pitch = (width as usize * bits + 7) / 8;
        Ok((pitch, bits / 8))
    }

    /// Read exactly `pitch * height` bytes of pixel rows from `reader`
    pub fn read<R: Read>(reader: &mut R, pf: &PixelFormat, dimensions: Dimensions) -> DdsResult<Self> {
        let (pitch, stride) = Self::layout(pf, dimensions.width)?;

        let len = pitch
            .checked_mul(dimensions.height as usize)
            .ok_or(DdsError::SurfaceTooLarge {
                width: dimensions.width,
                height: dimensions.height,
                limit: usize::MAX as u64,
            })?;

        // Grow with the stream instead of trusting the header up front
        let mut buf = Vec::new();
        reader.take(len as u64).read_to_end(&mut buf)?;
        if buf.len() < len {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("pixel rows need {} bytes, stream held {}", len, buf.len()),
            )
            .into());
        }

        let masks = pf.masks();
        Ok(Self {
            dimensions,
            pitch,
            stride,
            masks: masks.map(u64::from),
            shifts: masks.map(lowest_set_bit),
            buf,
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Unpack the pixel at `(x, y)`; `None` outside the image
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if !self.dimensions.contains(x, y) {
            return None;
        }

        let offset = self.pitch * y as usize + self.stride * x as usize;
        let d = read_le(self.buf.get(offset..offset + self.stride)?);

        let channel = |n: usize| ((d & self.masks[n]) >> self.shifts[n]) as u8;
        Some(Rgba8::new(channel(0), channel(1), channel(2), channel(3)))
    }
}

/// Index of the lowest set bit; 32 for an empty mask
pub fn lowest_set_bit(mask: u32) -> u32 {
    mask.trailing_zeros()
}

/// Little-endian unsigned integer of up to 8 bytes
fn read_le(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .rev()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}
