//! BC3 (DXT5) block decompression
//!
//! Each 16-byte block encodes a 4x4 tile:
//!
//! | Bytes  | Content                                         |
//! |--------|-------------------------------------------------|
//! | 0..2   | alpha endpoints `alpha0`, `alpha1`              |
//! | 2..8   | sixteen 3-bit alpha codes (48 bits)             |
//! | 8..12  | RGB565 colour endpoints `c0`, `c1`              |
//! | 12..16 | sixteen 2-bit colour codes, row-major           |
//!
//! Blocks are stored row-major and carry no state between each other. Blocks
//! on the right and bottom edge may overhang the image; their extra texels
//! are decoded and dropped.

use ddsdecode_core::{DdsError, DdsResult, Rgba8};

use super::format::CompressionKind;

/// Bytes per compressed block
pub const BLOCK_BYTES: usize = 16;

/// Edge length of the texel tile a block covers
pub const BLOCK_DIM: usize = 4;

/// Returns number of blocks needed to cover `size` pixels
pub fn num_blocks(size: u32) -> usize {
    (size as usize + BLOCK_DIM - 1) / BLOCK_DIM
}

/// Expand an RGB565 value to 8 bits per channel by bit replication
pub fn rgb565_to_rgb888(colour: u16) -> [u8; 3] {
    let r = ((colour >> 11) & 0x1F) as u8;
    let g = ((colour >> 5) & 0x3F) as u8;
    let b = (colour & 0x1F) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

/// A parsed BC3 block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bc3Block {
    pub alpha0: u8,
    pub alpha1: u8,
    /// Alpha codes 0..=4 and the low bit of code 5
    pub alpha_low: u16,
    /// The remaining alpha code bits
    pub alpha_high: u32,
    pub colour0: u16,
    pub colour1: u16,
    pub colour_codes: u32,
}

impl Bc3Block {
    /// Parse a block from its raw bytes
    pub fn parse(block: &[u8; BLOCK_BYTES]) -> Self {
        Self {
            alpha0: block[0],
            alpha1: block[1],
            alpha_low: u16::from_le_bytes([block[2], block[3]]),
            alpha_high: u32::from_le_bytes([block[4], block[5], block[6], block[7]]),
            colour0: u16::from_le_bytes([block[8], block[9]]),
            colour1: u16::from_le_bytes([block[10], block[11]]),
            colour_codes: u32::from_le_bytes([block[12], block[13], block[14], block[15]]),
        }
    }

    /// 3-bit alpha code of texel `(i, j)`
    pub fn alpha_code(&self, i: usize, j: usize) -> u8 {
        let bit = 3 * (4 * j + i);
        let low = u32::from(self.alpha_low);
        let code = match bit {
            0..=12 => (low >> bit) & 0x7,
            // Code 5 straddles both words
            15 => (low >> 15) | ((self.alpha_high << 1) & 0x6),
            _ => (self.alpha_high >> (bit - 16)) & 0x7,
        };
        code as u8
    }

    /// Map a 3-bit alpha code to its alpha value; higher bits are ignored
    pub fn alpha(&self, code: u8) -> u8 {
        let code = code & 0x7;
        let a0 = u32::from(self.alpha0);
        let a1 = u32::from(self.alpha1);
        let c = u32::from(code);

        match code {
            0 => self.alpha0,
            1 => self.alpha1,
            _ if self.alpha0 > self.alpha1 => (((8 - c) * a0 + (c - 1) * a1) / 7) as u8,
            6 => 0,
            7 => 255,
            _ => (((6 - c) * a0 + (c - 1) * a1) / 5) as u8,
        }
    }

    /// The four colours addressable by a 2-bit colour code
    pub fn palette(&self) -> [[u8; 3]; 4] {
        let c0 = rgb565_to_rgb888(self.colour0);
        let c1 = rgb565_to_rgb888(self.colour1);

        let mut palette = [c0, c1, [0; 3], [0; 3]];
        for ch in 0..3 {
            let a = u16::from(c0[ch]);
            let b = u16::from(c1[ch]);
            palette[2][ch] = ((2 * a + b) / 3) as u8;
            palette[3][ch] = ((a + 2 * b) / 3) as u8;
        }
        palette
    }

    /// 2-bit colour code of texel `(i, j)`
    pub fn colour_code(&self, i: usize, j: usize) -> u8 {
        ((self.colour_codes >> (2 * (4 * j + i))) & 0x3) as u8
    }

    /// Decode all 16 texels, row-major
    pub fn decode(&self) -> [Rgba8; 16] {
        let palette = self.palette();
        let mut texels = [Rgba8::TRANSPARENT; 16];

        for j in 0..BLOCK_DIM {
            for i in 0..BLOCK_DIM {
                let rgb = palette[self.colour_code(i, j) as usize];
                let alpha = self.alpha(self.alpha_code(i, j));
                texels[BLOCK_DIM * j + i] = Rgba8::from_rgb(rgb, alpha);
            }
        }

        texels
    }
}

impl TryFrom<&[u8]> for Bc3Block {
    type Error = DdsError;

    /// Parse the first [`BLOCK_BYTES`] bytes of `data`
    fn try_from(data: &[u8]) -> DdsResult<Self> {
        data.get(..BLOCK_BYTES)
            .and_then(|block| <&[u8; BLOCK_BYTES]>::try_from(block).ok())
            .map(Self::parse)
            .ok_or(DdsError::TruncatedBlockData {
                needed: BLOCK_BYTES,
                available: data.len(),
            })
    }
}

/// Decompress BC3 data into a dense row-major RGBA8 buffer of
/// `width * height * 4` bytes.
///
/// Fails with [`DdsError::TruncatedBlockData`] when `data` holds fewer
/// bytes than the dimensions require. Trailing bytes (further mip levels)
/// are ignored.
pub fn decompress_bc3(data: &[u8], width: u32, height: u32) -> DdsResult<Vec<u8>> {
    let too_large = || DdsError::SurfaceTooLarge {
        width,
        height,
        limit: usize::MAX as u64,
    };

    let needed = CompressionKind::Bc3.compressed_size(width, height).ok_or_else(too_large)?;
    if data.len() < needed {
        return Err(DdsError::TruncatedBlockData {
            needed,
            available: data.len(),
        });
    }

    let output_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(too_large)?;
    let mut output = vec![0u8; output_len];

    let blocks_wide = num_blocks(width);
    tracing::debug!(blocks_wide, blocks_high = num_blocks(height), "Decompressing BC3");

    for (index, block) in data[..needed].chunks_exact(BLOCK_BYTES).enumerate() {
        let texels = Bc3Block::try_from(block)?.decode();
        write_block(
            &mut output,
            width as usize,
            height as usize,
            (index % blocks_wide) * BLOCK_DIM,
            (index / blocks_wide) * BLOCK_DIM,
            &texels,
        );
    }

    Ok(output)
}

/// Copy a decoded tile to `(origin_x, origin_y)`, clipping against both edges
fn write_block(
    output: &mut [u8],
    width: usize,
    height: usize,
    origin_x: usize,
    origin_y: usize,
    texels: &[Rgba8; 16],
) {
    for j in 0..BLOCK_DIM {
        let y = origin_y + j;
        if y >= height {
            break;
        }
        for i in 0..BLOCK_DIM {
            let x = origin_x + i;
            if x >= width {
                break;
            }
            let offset = 4 * (y * width + x);
            output[offset..offset + 4].copy_from_slice(&texels[BLOCK_DIM * j + i].to_array());
        }
    }
}
