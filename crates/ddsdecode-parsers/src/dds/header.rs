//! DDS header structures

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use ddsdecode_core::{DdsError, DdsResult, Dimensions};

use super::format::{CompressionKind, FourCC};

/// DDS file magic "DDS "
pub const DDS_MAGIC: [u8; 4] = *b"DDS ";

/// Declared size of the fixed header, excluding the magic
pub const HEADER_SIZE: usize = 124;

/// Declared size of the embedded pixel format block
pub const PIXEL_FORMAT_SIZE: usize = 32;

/// Magic followed by the fixed header
pub const PREAMBLE_SIZE: usize = DDS_MAGIC.len() + HEADER_SIZE;

/// Caps flags
pub mod caps {
    pub const MIPMAP: u32 = 0x400000;
}

/// Caps2 flags
pub mod caps2 {
    pub const CUBEMAP: u32 = 0x200;
    pub const VOLUME: u32 = 0x200000;
}

/// DDS pixel format flags
pub mod pf_flags {
    pub const ALPHAPIXELS: u32 = 0x1;
    pub const ALPHA: u32 = 0x2;
    pub const FOURCC: u32 = 0x4;
    pub const RGB: u32 = 0x40;
    pub const YUV: u32 = 0x200;
    pub const LUMINANCE: u32 = 0x20000;
}

/// DDS header (124 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdsHeader {
    pub size: u32,
    pub flags: u32,
    pub height: u32,
    pub width: u32,
    pub pitch_or_linear_size: u32,
    pub depth: u32,
    pub mipmap_count: u32,
    pub reserved1: [u32; 11],
    pub pixel_format: PixelFormat,
    pub caps: u32,
    pub caps2: u32,
    pub caps3: u32,
    pub caps4: u32,
    pub reserved2: u32,
}

impl DdsHeader {
    /// Read the magic and fixed header from a stream.
    ///
    /// All 128 bytes are read before anything is inspected, so a short
    /// stream is always reported as an I/O error.
    pub fn read<R: Read>(reader: &mut R, strict: bool) -> DdsResult<Self> {
        let mut preamble = [0u8; PREAMBLE_SIZE];
        reader.read_exact(&mut preamble)?;

        let mut found = [0u8; 4];
        found.copy_from_slice(&preamble[..4]);
        if found != DDS_MAGIC {
            return Err(DdsError::InvalidMagic {
                expected: DDS_MAGIC,
                found,
            });
        }

        let header = Self::parse(&preamble[4..])?;
        header.validate(strict)?;

        tracing::debug!(
            width = header.width,
            height = header.height,
            fourcc = %header.pixel_format.fourcc,
            mipmaps = header.mipmap_count,
            "Parsed DDS header"
        );

        Ok(header)
    }

    /// Parse the fixed header (without magic) from a 124-byte slice
    pub fn parse(data: &[u8]) -> DdsResult<Self> {
        let mut cursor = Cursor::new(data);

        let size = cursor.read_u32::<LittleEndian>()?;
        let flags = cursor.read_u32::<LittleEndian>()?;
        let height = cursor.read_u32::<LittleEndian>()?;
        let width = cursor.read_u32::<LittleEndian>()?;
        let pitch_or_linear_size = cursor.read_u32::<LittleEndian>()?;
        let depth = cursor.read_u32::<LittleEndian>()?;
        let mipmap_count = cursor.read_u32::<LittleEndian>()?;

        let mut reserved1 = [0u32; 11];
        cursor.read_u32_into::<LittleEndian>(&mut reserved1)?;

        // Pixel format (32 bytes starting at offset 72)
        let pixel_format = PixelFormat::read(&mut cursor)?;

        let caps = cursor.read_u32::<LittleEndian>()?;
        let caps2 = cursor.read_u32::<LittleEndian>()?;
        let caps3 = cursor.read_u32::<LittleEndian>()?;
        let caps4 = cursor.read_u32::<LittleEndian>()?;
        let reserved2 = cursor.read_u32::<LittleEndian>()?;

        Ok(DdsHeader {
            size,
            flags,
            height,
            width,
            pitch_or_linear_size,
            depth,
            mipmap_count,
            reserved1,
            pixel_format,
            caps,
            caps2,
            caps3,
            caps4,
            reserved2,
        })
    }

    /// Check the invariants every decodable header must hold
    pub fn validate(&self, strict: bool) -> DdsResult<()> {
        if self.width == 0 {
            return Err(DdsError::MalformedHeader { field: "width", value: 0 });
        }
        if self.height == 0 {
            return Err(DdsError::MalformedHeader { field: "height", value: 0 });
        }

        if strict {
            if self.size as usize != HEADER_SIZE {
                return Err(DdsError::MalformedHeader {
                    field: "size",
                    value: u64::from(self.size),
                });
            }
            if self.pixel_format.size as usize != PIXEL_FORMAT_SIZE {
                return Err(DdsError::MalformedHeader {
                    field: "pixel_format.size",
                    value: u64::from(self.pixel_format.size),
                });
            }
        }

        Ok(())
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Compression kind named by the pixel format's FourCC
    pub fn compression(&self) -> CompressionKind {
        CompressionKind::from_fourcc(self.pixel_format.fourcc)
    }

    /// Check if this is a cubemap
    pub fn is_cubemap(&self) -> bool {
        self.caps2 & caps2::CUBEMAP != 0
    }

    /// Check if this is a volume texture
    pub fn is_volume(&self) -> bool {
        self.caps2 & caps2::VOLUME != 0
    }

    /// Check if this has mipmaps
    pub fn has_mipmaps(&self) -> bool {
        self.caps & caps::MIPMAP != 0 && self.mipmap_count > 1
    }
}

/// DDS pixel format (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    pub size: u32,
    pub flags: u32,
    pub fourcc: FourCC,
    pub rgb_bit_count: u32,
    pub r_bit_mask: u32,
    pub g_bit_mask: u32,
    pub b_bit_mask: u32,
    pub a_bit_mask: u32,
}

impl PixelFormat {
    /// Read the 32-byte pixel format block
    pub fn read<R: Read>(reader: &mut R) -> DdsResult<Self> {
        let size = reader.read_u32::<LittleEndian>()?;
        let flags = reader.read_u32::<LittleEndian>()?;
        let mut fourcc = [0u8; 4];
        reader.read_exact(&mut fourcc)?;
        let rgb_bit_count = reader.read_u32::<LittleEndian>()?;
        let r_bit_mask = reader.read_u32::<LittleEndian>()?;
        let g_bit_mask = reader.read_u32::<LittleEndian>()?;
        let b_bit_mask = reader.read_u32::<LittleEndian>()?;
        let a_bit_mask = reader.read_u32::<LittleEndian>()?;

        Ok(PixelFormat {
            size,
            flags,
            fourcc: FourCC(fourcc),
            rgb_bit_count,
            r_bit_mask,
            g_bit_mask,
            b_bit_mask,
            a_bit_mask,
        })
    }

    pub fn has_flags(&self, mask: u32) -> bool {
        self.flags & mask == mask
    }

    /// Channel masks in R, G, B, A order
    pub fn masks(&self) -> [u32; 4] {
        [self.r_bit_mask, self.g_bit_mask, self.b_bit_mask, self.a_bit_mask]
    }
}
