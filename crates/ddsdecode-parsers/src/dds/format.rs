//! DDS texture format detection

use ddsdecode_core::{ColorModel, DdsError, DdsResult};
use serde::Serialize;

use super::bc3::num_blocks;
use super::header::{pf_flags, PixelFormat};
use super::{bc1, bc3};

/// Four-character code identifying a compression variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// Uncompressed data
    pub const NONE: FourCC = FourCC([0; 4]);
    pub const DXT1: FourCC = FourCC(*b"DXT1");
    pub const DXT5: FourCC = FourCC(*b"DXT5");

    /// Raw little-endian value of the tag
    pub fn value(&self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    fn is_printable(&self) -> bool {
        self.0.iter().all(|b| b.is_ascii_graphic() || *b == b' ')
    }
}

impl std::fmt::Display for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_printable() {
            // Printable tags are pure ASCII
            f.write_str(&String::from_utf8_lossy(&self.0))
        } else {
            write!(f, "0x{:08X}", self.value())
        }
    }
}

impl Serialize for FourCC {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// How the pixel payload following the header is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "fourcc", rename_all = "snake_case")]
pub enum CompressionKind {
    /// Raw bit-packed pixels described by channel masks
    None,
    /// Block Compressed 1 (DXT1)
    Bc1,
    /// Block Compressed 3 (DXT5)
    Bc3,
    /// Any other tag
    Unsupported(FourCC),
}

impl CompressionKind {
    /// Detect from pixel format FourCC
    pub fn from_fourcc(fourcc: FourCC) -> Self {
        match fourcc {
            FourCC::NONE => CompressionKind::None,
            FourCC::DXT1 => CompressionKind::Bc1,
            FourCC::DXT5 => CompressionKind::Bc3,
            other => CompressionKind::Unsupported(other),
        }
    }

    /// Bytes per compressed block, `None` for uncompressed or unknown data
    pub fn block_size(&self) -> Option<usize> {
        match self {
            CompressionKind::Bc1 => Some(bc1::BLOCK_BYTES),
            CompressionKind::Bc3 => Some(bc3::BLOCK_BYTES),
            _ => None,
        }
    }

    /// Bytes of block data a `width` x `height` base level requires
    pub fn compressed_size(&self, width: u32, height: u32) -> Option<usize> {
        num_blocks(width)
            .checked_mul(num_blocks(height))?
            .checked_mul(self.block_size()?)
    }
}

impl std::fmt::Display for CompressionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompressionKind::None => f.write_str("uncompressed"),
            CompressionKind::Bc1 => f.write_str("BC1 (DXT1)"),
            CompressionKind::Bc3 => f.write_str("BC3 (DXT5)"),
            CompressionKind::Unsupported(tag) => write!(f, "unsupported ({tag})"),
        }
    }
}

/// Channel classes a pixel format advertises through its flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelFlags {
    pub has_alpha: bool,
    pub has_rgb: bool,
    pub has_yuv: bool,
    pub has_luminance: bool,
}

impl ChannelFlags {
    pub fn from_pixel_format(pf: &PixelFormat) -> Self {
        Self {
            has_alpha: pf.has_flags(pf_flags::ALPHAPIXELS) || pf.has_flags(pf_flags::ALPHA),
            has_rgb: pf.has_flags(pf_flags::FOURCC) || pf.has_flags(pf_flags::RGB),
            has_yuv: pf.has_flags(pf_flags::YUV),
            has_luminance: pf.has_flags(pf_flags::LUMINANCE),
        }
    }

    fn has(&self, channel: Channel) -> bool {
        match channel {
            Channel::Rgb => self.has_rgb,
            Channel::Yuv => self.has_yuv,
            Channel::Luminance => self.has_luminance,
            Channel::Alpha => self.has_alpha,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Channel {
    Rgb,
    Yuv,
    Luminance,
    Alpha,
}

/// Ordered lookup table; the first matching row wins
const COLOR_MODEL_TABLE: &[(Channel, u32, ColorModel)] = &[
    (Channel::Rgb, 32, ColorModel::Rgba8),
    (Channel::Rgb, 64, ColorModel::Rgba16),
    (Channel::Yuv, 24, ColorModel::YCbCr),
    (Channel::Luminance, 8, ColorModel::Gray8),
    (Channel::Luminance, 16, ColorModel::Gray16),
    (Channel::Alpha, 8, ColorModel::Alpha),
    (Channel::Alpha, 16, ColorModel::Alpha),
];

/// Derive the advisory color model of a pixel format
pub fn color_model(pf: &PixelFormat) -> DdsResult<ColorModel> {
    let channels = ChannelFlags::from_pixel_format(pf);

    COLOR_MODEL_TABLE
        .iter()
        .find(|(channel, bits, _)| channels.has(*channel) && *bits == pf.rgb_bit_count)
        .map(|(_, _, model)| *model)
        .ok_or(DdsError::UnsupportedPixelFormat {
            flags: pf.flags,
            rgb_bit_count: pf.rgb_bit_count,
        })
}
