//! DDS (DirectDraw Surface) texture decoder
//!
//! Decodes the base level of DDS textures into RGBA8 pixel surfaces.
//!
//! | FourCC       | Path                                   |
//! |--------------|----------------------------------------|
//! | `0`          | bit-mask unpacking, computed on access |
//! | `DXT1`       | BC1 collaborator ([`Bc1Decoder`])      |
//! | `DXT5`       | BC3 block decompression                |
//! | anything else| [`DdsError::UnsupportedCompression`]   |
//!
//! Mipmap levels, cubemap faces and volume slices past the base image are
//! not decoded.

mod bc1;
mod bc3;
mod format;
mod header;
mod surface;
mod uncompressed;

pub use bc1::{Bc1Decoder, TexpressoBc1};
pub use bc3::{decompress_bc3, rgb565_to_rgb888, Bc3Block};
pub use format::{color_model, ChannelFlags, CompressionKind, FourCC};
pub use header::{pf_flags, DdsHeader, PixelFormat, DDS_MAGIC, HEADER_SIZE, PREAMBLE_SIZE};
pub use surface::PixelSurface;
pub use uncompressed::UncompressedUnpacker;

use std::io::Read;
use std::sync::Arc;

use ddsdecode_core::{ColorModel, DdsError, DdsResult, Dimensions};
use serde::Serialize;

use crate::traits::{DecodeOptions, ImageDecoder};

/// Header summary returned by [`DdsDecoder::describe_stream`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub dimensions: Dimensions,
    pub color_model: ColorModel,
    pub compression: CompressionKind,
    pub mipmap_count: u32,
}

/// DDS decoder
#[derive(Clone)]
pub struct DdsDecoder {
    options: DecodeOptions,
    bc1: Arc<dyn Bc1Decoder>,
}

impl DdsDecoder {
    /// Create a decoder with default options and the `texpresso` BC1 backend
    pub fn new() -> Self {
        Self::with_options(DecodeOptions::default())
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self {
            options,
            bc1: Arc::new(TexpressoBc1),
        }
    }

    /// Replace the BC1 collaborator
    pub fn with_bc1_decoder(mut self, bc1: impl Bc1Decoder + 'static) -> Self {
        self.bc1 = Arc::new(bc1);
        self
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Read and validate the magic and fixed header
    pub fn read_header<R: Read>(&self, reader: &mut R) -> DdsResult<DdsHeader> {
        DdsHeader::read(reader, self.options.strict_validation)
    }

    /// Decode the base image of a DDS stream
    pub fn decode_stream<R: Read>(&self, mut reader: R) -> DdsResult<PixelSurface> {
        let header = self.read_header(&mut reader)?;
        let dimensions = header.dimensions();
        let compression = header.compression();

        tracing::debug!(%dimensions, %compression, "Dispatching DDS payload");

        if header.has_mipmaps() || header.is_cubemap() || header.is_volume() {
            tracing::debug!(
                mipmaps = header.mipmap_count,
                cubemap = header.is_cubemap(),
                volume = header.is_volume(),
                "Decoding base level only"
            );
        }

        match compression {
            CompressionKind::None => {
                self.options.check_surface(dimensions)?;
                let unpacker = UncompressedUnpacker::read(&mut reader, &header.pixel_format, dimensions)?;
                Ok(PixelSurface::Packed(unpacker))
            }
            CompressionKind::Bc1 => {
                self.options.check_surface(dimensions)?;
                let data = read_payload(&mut reader, compression.compressed_size(dimensions.width, dimensions.height))?;
                let pixels = self.bc1.decode_bc1(&data, dimensions.width, dimensions.height)?;
                dense_surface(dimensions, pixels)
            }
            CompressionKind::Bc3 => {
                self.options.check_surface(dimensions)?;
                let data = read_payload(&mut reader, compression.compressed_size(dimensions.width, dimensions.height))?;
                let pixels = decompress_bc3(&data, dimensions.width, dimensions.height)?;
                dense_surface(dimensions, pixels)
            }
            CompressionKind::Unsupported(fourcc) => Err(DdsError::UnsupportedCompression { fourcc: fourcc.0 }),
        }
    }

    /// Read only the header and summarize it
    pub fn describe_stream<R: Read>(&self, mut reader: R) -> DdsResult<ImageInfo> {
        let header = self.read_header(&mut reader)?;

        Ok(ImageInfo {
            dimensions: header.dimensions(),
            color_model: color_model(&header.pixel_format)?,
            compression: header.compression(),
            mipmap_count: header.mipmap_count,
        })
    }
}

impl Default for DdsDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DdsDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DdsDecoder")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ImageDecoder for DdsDecoder {
    fn name(&self) -> &str {
        "DDS Texture Decoder"
    }

    fn extensions(&self) -> &[&str] {
        &["dds"]
    }

    fn magic_bytes(&self) -> &[u8] {
        &DDS_MAGIC
    }

    fn decode(&self, reader: &mut dyn Read) -> DdsResult<PixelSurface> {
        self.decode_stream(reader)
    }

    fn describe(&self, reader: &mut dyn Read) -> DdsResult<ImageInfo> {
        self.describe_stream(reader)
    }
}

/// Decode a DDS stream with default options
pub fn decode<R: Read>(reader: R) -> DdsResult<PixelSurface> {
    DdsDecoder::new().decode_stream(reader)
}

/// Describe a DDS stream with default options
pub fn describe<R: Read>(reader: R) -> DdsResult<ImageInfo> {
    DdsDecoder::new().describe_stream(reader)
}

/// Read up to `needed` bytes of block data; shortfalls surface from the
/// block decoder as truncation errors
fn read_payload<R: Read>(reader: &mut R, needed: Option<usize>) -> DdsResult<Vec<u8>> {
    let needed = needed.unwrap_or(usize::MAX);
    let mut data = Vec::new();
    reader.take(needed as u64).read_to_end(&mut data)?;
    Ok(data)
}

fn dense_surface(dimensions: Dimensions, pixels: Vec<u8>) -> DdsResult<PixelSurface> {
    let expected = dimensions.pixel_count() as usize * 4;
    if pixels.len() != expected {
        return Err(DdsError::TruncatedBlockData {
            needed: expected,
            available: pixels.len(),
        });
    }
    Ok(PixelSurface::dense(dimensions, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dds::header::tests::header_bytes;
    use ddsdecode_core::{ErrorKind, Rgba8};
    use std::io::Cursor;

    fn dds_file(width: u32, height: u32, fourcc: [u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut bytes = header_bytes(width, height, pf_flags::FOURCC, fourcc, 0, [0; 4]);
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_dispatch_bc3() {
        let file = dds_file(4, 4, *b"DXT5", &[0u8; 16]);
        let surface = decode(Cursor::new(file)).unwrap();
        assert!(matches!(surface, PixelSurface::Dense { .. }));
        assert_eq!(surface.pixel(3, 3), Some(Rgba8::TRANSPARENT));
    }

    #[test]
    fn test_dispatch_bc1_to_collaborator() {
        let file = dds_file(4, 4, *b"DXT1", &[0u8; 8]);
        let decoder = DdsDecoder::new().with_bc1_decoder(|data: &[u8], w: u32, h: u32| -> DdsResult<Vec<u8>> {
            assert_eq!(data.len(), 8);
            Ok(vec![0x42; (w * h * 4) as usize])
        });

        let surface = decoder.decode_stream(Cursor::new(file)).unwrap();
        assert_eq!(surface.pixel(0, 0), Some(Rgba8::new(0x42, 0x42, 0x42, 0x42)));
    }

    #[test]
    fn test_dispatch_uncompressed() {
        let mut file = header_bytes(
            1,
            1,
            pf_flags::RGB | pf_flags::ALPHAPIXELS,
            [0; 4],
            32,
            [0xFF, 0xFF00, 0xFF0000, 0xFF000000],
        );
        file.extend_from_slice(&[1, 2, 3, 4]);

        let surface = decode(Cursor::new(file)).unwrap();
        assert!(matches!(surface, PixelSurface::Packed(_)));
        assert_eq!(surface.pixel(0, 0), Some(Rgba8::new(1, 2, 3, 4)));
    }

    #[test]
    fn test_dispatch_unsupported_tag() {
        let file = dds_file(4, 4, *b"DXT3", &[0u8; 16]);
        let err = decode(Cursor::new(file)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert!(matches!(err, DdsError::UnsupportedCompression { fourcc } if &fourcc == b"DXT3"));
    }

    #[test]
    fn test_short_bc3_payload_is_decode_error() {
        let file = dds_file(8, 8, *b"DXT5", &[0u8; 40]);
        let err = decode(Cursor::new(file)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_surface_limit() {
        let file = dds_file(64, 64, *b"DXT5", &[]);
        let decoder = DdsDecoder::with_options(DecodeOptions {
            max_surface_bytes: 1024,
            ..Default::default()
        });
        let err = decoder.decode_stream(Cursor::new(file)).unwrap_err();
        assert!(matches!(err, DdsError::SurfaceTooLarge { width: 64, height: 64, limit: 1024 }));
    }

    #[test]
    fn test_describe() {
        let file = header_bytes(
            16,
            8,
            pf_flags::RGB | pf_flags::ALPHAPIXELS,
            [0; 4],
            32,
            [0xFF, 0xFF00, 0xFF0000, 0xFF000000],
        );
        let info = describe(Cursor::new(file)).unwrap();
        assert_eq!(info.dimensions, Dimensions::new(16, 8));
        assert_eq!(info.color_model, ColorModel::Rgba8);
        assert_eq!(info.compression, CompressionKind::None);
    }

    #[test]
    fn test_describe_unrecognized_color_model() {
        let file = dds_file(4, 4, *b"DXT5", &[]);
        let err = describe(Cursor::new(file)).unwrap_err();
        assert!(matches!(err, DdsError::UnsupportedPixelFormat { flags: 0x4, rgb_bit_count: 0 }));
    }

    #[test]
    fn test_trait_object_dispatch() {
        let decoder: Box<dyn ImageDecoder> = Box::new(DdsDecoder::new());
        assert!(decoder.matches_signature(b"DDS \x7c\x00"));
        assert!(!decoder.matches_signature(b"\x89PNG"));
        assert!(decoder.handles_path(std::path::Path::new("textures/ship.DDS")));

        let mut file = Cursor::new(dds_file(4, 4, *b"DXT5", &[0u8; 16]));
        let surface = decoder.decode(&mut file).unwrap();
        assert_eq!(surface.dimensions(), Dimensions::new(4, 4));
    }
}
