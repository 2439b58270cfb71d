//! BC1 (DXT1) decompression seam
//!
//! BC1 decoding is delegated to a collaborator. The default one is backed by
//! `texpresso`; hosts may plug in any function with the same shape.

use ddsdecode_core::{DdsError, DdsResult};

use super::format::CompressionKind;

/// Bytes per BC1 block
pub const BLOCK_BYTES: usize = 8;

/// Decodes BC1 block data into a dense RGBA8 buffer of `width * height * 4` bytes
pub trait Bc1Decoder: Send + Sync {
    fn decode_bc1(&self, data: &[u8], width: u32, height: u32) -> DdsResult<Vec<u8>>;
}

impl<F> Bc1Decoder for F
where
    F: Fn(&[u8], u32, u32) -> DdsResult<Vec<u8>> + Send + Sync,
{
    fn decode_bc1(&self, data: &[u8], width: u32, height: u32) -> DdsResult<Vec<u8>> {
        self(data, width, height)
    }
}

/// Check that `data` covers every block of the image
pub fn check_len(data: &[u8], width: u32, height: u32) -> DdsResult<usize> {
    let needed = CompressionKind::Bc1.compressed_size(width, height).ok_or(DdsError::SurfaceTooLarge {
        width,
        height,
        limit: usize::MAX as u64,
    })?;
    if data.len() < needed {
        return Err(DdsError::TruncatedBlockData {
            needed,
            available: data.len(),
        });
    }
    Ok(needed)
}

/// BC1 decoder backed by `texpresso`
#[derive(Debug, Clone, Copy, Default)]
pub struct TexpressoBc1;

impl Bc1Decoder for TexpressoBc1 {
    fn decode_bc1(&self, data: &[u8], width: u32, height: u32) -> DdsResult<Vec<u8>> {
        let needed = check_len(data, width, height)?;

        let mut output = vec![0u8; width as usize * height as usize * 4];
        texpresso::Format::Bc1.decompress(&data[..needed], width as usize, height as usize, &mut output);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texpresso_gray_block() {
        // Gray-scale checkerboard, 0xFF top-left, 0x7F in the middle four texels
        let encoded: [u8; 8] = [0x00, 0x00, 0xFF, 0xFF, 0x11, 0x68, 0x29, 0x44];
        let expected: [u8; 16] = [
            0xFF, 0x00, 0xFF, 0x00, //
            0x00, 0x7F, 0x7F, 0xFF, //
            0xFF, 0x7F, 0x7F, 0x00, //
            0x00, 0xFF, 0x00, 0xFF, //
        ];

        let out = TexpressoBc1.decode_bc1(&encoded, 4, 4).unwrap();
        assert_eq!(out.len(), 64);
        for (px, gray) in out.chunks_exact(4).zip(expected) {
            assert_eq!(px, &[gray, gray, gray, 0xFF]);
        }
    }

    #[test]
    fn test_texpresso_rejects_short_input() {
        let err = TexpressoBc1.decode_bc1(&[0u8; 8], 8, 4).unwrap_err();
        assert!(matches!(err, DdsError::TruncatedBlockData { needed: 16, available: 8 }));
    }

    #[test]
    fn test_closure_collaborator() {
        let fill = |_: &[u8], w: u32, h: u32| -> DdsResult<Vec<u8>> { Ok(vec![7; (w * h * 4) as usize]) };
        let out = fill.decode_bc1(&[], 2, 2).unwrap();
        assert_eq!(out, vec![7; 16]);
    }
}
