// ddsdecode-parsers/src/traits.rs
//! Core traits defining the decoder interface exposed to image hosts.
//!
//! A host owns a [`crate::registry::DecoderRegistry`] and dispatches streams
//! to implementors of [`ImageDecoder`] by signature or file extension. The
//! decoders themselves hold no global state.

use std::io::Read;
use std::path::Path;

use ddsdecode_core::{DdsError, DdsResult, Dimensions};

use crate::dds::{ImageInfo, PixelSurface};

/// Configuration options for decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Whether to also require the declared header and pixel format sizes
    pub strict_validation: bool,
    /// Upper bound on the decoded RGBA8 surface (in bytes)
    pub max_surface_bytes: u64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            strict_validation: false,
            max_surface_bytes: 512 * 1024 * 1024, // 512 MB
        }
    }
}

impl DecodeOptions {
    /// Reject dimensions whose RGBA8 surface exceeds `max_surface_bytes`
    pub fn check_surface(&self, dimensions: Dimensions) -> DdsResult<()> {
        let bytes = dimensions.pixel_count().checked_mul(4);
        match bytes {
            Some(bytes) if bytes <= self.max_surface_bytes => Ok(()),
            _ => Err(DdsError::SurfaceTooLarge {
                width: dimensions.width,
                height: dimensions.height,
                limit: self.max_surface_bytes,
            }),
        }
    }
}

/// Core trait for image decoders registered with a host
pub trait ImageDecoder: Send + Sync {
    /// Returns a human-readable name for this decoder
    fn name(&self) -> &str;

    /// Returns the file extensions this decoder handles (e.g., ["dds"])
    fn extensions(&self) -> &[&str];

    /// Returns the leading bytes that identify this format
    fn magic_bytes(&self) -> &[u8];

    /// Decode the base image of a stream positioned at its signature
    fn decode(&self, reader: &mut dyn Read) -> DdsResult<PixelSurface>;

    /// Read only the header and report dimensions and color model
    fn describe(&self, reader: &mut dyn Read) -> DdsResult<ImageInfo>;

    /// Check if a stream prefix carries this decoder's signature
    fn matches_signature(&self, prefix: &[u8]) -> bool {
        let magic = self.magic_bytes();
        !magic.is_empty() && prefix.starts_with(magic)
    }

    /// Check if this decoder claims the path's extension
    fn handles_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}
