//! Unified error handling for ddsdecode
//!
//! Every failure carries structured context so callers can branch on
//! [`ErrorKind`] instead of matching message text.

use thiserror::Error;

/// Errors produced while reading or decoding a DDS stream
#[derive(Error, Debug)]
pub enum DdsError {
    // ==================== I/O Errors ====================

    /// The stream ended before the expected bytes were available
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Format Errors ====================

    /// Invalid magic bytes at stream start
    #[error("Invalid magic bytes: expected {expected:?}, found {found:?}")]
    InvalidMagic {
        expected: [u8; 4],
        found: [u8; 4],
    },

    /// A fixed header field holds a value the decoder cannot accept
    #[error("Malformed header: {field} = {value}")]
    MalformedHeader {
        field: &'static str,
        value: u64,
    },

    /// The decoded surface would not fit within the configured limit
    #[error("Surface {width}x{height} exceeds the {limit} byte limit")]
    SurfaceTooLarge {
        width: u32,
        height: u32,
        limit: u64,
    },

    // ==================== Unsupported Format Errors ====================

    /// Recognized container, but the flag / bit depth combination is not handled
    #[error("Unsupported pixel format: flags 0x{flags:08X}, {rgb_bit_count} bits per pixel")]
    UnsupportedPixelFormat {
        flags: u32,
        rgb_bit_count: u32,
    },

    /// Compression tag other than none, DXT1 or DXT5
    #[error("Unsupported compression tag 0x{value:08X} ({fourcc:?})", value = fourcc_value(.fourcc))]
    UnsupportedCompression {
        fourcc: [u8; 4],
    },

    // ==================== Decode Errors ====================

    /// Block data is shorter than the declared dimensions require
    #[error("Block data truncated: needed {needed} bytes, {available} available")]
    TruncatedBlockData {
        needed: usize,
        available: usize,
    },
}

/// Result type using [`DdsError`]
pub type DdsResult<T> = std::result::Result<T, DdsError>;

/// Closed classification of [`DdsError`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Stream ended early or could not be read
    Io,
    /// Bad magic or malformed fixed header
    Format,
    /// Recognized container with an unsupported combination of fields
    UnsupportedFormat,
    /// Payload shorter than the header demands
    Decode,
}

impl DdsError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DdsError::Io(_) => ErrorKind::Io,
            DdsError::InvalidMagic { .. }
            | DdsError::MalformedHeader { .. }
            | DdsError::SurfaceTooLarge { .. } => ErrorKind::Format,
            DdsError::UnsupportedPixelFormat { .. }
            | DdsError::UnsupportedCompression { .. } => ErrorKind::UnsupportedFormat,
            DdsError::TruncatedBlockData { .. } => ErrorKind::Decode,
        }
    }

    /// Check if the stream ended before the header or pixel data was complete
    pub fn is_truncated(&self) -> bool {
        match self {
            DdsError::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
            DdsError::TruncatedBlockData { .. } => true,
            _ => false,
        }
    }
}

fn fourcc_value(fourcc: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*fourcc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let eof = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert_eq!(DdsError::from(eof).kind(), ErrorKind::Io);

        assert_eq!(
            DdsError::InvalidMagic { expected: *b"DDS ", found: *b"PNG " }.kind(),
            ErrorKind::Format
        );
        assert_eq!(
            DdsError::UnsupportedCompression { fourcc: *b"DXT3" }.kind(),
            ErrorKind::UnsupportedFormat
        );
        assert_eq!(
            DdsError::TruncatedBlockData { needed: 16, available: 8 }.kind(),
            ErrorKind::Decode
        );
    }

    #[test]
    fn test_unsupported_compression_message() {
        let err = DdsError::UnsupportedCompression { fourcc: *b"DXT3" };
        let message = err.to_string();
        assert!(message.contains("0x33545844"), "{message}");
    }

    #[test]
    fn test_is_truncated() {
        let eof = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert!(DdsError::from(eof).is_truncated());
        assert!(DdsError::TruncatedBlockData { needed: 32, available: 16 }.is_truncated());
        assert!(!DdsError::MalformedHeader { field: "width", value: 0 }.is_truncated());
    }
}
