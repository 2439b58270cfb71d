//! ddsdecode-parsers
//!
//! Decodes DirectDraw Surface (DDS) textures into RGBA8 pixel surfaces.
//!
//! # Supported Payloads
//!
//! | FourCC | Description                          |
//! |--------|--------------------------------------|
//! | `0`    | Uncompressed, channel bit masks      |
//! | `DXT1` | BC1 block compression                |
//! | `DXT5` | BC3 block compression                |
//!
//! # Example
//!
//! ```rust,no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = BufReader::new(File::open("texture.dds")?);
//! let surface = ddsdecode_parsers::dds::decode(file)?;
//!
//! println!("{}x{}", surface.width(), surface.height());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod dds;
pub mod logging;
pub mod registry;
pub mod traits;

// Re-export main types
pub use traits::{DecodeOptions, ImageDecoder};

pub use registry::{
    dds_registration, DecoderInfo, DecoderRegistration, DecoderRegistrationBuilder,
    DecoderRegistry, RegistryError,
};

pub use dds::{
    decode, describe, CompressionKind, DdsDecoder, DdsHeader, FourCC, ImageInfo, PixelFormat,
    PixelSurface,
};

pub use ddsdecode_core::{ColorModel, DdsError, DdsResult, Dimensions, ErrorKind, Rgba8};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
