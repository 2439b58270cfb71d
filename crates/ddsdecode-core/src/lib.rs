//! ddsdecode core library
//!
//! This crate provides the error taxonomy and pixel types shared by the
//! decoder library and the command-line host.

pub mod error;
pub mod types;

pub use error::{DdsError, DdsResult, ErrorKind};
pub use types::*;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::error::{DdsError, DdsResult, ErrorKind};
    pub use crate::types::*;
}
