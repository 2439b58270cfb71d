//! Decoder registry for signature- and extension-based dispatch.
//!
//! The registry is an explicit factory table owned by the host
//! application. Nothing registers itself: the host builds a
//! [`DecoderRegistry`], adds the decoders it wants, and hands streams to it.

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ddsdecode_core::DdsError;

use crate::dds::{ImageInfo, PixelSurface};
use crate::traits::ImageDecoder;

/// Factory function type for creating decoder instances
pub type DecoderFactory = Box<dyn Fn() -> Arc<dyn ImageDecoder> + Send + Sync>;

/// Registration entry for a decoder
pub struct DecoderRegistration {
    /// Unique identifier for this decoder
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// File extensions handled (lowercase)
    pub extensions: Vec<String>,
    /// Priority for extension conflicts (higher = preferred)
    pub priority: i32,
    /// Factory function to create the decoder instance
    pub factory: DecoderFactory,
}

/// A registered decoder together with its instantiated instance
struct Entry {
    registration: DecoderRegistration,
    instance: Arc<dyn ImageDecoder>,
}

/// Host-owned decoder registry
#[derive(Default)]
pub struct DecoderRegistry {
    /// Registered decoders, kept sorted by priority (descending)
    entries: Vec<Entry>,
    /// Map of extension to decoder indices
    extension_map: HashMap<String, Vec<usize>>,
}

impl DecoderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new decoder, instantiating it through its factory
    pub fn register(&mut self, registration: DecoderRegistration) -> Result<(), RegistryError> {
        if self.entries.iter().any(|e| e.registration.id == registration.id) {
            return Err(RegistryError::DuplicateId(registration.id));
        }

        let instance = (registration.factory)();
        tracing::debug!(id = %registration.id, decoder = instance.name(), "Registered decoder");

        self.entries.push(Entry { registration, instance });
        self.entries
            .sort_by(|a, b| b.registration.priority.cmp(&a.registration.priority));
        self.rebuild_extension_map();
        Ok(())
    }

    /// Unregister a decoder by ID
    pub fn unregister(&mut self, id: &str) -> Result<(), RegistryError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.registration.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        self.entries.remove(index);
        self.rebuild_extension_map();
        Ok(())
    }

    fn rebuild_extension_map(&mut self) {
        self.extension_map.clear();
        for (index, entry) in self.entries.iter().enumerate() {
            for ext in &entry.registration.extensions {
                self.extension_map
                    .entry(ext.to_lowercase())
                    .or_default()
                    .push(index);
            }
        }
    }

    /// Get a decoder instance by ID
    pub fn get(&self, id: &str) -> Result<Arc<dyn ImageDecoder>, RegistryError> {
        self.entries
            .iter()
            .find(|e| e.registration.id == id)
            .map(|e| Arc::clone(&e.instance))
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Get a decoder for a file extension
    pub fn get_for_extension(&self, ext: &str) -> Result<Arc<dyn ImageDecoder>, RegistryError> {
        let ext_lower = ext.trim_start_matches('.').to_lowercase();

        self.extension_map
            .get(&ext_lower)
            .and_then(|indices| indices.first())
            .map(|&index| Arc::clone(&self.entries[index].instance))
            .ok_or(RegistryError::NoDecoderForExtension(ext_lower))
    }

    /// Get a decoder for a file path by its extension
    pub fn get_for_path(&self, path: &Path) -> Result<Arc<dyn ImageDecoder>, RegistryError> {
        path.extension()
            .and_then(|ext| self.get_for_extension(&ext.to_string_lossy()).ok())
            .ok_or_else(|| RegistryError::NoDecoderForPath(path.to_path_buf()))
    }

    /// Get the decoder whose signature prefixes `prefix`
    pub fn get_for_signature(&self, prefix: &[u8]) -> Result<Arc<dyn ImageDecoder>, RegistryError> {
        self.entries
            .iter()
            .find(|e| e.instance.matches_signature(prefix))
            .map(|e| Arc::clone(&e.instance))
            .ok_or_else(|| RegistryError::UnknownSignature(prefix.to_vec()))
    }

    /// Longest signature any registered decoder needs to be identified
    fn signature_len(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.instance.magic_bytes().len())
            .max()
            .unwrap_or(0)
    }

    /// Identify a stream by its signature and rewind it
    pub fn detect<R: Read + Seek>(&self, reader: &mut R) -> Result<Arc<dyn ImageDecoder>, RegistryError> {
        let start = reader.stream_position()?;
        let mut prefix = Vec::with_capacity(self.signature_len());
        reader
            .by_ref()
            .take(self.signature_len() as u64)
            .read_to_end(&mut prefix)?;
        reader.seek(std::io::SeekFrom::Start(start))?;

        self.get_for_signature(&prefix)
    }

    /// Decode a stream with whichever decoder claims its signature
    pub fn decode<R: Read + Seek>(&self, mut reader: R) -> Result<PixelSurface, RegistryError> {
        let decoder = self.detect(&mut reader)?;
        Ok(decoder.decode(&mut reader)?)
    }

    /// Describe a stream with whichever decoder claims its signature
    pub fn describe<R: Read + Seek>(&self, mut reader: R) -> Result<ImageInfo, RegistryError> {
        let decoder = self.detect(&mut reader)?;
        Ok(decoder.describe(&mut reader)?)
    }

    /// List all registered decoders
    pub fn list(&self) -> Vec<DecoderInfo> {
        self.entries
            .iter()
            .map(|e| DecoderInfo {
                id: e.registration.id.clone(),
                name: e.registration.name.clone(),
                extensions: e.registration.extensions.clone(),
                priority: e.registration.priority,
            })
            .collect()
    }
}

/// Decoder information for display
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DecoderInfo {
    pub id: String,
    pub name: String,
    pub extensions: Vec<String>,
    pub priority: i32,
}

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Decoder with ID '{0}' already registered")]
    DuplicateId(String),

    #[error("Decoder with ID '{0}' not found")]
    NotFound(String),

    #[error("No decoder available for extension '.{0}'")]
    NoDecoderForExtension(String),

    #[error("No decoder available for path: {}", .0.display())]
    NoDecoderForPath(PathBuf),

    #[error("No decoder recognizes signature {0:02X?}")]
    UnknownSignature(Vec<u8>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Decode(#[from] DdsError),
}

/// Builder for decoder registration
pub struct DecoderRegistrationBuilder {
    id: Option<String>,
    name: Option<String>,
    extensions: Vec<String>,
    priority: i32,
    factory: Option<DecoderFactory>,
}

impl DecoderRegistrationBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            name: None,
            extensions: Vec::new(),
            priority: 0,
            factory: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn extensions(mut self, exts: &[&str]) -> Self {
        self.extensions = exts.iter().map(|s| s.to_lowercase()).collect();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn factory<F, D>(mut self, factory: F) -> Self
    where
        F: Fn() -> D + Send + Sync + 'static,
        D: ImageDecoder + 'static,
    {
        self.factory = Some(Box::new(move || -> Arc<dyn ImageDecoder> { Arc::new(factory()) }));
        self
    }

    pub fn build(self) -> Result<DecoderRegistration, &'static str> {
        let id = self.id.ok_or("ID is required")?;
        let factory = self.factory.ok_or("Factory is required")?;

        Ok(DecoderRegistration {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            extensions: self.extensions,
            priority: self.priority,
            factory,
        })
    }
}

impl Default for DecoderRegistrationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Registration for the built-in DDS decoder
pub fn dds_registration(options: crate::traits::DecodeOptions) -> DecoderRegistration {
    DecoderRegistration {
        id: "dds".to_string(),
        name: "DDS Texture Decoder".to_string(),
        extensions: vec!["dds".to_string()],
        priority: 100,
        factory: Box::new(move || -> Arc<dyn ImageDecoder> {
            Arc::new(crate::dds::DdsDecoder::with_options(options.clone()))
        }),
    }
}
