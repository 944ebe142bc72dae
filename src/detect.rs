//! Format detection: header probes, descriptors, and the registry.
//!
//! Each supported container format contributes one [`FormatDescriptor`]
//! with a pure predicate over a [`HeaderProbe`]. The [`FormatRegistry`]
//! holds the descriptors in priority order and answers "which format is
//! this?" without touching anything beyond the probe window.
//!
//! The registry is built once at startup and read-only afterwards, which
//! makes it safe to share across threads without locking.

use std::sync::Arc;

use bitflags::bitflags;

use crate::keys::KeyStore;
use crate::romdata::RomData;
use crate::source::SharedSource;
use crate::{Error, Result};

/// Number of leading bytes captured for a detection probe.
pub const PROBE_LEN: usize = 0x400;

/// Immutable snapshot of the data a detection predicate may inspect.
///
/// The header window always starts at file offset 0.
#[derive(Debug, Clone, Copy)]
pub struct HeaderProbe<'a> {
    /// Leading bytes of the file, at most [`PROBE_LEN`].
    pub header: &'a [u8],
    /// Total file size in bytes.
    pub file_size: u64,
    /// Lower-case filename extension without the dot, when known.
    ///
    /// A tie-break hint only: no predicate may claim a file from the
    /// extension alone.
    pub ext: Option<&'a str>,
}

bitflags! {
    /// Features a decoder can provide, used to filter detection results.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u32 {
        /// Decodes an icon or banner embedded in the container.
        const INTERNAL_ICON = 1 << 0;
        /// Exposes identifiers usable to fetch external artwork.
        const EXTERNAL_ARTWORK = 1 << 1;
        /// Reports whether a title requests dangerous permissions.
        const DANGEROUS_PERMISSIONS = 1 << 2;
    }
}

/// Declarative description of one supported container format.
///
/// Descriptors are `'static` and registered once; everything in them is
/// immutable.
pub struct FormatDescriptor {
    /// Stable format identifier, e.g. `"wad"`.
    pub name: &'static str,
    /// File extensions (without the leading dot) for registration hints.
    pub extensions: &'static [&'static str],
    /// MIME types for metadata-extractor registration.
    pub mime_types: &'static [&'static str],
    /// What the decoder behind this descriptor can provide.
    pub capabilities: Capabilities,
    /// Pure detection predicate. Must reject short or inconsistent
    /// headers; see [`FormatRegistry::detect`].
    pub matches: fn(&HeaderProbe) -> bool,
    /// Factory running open-and-validate; check `is_valid()` on the
    /// result to distinguish a corrupt file from a decodable one.
    pub instantiate: fn(SharedSource, Arc<KeyStore>) -> Box<dyn RomData>,
}

/// Priority-ordered, append-only format table.
pub struct FormatRegistry {
    descriptors: Vec<&'static FormatDescriptor>,
}

impl FormatRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Registry holding every built-in format, highest priority first.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(&crate::formats::wad::DESCRIPTOR);
        registry
    }

    /// Append `descriptor` with the lowest priority so far.
    pub fn register(&mut self, descriptor: &'static FormatDescriptor) {
        self.descriptors.push(descriptor);
    }

    /// Registered descriptors in priority order.
    pub fn descriptors(&self) -> &[&'static FormatDescriptor] {
        &self.descriptors
    }

    /// Identify the format of `probe`.
    ///
    /// Walks descriptors in registration order and returns the first
    /// whose predicate matches and whose capabilities contain all bits of
    /// `required`. Returns [`None`] when nothing matches; that is not an
    /// error, it means "unsupported format".
    pub fn detect(
        &self,
        probe: &HeaderProbe,
        required: Capabilities,
    ) -> Option<&'static FormatDescriptor> {
        self.descriptors
            .iter()
            .copied()
            .find(|d| (d.matches)(probe) && d.capabilities.contains(required))
    }

    /// Probe `source` and instantiate the matching decoder.
    ///
    /// Reads the leading [`PROBE_LEN`] bytes, runs detection with no
    /// capability requirement, and hands the source to the winning
    /// descriptor's factory. [`Error::UnknownFormat`] when no descriptor
    /// matches.
    pub fn open(&self, source: SharedSource, keys: &Arc<KeyStore>) -> Result<Box<dyn RomData>> {
        let file_size = source.size()?;
        let mut buf = [0u8; PROBE_LEN];
        let n = source.read_at(0, &mut buf)?;
        let probe = HeaderProbe {
            header: &buf[..n],
            file_size,
            ext: None,
        };
        let Some(descriptor) = self.detect(&probe, Capabilities::empty()) else {
            log::debug!("detect: no match ({n} probe bytes, {file_size} file bytes)");
            return Err(Error::UnknownFormat);
        };
        log::debug!("detect: {}", descriptor.name);
        Ok((descriptor.instantiate)(source, Arc::clone(keys)))
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}
