//! Decoder lifecycle and the field/metadata presentation model.
//!
//! Every container decoder implements [`RomData`], the common state
//! machine behind the per-format parsers:
//!
//! ```text
//! instantiate ──> Valid ──────────────> fields()/meta_data() cached
//!       │                                      │
//!       └──> Invalid (terminal)                └──> close()
//! ```
//!
//! Instantiation performs open-and-validate in one step; a structural
//! failure leaves the instance `Invalid`, usable only to report that the
//! file was not recognized. Field and metadata lists are loaded lazily on
//! first access and cached; the caller either gets a fully populated
//! snapshot or an error, never a partial list. `close()` releases the
//! byte source and is idempotent; lists that were already loaded remain
//! accessible afterwards.
//!
//! An instance is owned by one logical caller at a time and is not
//! internally synchronized. Independent instances are fully parallel.

use crate::Result;

/// Typed value of a single displayed attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Ordinary display text.
    Text(String),
    /// A condition the user should see, e.g. a failed key verification.
    Warning(String),
}

/// One (label, value) display attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: FieldValue,
}

impl Field {
    pub(crate) fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: FieldValue::Text(value.into()),
        }
    }

    pub(crate) fn warning(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: FieldValue::Warning(value.into()),
        }
    }
}

/// Ordered, read-only snapshot of a decoder's display attributes.
pub type FieldList = Vec<Field>;

/// Canonical metadata properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// Display title of the contained software.
    Title,
}

/// Read-only snapshot of canonical metadata properties.
pub type MetaDataList = Vec<(Property, String)>;

/// Common lifecycle contract implemented by every container decoder.
pub trait RomData: Send {
    /// Name of the system this container format belongs to.
    fn system_name(&self) -> &'static str;

    /// Whether structural validation succeeded at instantiation.
    fn is_valid(&self) -> bool;

    /// Display fields, loaded on first call and cached.
    ///
    /// Works even when decryption failed: fields derivable from plaintext
    /// headers are still emitted, preceded by a warning field describing
    /// the key problem.
    fn fields(&mut self) -> Result<&FieldList>;

    /// Canonical metadata, loaded on first call and cached.
    ///
    /// Unlike [`RomData::fields`], this fails with
    /// [`crate::Error::MetadataUnavailable`] when the properties that
    /// require decryption (at minimum the title) cannot be obtained.
    fn meta_data(&mut self) -> Result<&MetaDataList>;

    /// Release the byte source and any decrypting sub-reader. Idempotent.
    fn close(&mut self);
}
