//! **rompeek** - console ROM and disc-image metadata extraction.
//!
//! Identifies which supported container format a byte stream holds, then
//! decodes its headers into display fields and canonical metadata.
//! Several formats keep parts of the image encrypted; those are handled
//! by a key store with verification-before-use and a random-access CBC
//! reader (`crypto` feature, on by default). No key material ships with
//! the crate; keys are loaded from a user-supplied keyring.
//!
//! # Supported formats
//! | Module | Format |
//! |--------|--------|
//! | [`formats::wad`] | WAD - installable Wii title package |
//!
//! # Quick start
//! ```no_run
//! use std::sync::Arc;
//!
//! use rompeek::detect::FormatRegistry;
//! use rompeek::keys::KeyStore;
//! use rompeek::romdata::RomData;
//! use rompeek::source::FileSource;
//!
//! # fn main() -> rompeek::Result<()> {
//! let keys = Arc::new(KeyStore::empty());
//! let registry = FormatRegistry::builtin();
//!
//! let source = Arc::new(FileSource::open("channel.wad")?);
//! let mut rom = registry.open(source, &keys)?;
//! for field in rom.fields()? {
//!     println!("{}: {:?}", field.label, field.value);
//! }
//! rom.close();
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "crypto")]
pub mod crypto;
pub mod detect;
pub mod error;
pub mod formats;
pub mod keys;
pub mod romdata;
pub mod source;
pub mod utils;

pub use error::{Error, Result};
