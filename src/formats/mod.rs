//! Container-format decoders.
//!
//! Each submodule targets one format family. All decoders follow the
//! same conventions:
//!
//! * **Positioned reads only** - structures are fetched through a
//!   [`crate::source::ByteSource`]; there is no shared cursor to corrupt.
//! * **Validate before decrypting** - plaintext structure checks run
//!   first, and a failure there invalidates the instance. Key problems
//!   never do; whatever the plaintext headers provide is still exposed.
//! * **Results through the lifecycle trait** - every decoder is queried
//!   via [`crate::romdata::RomData`] and advertises itself with a
//!   [`crate::detect::FormatDescriptor`].
//!
//! | Module   | Format |
//! |----------|--------|
//! | [`wad`]  | WAD - installable Wii title package |
//! | [`imet`] | IMET - channel-name banner block inside title contents |

pub mod imet;
pub mod wad;
