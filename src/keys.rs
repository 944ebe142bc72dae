//! Key management for encrypted container formats.
//!
//! The crate ships no key material. Keys come from a user-supplied
//! keyring and are therefore untrusted: a stale or corrupted entry would
//! silently decrypt garbage and display wrong metadata. Decoders go
//! through [`KeyStore::get_and_verify`], which proves a candidate key
//! correct against a known ciphertext before it is ever used on real
//! data.
//!
//! ## Keyring format
//! Plain `name = hex_value` text, one entry per line, comments prefixed
//! with `;`. Key names are format-specific (the WAD decoder looks up
//! `rvl-common`, `rvl-korean`, `vwii-common`, and `rvt-debug`).
//!
//! ## Population
//! A store is constructed explicitly and passed to decoders; there is no
//! process-wide singleton. The backing table can be filled eagerly
//! ([`KeyStore::from_reader`]) or on first use ([`KeyStore::with_loader`]).
//! Lazy population runs at most once: concurrent first callers block
//! until the table is ready, and every later lookup is a plain read.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::result::Result as StdResult;
use std::sync::OnceLock;

use crate::Result;
#[cfg(feature = "crypto")]
use crate::crypto::cipher::BlockCipher;

/// Public reference plaintext for key verification.
///
/// A key is considered correct when encrypting this block under it (CBC
/// with a zero IV, which for a single block is plain ECB) reproduces the
/// verification ciphertext embedded in the calling decoder.
pub const VERIFY_PLAINTEXT: [u8; 16] = *b"AES-128-ECB-TEST";

/// One named key from the keyring. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct KeyEntry {
    pub name: String,
    pub key: Vec<u8>,
    /// Declared key length in bits.
    pub bits: u16,
}

impl KeyEntry {
    /// Key bytes as a fixed 16-byte AES key, when the length matches.
    pub fn key16(&self) -> Option<&[u8; 16]> {
        self.key.as_slice().try_into().ok()
    }
}

/// Outcome of a key-verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyResult {
    /// The key matched its verification ciphertext.
    Ok,
    /// The keyring has no entry under the requested name.
    KeyNotFound,
    /// The keyring entry did not reproduce the verification ciphertext.
    IncorrectKey,
    /// The caller supplied no verification ciphertext for this key.
    VerificationDataMissing,
    /// The crate was built without the `crypto` feature.
    DecryptionUnsupported,
    /// Verification was never attempted.
    Unknown,
}

impl VerifyResult {
    /// Human-readable description, suitable for a warning field.
    pub fn description(self) -> &'static str {
        match self {
            VerifyResult::Ok => "key is valid",
            VerifyResult::KeyNotFound => "required decryption key was not found in the keyring",
            VerifyResult::IncorrectKey => "the decryption key in the keyring is incorrect",
            VerifyResult::VerificationDataMissing => {
                "no verification data is available for this key"
            }
            VerifyResult::DecryptionUnsupported => "decryption support was not compiled in",
            VerifyResult::Unknown => "unknown key verification error",
        }
    }
}

/// Backing table of a [`KeyStore`]: key name to entry.
pub type KeyTable = HashMap<String, KeyEntry>;
type Loader = Box<dyn Fn() -> KeyTable + Send + Sync>;

/// Process-lifetime store of named keys with verified retrieval.
pub struct KeyStore {
    table: OnceLock<KeyTable>,
    loader: Option<Loader>,
}

impl KeyStore {
    /// Store with no keys; every lookup reports
    /// [`VerifyResult::KeyNotFound`].
    pub fn empty() -> Self {
        let table = OnceLock::new();
        let _ = table.set(KeyTable::new());
        Self {
            table,
            loader: None,
        }
    }

    /// Store populated eagerly from a keyring reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let parsed = Self::parse_keyring(reader)?;
        let table = OnceLock::new();
        let _ = table.set(parsed);
        Ok(Self {
            table,
            loader: None,
        })
    }

    /// Store populated on first use by `loader`.
    ///
    /// The loader runs at most once for the lifetime of the store, even
    /// under concurrent first lookups.
    pub fn with_loader(loader: impl Fn() -> KeyTable + Send + Sync + 'static) -> Self {
        Self {
            table: OnceLock::new(),
            loader: Some(Box::new(loader)),
        }
    }

    /// Parse a `name = hex` keyring into a table.
    ///
    /// Blank lines and `;` comments are skipped, as are entries whose
    /// value is not valid hex; the keyring is user-edited and one bad
    /// line should not discard the rest.
    pub fn parse_keyring<R: Read>(reader: R) -> Result<KeyTable> {
        let mut table = KeyTable::new();
        for line in BufReader::new(reader).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            let Some((name, value)) = line.split_once('=') else {
                continue;
            };
            let name = name.trim();
            let Ok(key) = decode_hex(value.trim()) else {
                log::warn!("keyring: ignoring entry {name:?} with invalid hex value");
                continue;
            };
            if name.is_empty() || key.is_empty() {
                continue;
            }
            let bits = (key.len() * 8) as u16;
            table.insert(
                name.to_owned(),
                KeyEntry {
                    name: name.to_owned(),
                    key,
                    bits,
                },
            );
        }
        Ok(table)
    }

    fn table(&self) -> &KeyTable {
        self.table.get_or_init(|| match &self.loader {
            Some(loader) => loader(),
            None => KeyTable::new(),
        })
    }

    /// Look up a key without verification.
    pub fn get(&self, name: &str) -> Option<&KeyEntry> {
        self.table().get(name)
    }

    /// Verified retrieval.
    ///
    /// Encrypts [`VERIFY_PLAINTEXT`] under the named key and compares the
    /// result against `verify_data`, the known-correct ciphertext the
    /// calling decoder embeds for that key. The entry is returned only on
    /// [`VerifyResult::Ok`].
    #[cfg(feature = "crypto")]
    pub fn get_and_verify(
        &self,
        name: &str,
        verify_data: Option<&[u8; 16]>,
    ) -> (VerifyResult, Option<&KeyEntry>) {
        let Some(verify_data) = verify_data else {
            return (VerifyResult::VerificationDataMissing, None);
        };
        let Some(entry) = self.table().get(name) else {
            return (VerifyResult::KeyNotFound, None);
        };
        let Some(key) = entry.key16() else {
            log::warn!("keyring: {name} is {} bits, expected 128", entry.bits);
            return (VerifyResult::IncorrectKey, None);
        };
        let mut block = VERIFY_PLAINTEXT;
        BlockCipher::new(key).encrypt_block(&mut block);
        if &block == verify_data {
            (VerifyResult::Ok, Some(entry))
        } else {
            log::warn!("keyring: {name} failed verification");
            (VerifyResult::IncorrectKey, None)
        }
    }

    /// Verified retrieval stub for builds without the cipher primitive.
    #[cfg(not(feature = "crypto"))]
    pub fn get_and_verify(
        &self,
        _name: &str,
        _verify_data: Option<&[u8; 16]>,
    ) -> (VerifyResult, Option<&KeyEntry>) {
        (VerifyResult::DecryptionUnsupported, None)
    }
}

fn decode_hex(s: &str) -> StdResult<Vec<u8>, ()> {
    if s.is_empty() || !s.len().is_multiple_of(2) {
        return Err(());
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    for chunk in s.as_bytes().chunks(2) {
        let hi = hex_nibble(chunk[0])?;
        let lo = hex_nibble(chunk[1])?;
        out.push((hi << 4) | lo);
    }
    Ok(out)
}

fn hex_nibble(b: u8) -> StdResult<u8, ()> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(()),
    }
}
