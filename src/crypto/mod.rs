//! Cryptographic subsystem: the AES-CBC engine and the random-access
//! decrypting reader.
//!
//! Compiled only with the `crypto` feature (on by default). Without it
//! the crate still parses plaintext headers; key lookups then report
//! [`crate::keys::VerifyResult::DecryptionUnsupported`] and encrypted
//! regions stay opaque.
//!
//! | Module     | Purpose |
//! |------------|---------|
//! | [`cipher`] | AES-128 block primitive with CBC chaining |
//! | [`reader`] | Randomly-seekable decrypted view over a ciphertext range |
//!
//! Everything here is for **offline file-format parsing**: the key
//! material involved protects decades-old console content, not user
//! secrets, so constant-time behavior is a non-goal.

pub mod cipher;
pub mod reader;
