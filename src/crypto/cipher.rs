//! AES-128 block primitive with CBC chaining.
//!
//! Single-block operations are exposed alongside whole-run decryption
//! because CBC decryption of block *i* needs only ciphertext blocks *i*
//! and *i - 1*; that independence is what [`crate::crypto::reader`]
//! exploits for random access.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Block};
use cbc::cipher::{BlockDecryptMut, KeyIvInit};

use crate::{Error, Result};

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// AES-128 engine holding an expanded key schedule and nothing else.
///
/// Every operation takes `&self`; one engine can serve any number of
/// concurrent callers.
pub struct BlockCipher {
    key: [u8; 16],
    inner: Aes128,
}

impl BlockCipher {
    /// Expand `key` into a reusable engine.
    pub fn new(key: &[u8; 16]) -> Self {
        Self {
            key: *key,
            inner: Aes128::new(key.into()),
        }
    }

    /// Encrypt one block in place.
    ///
    /// Raw ECB, which also equals single-block CBC under a zero IV; key
    /// verification relies on that equivalence.
    pub fn encrypt_block(&self, block: &mut [u8; 16]) {
        self.inner.encrypt_block(Block::from_mut_slice(block));
    }

    /// Decrypt one block in place with an explicit chaining value.
    ///
    /// `chain` is the previous ciphertext block, or the IV for block 0.
    pub fn decrypt_block_cbc(&self, block: &mut [u8; 16], chain: &[u8; 16]) {
        self.inner.decrypt_block(Block::from_mut_slice(block));
        for (b, c) in block.iter_mut().zip(chain) {
            *b ^= c;
        }
    }

    /// CBC-decrypt a run of whole blocks in place.
    ///
    /// `data` must be a multiple of [`BLOCK_SIZE`] bytes; no padding is
    /// interpreted or removed.
    pub fn decrypt_cbc(&self, iv: &[u8; 16], data: &mut [u8]) -> Result<()> {
        if !data.len().is_multiple_of(BLOCK_SIZE) {
            return Err(Error::InvalidRange);
        }
        let mut decryptor = cbc::Decryptor::<Aes128>::new(&self.key.into(), iv.into());
        for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
            decryptor.decrypt_block_mut(Block::from_mut_slice(chunk));
        }
        Ok(())
    }
}
