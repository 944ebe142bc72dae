//! Randomly-seekable decrypted view over a ciphertext range.
//!
//! CBC decryption of block *i* needs only ciphertext blocks *i* and
//! *i - 1*; unlike encryption there is no sequential chain to walk.
//! [`CbcReader`] exploits that to present a window of AES-128-CBC
//! ciphertext inside a [`ByteSource`] as a transparently decrypted byte
//! range with O(length) cost per request, wherever the request lands.
//!
//! The reader caches nothing between calls; every request is recomputed
//! from ciphertext. One reader can therefore serve concurrent callers,
//! as long as the wrapped source supports concurrent positioned reads
//! (a [`crate::source::FileSource`] serializes them internally).

use crate::crypto::cipher::{BLOCK_SIZE, BlockCipher};
use crate::source::{ByteSource, SharedSource};
use crate::{Error, Result};

/// Decrypted view of the ciphertext range `[base, base + len)` of a
/// shared byte source.
pub struct CbcReader {
    source: SharedSource,
    base: u64,
    len: u64,
    cipher: BlockCipher,
    iv: [u8; 16],
}

impl CbcReader {
    /// New reader over `len` bytes of ciphertext starting at `base`.
    ///
    /// `iv` is the chaining value for the first block of the range.
    pub fn new(source: SharedSource, base: u64, len: u64, key: &[u8; 16], iv: [u8; 16]) -> Self {
        Self {
            source,
            base,
            len,
            cipher: BlockCipher::new(key),
            iv,
        }
    }

    /// Logical (plaintext) length of the window.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Decrypt exactly `buf.len()` bytes at plaintext offset `offset`.
    ///
    /// An empty buffer or a window extending past [`CbcReader::len`]
    /// fails with [`Error::InvalidRange`]; truncated ciphertext in the
    /// underlying source fails with [`Error::UnexpectedEof`] rather than
    /// zero-filling.
    pub fn read(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let want = buf.len() as u64;
        if want == 0 || offset >= self.len || want > self.len - offset {
            return Err(Error::InvalidRange);
        }

        // Whole-block range covering the request.
        let block = BLOCK_SIZE as u64;
        let b0 = offset / block;
        let b1 = (offset + want).div_ceil(block);
        let nblocks = usize::try_from(b1 - b0).map_err(|_| Error::InvalidRange)?;

        // One positioned read fetches the covering ciphertext run plus
        // the preceding block, which chains block b0. Block 0 chains off
        // the configured IV instead.
        let lead = if b0 == 0 { 0 } else { BLOCK_SIZE };
        let mut ciphertext = vec![0u8; lead + nblocks * BLOCK_SIZE];
        let read_base = self.base + b0 * block - lead as u64;
        self.source.read_exact_at(read_base, &mut ciphertext)?;

        let mut chain = if lead == 0 {
            self.iv
        } else {
            let mut c = [0u8; BLOCK_SIZE];
            c.copy_from_slice(&ciphertext[..BLOCK_SIZE]);
            c
        };

        let mut plain = vec![0u8; nblocks * BLOCK_SIZE];
        for (src, dst) in ciphertext[lead..]
            .chunks_exact(BLOCK_SIZE)
            .zip(plain.chunks_exact_mut(BLOCK_SIZE))
        {
            let mut work = [0u8; BLOCK_SIZE];
            work.copy_from_slice(src);
            let next_chain = work;
            self.cipher.decrypt_block_cbc(&mut work, &chain);
            chain = next_chain;
            dst.copy_from_slice(&work);
        }

        let skip = (offset - b0 * block) as usize;
        buf.copy_from_slice(&plain[skip..skip + buf.len()]);
        Ok(())
    }

    /// Whether the wrapped source is still open.
    pub fn is_open(&self) -> bool {
        self.source.is_open()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::source::MemSource;

    const KEY: [u8; 16] = *b"an aes test key!";
    const IV: [u8; 16] = [0x11; 16];

    /// CBC-encrypt `data` in place (test fixtures only).
    fn cbc_encrypt(key: &[u8; 16], iv: [u8; 16], data: &mut [u8]) {
        let cipher = BlockCipher::new(key);
        let mut chain = iv;
        for block in data.chunks_exact_mut(BLOCK_SIZE) {
            for (b, c) in block.iter_mut().zip(chain) {
                *b ^= c;
            }
            let block: &mut [u8; BLOCK_SIZE] = block.try_into().unwrap();
            cipher.encrypt_block(block);
            chain = *block;
        }
    }

    /// Plaintext where every byte encodes its own offset.
    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + i / 256) as u8).collect()
    }

    fn reader_over(plain: &[u8], prefix: usize) -> CbcReader {
        let mut data = plain.to_vec();
        cbc_encrypt(&KEY, IV, &mut data);
        let mut file = vec![0xAA; prefix];
        file.extend_from_slice(&data);
        CbcReader::new(
            Arc::new(MemSource::new(file)),
            prefix as u64,
            plain.len() as u64,
            &KEY,
            IV,
        )
    }

    #[test]
    fn whole_range_round_trips() {
        let plain = pattern(8 * BLOCK_SIZE);
        let reader = reader_over(&plain, 0x40);
        let mut out = vec![0u8; plain.len()];
        reader.read(0, &mut out).unwrap();
        assert_eq!(out, plain);
    }

    #[test]
    fn isolated_blocks_match_sequential_decryption() {
        let plain = pattern(8 * BLOCK_SIZE);
        let reader = reader_over(&plain, 0);
        for block in [0usize, 1, 7] {
            let mut out = [0u8; BLOCK_SIZE];
            reader.read((block * BLOCK_SIZE) as u64, &mut out).unwrap();
            assert_eq!(out, plain[block * BLOCK_SIZE..(block + 1) * BLOCK_SIZE]);
        }
    }

    #[test]
    fn ranges_straddling_block_boundaries() {
        let plain = pattern(8 * BLOCK_SIZE);
        let reader = reader_over(&plain, 0x40);
        for (offset, len) in [(1usize, 14usize), (10, 20), (15, 2), (30, 66), (127, 1)] {
            let mut out = vec![0u8; len];
            reader.read(offset as u64, &mut out).unwrap();
            assert_eq!(out, plain[offset..offset + len], "offset {offset} len {len}");
        }
    }

    #[test]
    fn repeated_reads_are_identical() {
        let plain = pattern(4 * BLOCK_SIZE);
        let reader = reader_over(&plain, 0);
        let mut a = vec![0u8; 40];
        let mut b = vec![0u8; 40];
        reader.read(5, &mut a).unwrap();
        reader.read(5, &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn out_of_range_requests_fail() {
        let plain = pattern(4 * BLOCK_SIZE);
        let reader = reader_over(&plain, 0);
        let mut buf = [0u8; 16];
        assert!(matches!(
            reader.read(plain.len() as u64, &mut buf),
            Err(Error::InvalidRange)
        ));
        assert!(matches!(
            reader.read(plain.len() as u64 - 8, &mut buf),
            Err(Error::InvalidRange)
        ));
        let mut empty: [u8; 0] = [];
        assert!(matches!(
            reader.read(0, &mut empty),
            Err(Error::InvalidRange)
        ));
    }

    #[test]
    fn truncated_ciphertext_is_an_error() {
        // Reader claims 4 blocks but the source holds only 2.
        let plain = pattern(4 * BLOCK_SIZE);
        let mut data = plain.clone();
        cbc_encrypt(&KEY, IV, &mut data);
        data.truncate(2 * BLOCK_SIZE);
        let reader = CbcReader::new(
            Arc::new(MemSource::new(data)),
            0,
            plain.len() as u64,
            &KEY,
            IV,
        );
        let mut buf = [0u8; BLOCK_SIZE];
        assert!(matches!(
            reader.read(3 * BLOCK_SIZE as u64, &mut buf),
            Err(Error::UnexpectedEof)
        ));
        // The intact prefix still decrypts.
        reader.read(0, &mut buf).unwrap();
        assert_eq!(buf, plain[..BLOCK_SIZE]);
    }
}
