//! Byte-source abstraction consumed by every decoder.
//!
//! Decoders do not take [`std::io::Read`] directly: a decoder and its
//! decrypting sub-reader may need the same underlying bytes at unrelated
//! offsets without coordinating a shared cursor, so the contract is
//! positioned reads only. Implementations are read-only; nothing in this
//! crate ever writes through a [`ByteSource`].
//!
//! Sources are handed around as [`SharedSource`] handles. Cloning a handle
//! duplicates access to the same open file; the file stays open until the
//! last handle is dropped.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{Error, Result};

/// Positioned, read-only access to an open file or in-memory image.
pub trait ByteSource: Send + Sync {
    /// Total size of the source in bytes.
    fn size(&self) -> Result<u64>;

    /// Read up to `buf.len()` bytes at `offset`.
    ///
    /// Returns the number of bytes read; `0` past the end of the source.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Whether the source is still open and readable.
    fn is_open(&self) -> bool {
        true
    }

    /// Read exactly `buf.len()` bytes at `offset`.
    ///
    /// A short read becomes [`Error::UnexpectedEof`]; the buffer contents
    /// are unspecified on error.
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let n = self.read_at(offset, buf)?;
        if n != buf.len() {
            return Err(Error::UnexpectedEof);
        }
        Ok(())
    }
}

/// Shared handle to an open byte source.
pub type SharedSource = Arc<dyn ByteSource>;

/// Byte source over an in-memory image.
pub struct MemSource {
    data: Vec<u8>,
}

impl MemSource {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl ByteSource for MemSource {
    fn size(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let Ok(off) = usize::try_from(offset) else {
            return Ok(0);
        };
        if off >= self.data.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.data.len() - off);
        buf[..n].copy_from_slice(&self.data[off..off + n]);
        Ok(n)
    }
}

/// Byte source over a local file.
///
/// Positioned reads are emulated with seek-then-read under a mutex. The
/// lock serializes access to the file descriptor only; it is never held
/// across anything but the read itself, so independent readers sharing
/// one handle contend only on actual I/O.
pub struct FileSource {
    file: Mutex<File>,
}

impl FileSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            file: Mutex::new(File::open(path)?),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, File>> {
        self.file
            .lock()
            .map_err(|_| Error::Io(io::Error::other("file lock poisoned")))
    }
}

impl ByteSource for FileSource {
    fn size(&self) -> Result<u64> {
        Ok(self.lock()?.metadata()?.len())
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let mut file = self.lock()?;
        file.seek(SeekFrom::Start(offset))?;
        let mut read = 0;
        while read < buf.len() {
            let n = file.read(&mut buf[read..])?;
            if n == 0 {
                break;
            }
            read += n;
        }
        Ok(read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_source_bounds() {
        let src = MemSource::new(vec![1, 2, 3, 4, 5]);
        assert_eq!(src.size().unwrap(), 5);

        let mut buf = [0u8; 3];
        assert_eq!(src.read_at(1, &mut buf).unwrap(), 3);
        assert_eq!(buf, [2, 3, 4]);

        // Reads past the end are short, not errors.
        assert_eq!(src.read_at(4, &mut buf).unwrap(), 1);
        assert_eq!(src.read_at(5, &mut buf).unwrap(), 0);
        assert_eq!(src.read_at(u64::MAX, &mut buf).unwrap(), 0);
    }

    #[test]
    fn read_exact_at_rejects_short_reads() {
        let src = MemSource::new(vec![0u8; 8]);
        let mut buf = [0u8; 8];
        assert!(src.read_exact_at(0, &mut buf).is_ok());
        assert!(matches!(
            src.read_exact_at(1, &mut buf),
            Err(Error::UnexpectedEof)
        ));
    }
}
