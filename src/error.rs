//! Library-wide error and result types.

use std::io;

use thiserror::Error;

/// Result alias used throughout rompeek.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Error messages are kept intentionally terse; callers that need richer
/// context should wrap `Error` in their own type.
#[derive(Debug, Error)]
pub enum Error {
    /// A magic/signature field did not match the expected value.
    #[error("bad magic value")]
    BadMagic,
    /// No registered format descriptor matched the probed header.
    #[error("unrecognized container format")]
    UnknownFormat,
    /// The byte source ended before all expected bytes could be read.
    #[error("unexpected end of file")]
    UnexpectedEof,
    /// An offset or length would read outside the valid region.
    #[error("invalid offset or size")]
    InvalidRange,
    /// A structural constraint was violated (message describes which one).
    #[error("parse error: {0}")]
    Parse(&'static str),
    /// The instance has been closed and its byte source released.
    #[error("file is not open")]
    NotOpen,
    /// Canonical metadata could not be derived, usually because an
    /// encrypted region was unreadable.
    #[error("metadata unavailable: {0}")]
    MetadataUnavailable(&'static str),
    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
