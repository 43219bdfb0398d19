//! Error types for Secure QR decoding

use thiserror::Error;

/// Result type alias for decoder operations
pub type Result<T> = std::result::Result<T, Error>;

/// The payload does not have the shape of an mAadhaar Secure QR.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Payload contains something other than ASCII digits
    #[error("not a numeric payload")]
    NotNumeric,

    /// Payload is shorter than any real Secure QR
    #[error("payload too short: {len} characters, need at least {min}")]
    TooShort { len: usize, min: usize },

    /// Decompressed buffer has no room for signed content
    #[error("no signed content: decoded buffer is only {len} bytes")]
    NoSignedContent { len: usize },

    /// Too few field delimiters in the signed region
    #[error("insufficient structure: found {found} delimiters, need at least {min}")]
    InsufficientStructure { found: usize, min: usize },
}

/// The decompression primitive rejected the payload bytes.
#[derive(Error, Debug)]
#[error("failed to decompress payload: {0}")]
pub struct DecodeError(#[source] pub std::io::Error);

/// Any failure of a decode call
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl Error {
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }
}
