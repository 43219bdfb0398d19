//! Numeric payload to byte buffer conversion

use flate2::read::ZlibDecoder;
use num_bigint::BigUint;
use std::io::prelude::*;

use crate::classify::MIN_PAYLOAD_LEN;
use crate::error::{DecodeError, FormatError};

/// Turns compressed payload bytes back into the raw Secure QR buffer.
pub trait Decompressor {
    fn decompress(&self, compressed: &[u8]) -> std::io::Result<Vec<u8>>;
}

/// zlib, as produced by the mAadhaar app
#[derive(Debug, Clone, Copy, Default)]
pub struct ZlibDecompressor;

impl Decompressor for ZlibDecompressor {
    fn decompress(&self, compressed: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(compressed);
        let mut uncompressed_data = Vec::new();
        decoder.read_to_end(&mut uncompressed_data)?;
        Ok(uncompressed_data)
    }
}

impl<D: Decompressor + ?Sized> Decompressor for &D {
    fn decompress(&self, compressed: &[u8]) -> std::io::Result<Vec<u8>> {
        (**self).decompress(compressed)
    }
}

/// Reads the digit string as one base-10 integer and returns its minimal
/// big-endian bytes. Shape checks run first so nothing is parsed for input
/// that cannot be a Secure QR.
pub fn payload_to_bytes(payload: &str) -> Result<Vec<u8>, FormatError> {
    if !payload.bytes().all(|b| b.is_ascii_digit()) || payload.is_empty() {
        return Err(FormatError::NotNumeric);
    }
    if payload.len() < MIN_PAYLOAD_LEN {
        return Err(FormatError::TooShort {
            len: payload.len(),
            min: MIN_PAYLOAD_LEN,
        });
    }

    let number = BigUint::parse_bytes(payload.as_bytes(), 10).ok_or(FormatError::NotNumeric)?;
    Ok(number.to_bytes_be())
}

/// Decodes the numeric payload all the way to the decompressed buffer.
pub fn decompress_payload<D: Decompressor>(payload: &str, decompressor: &D) -> crate::Result<Vec<u8>> {
    let bytes = payload_to_bytes(payload)?;
    let buffer = decompressor.decompress(&bytes).map_err(DecodeError)?;
    Ok(buffer)
}
