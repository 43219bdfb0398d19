//! mAadhaar Secure QR decoding
//!
//! The decompressed buffer is laid out as
//!
//! ```text
//! version 255 field1 255 field2 255 ... field17 255 photo | signature (256 bytes)
//! ```
//!
//! Fields are numbered from 1; field `n` sits between the `n-1`th and `n`th
//! delimiter (0-indexed). Everything before the signature is the signed region.

use base64::{engine::general_purpose, Engine as _};
use serde::{Serialize, Serializer};
use std::ops::Range;

use crate::compression::{decompress_payload, Decompressor, ZlibDecompressor};
use crate::error::{FormatError, Result};
use crate::record::{format_date_of_birth, join_address, non_empty, IdentityRecord};

/// Length of the trailing RSA signature
pub const SIGNATURE_LEN: usize = 256;

/// Field separator byte
pub const DELIMITER: u8 = 255;

/// The format never has more than this many separators
pub const MAX_DELIMITERS: usize = 18;

/// Fewer separators than this cannot hold the identity fields
pub const MIN_DELIMITERS: usize = 7;

/// Absolute offsets of the last four Aadhaar digits (start of the reference id)
const LAST_4_DIGITS: Range<usize> = 5..9;

/// Field positions in the V2 layout
pub mod field {
    pub const EMAIL_MOBILE_INDICATOR: usize = 1;
    pub const REFERENCE_ID: usize = 2;
    pub const NAME: usize = 3;
    pub const DATE_OF_BIRTH: usize = 4;
    pub const GENDER: usize = 5;
    pub const CARE_OF: usize = 6;
    pub const DISTRICT: usize = 7;
    pub const LANDMARK: usize = 8;
    pub const HOUSE: usize = 9;
    pub const LOCATION: usize = 10;
    pub const PINCODE: usize = 11;
    pub const POST_OFFICE: usize = 12;
    pub const STATE: usize = 13;
    pub const STREET: usize = 14;
    pub const SUB_DISTRICT: usize = 15;
    pub const VTC: usize = 16;
    pub const MOBILE_LAST_DIGITS: usize = 17;
}

/// Positions of the first [`MAX_DELIMITERS`] separator bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterTable {
    indices: [usize; MAX_DELIMITERS],
    len: usize,
}

impl DelimiterTable {
    /// Scans left to right and stops at the 18th separator, so stray 255
    /// bytes in the photo never shift a field boundary.
    pub fn scan(region: &[u8]) -> Self {
        let mut table = DelimiterTable {
            indices: [0; MAX_DELIMITERS],
            len: 0,
        };
        for (i, &byte) in region.iter().enumerate() {
            if byte == DELIMITER {
                table.indices[table.len] = i;
                table.len += 1;
                if table.len == MAX_DELIMITERS {
                    break;
                }
            }
        }
        table
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, i: usize) -> Option<usize> {
        self.as_slice().get(i).copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices[..self.len]
    }
}

/// The signature-covered part of a decompressed Secure QR.
#[derive(Debug, Clone, Copy)]
pub struct SignedRegion<'a> {
    bytes: &'a [u8],
    delimiters: DelimiterTable,
}

impl<'a> SignedRegion<'a> {
    /// Splits `buffer` into signed region and signature.
    pub fn split(buffer: &'a [u8]) -> std::result::Result<(Self, &'a [u8]), FormatError> {
        if buffer.len() <= SIGNATURE_LEN {
            return Err(FormatError::NoSignedContent { len: buffer.len() });
        }
        let (bytes, signature) = buffer.split_at(buffer.len() - SIGNATURE_LEN);
        let region = SignedRegion {
            bytes,
            delimiters: DelimiterTable::scan(bytes),
        };
        Ok((region, signature))
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn delimiters(&self) -> &DelimiterTable {
        &self.delimiters
    }

    /// Raw bytes of field `n`; empty when the field does not exist.
    pub fn field_bytes(&self, n: usize) -> &'a [u8] {
        if n == 0 {
            return &[];
        }
        match (self.delimiters.get(n - 1), self.delimiters.get(n)) {
            (Some(start), Some(end)) => &self.bytes[start + 1..end],
            _ => &[],
        }
    }

    /// Text of field `n`, see [`latin1_text`].
    pub fn field(&self, n: usize) -> String {
        latin1_text(self.field_bytes(n))
    }

    /// Version marker in front of the first separator, e.g. `V2`
    pub fn version(&self) -> String {
        match self.delimiters.get(0) {
            Some(end) => latin1_text(&self.bytes[..end]),
            None => String::new(),
        }
    }

    pub fn last_4_digits(&self) -> String {
        let end = LAST_4_DIGITS.end.min(self.bytes.len());
        let start = LAST_4_DIGITS.start.min(end);
        latin1_text(&self.bytes[start..end])
    }

    /// Image bytes after the last separator; empty unless all 18 are present.
    pub fn photo(&self) -> &'a [u8] {
        if self.delimiters.len() < MAX_DELIMITERS {
            return &[];
        }
        match self.delimiters.get(MAX_DELIMITERS - 1) {
            Some(last) => &self.bytes[last + 1..],
            None => &[],
        }
    }
}

/// Maps each byte to the code point of the same value and trims the result.
///
/// Not UTF-8 decoding: a multi-byte sequence comes out as one char per byte.
pub fn latin1_text(bytes: &[u8]) -> String {
    let text: String = bytes.iter().map(|&b| char::from(b)).collect();
    text.trim_matches(is_field_whitespace).to_string()
}

/// Whitespace trimmed from fields. Within Latin-1 this is tab, LF, VT, FF,
/// CR, space and NBSP; NEL (0x85) is kept.
fn is_field_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r' | ' ' | '\u{A0}')
}

/// Address components of the V2 layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Address {
    pub care_of: String,
    pub district: String,
    pub landmark: String,
    pub house: String,
    pub location: String,
    pub pincode: String,
    pub post_office: String,
    pub state: String,
    pub street: String,
    pub sub_district: String,
    pub vtc: String,
}

/// Every field of a Secure QR, including photo and signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecureQrData {
    pub version: String,
    pub email_mobile_indicator: String,
    pub reference_id: String,
    pub last_4_digits: String,
    pub name: String,
    /// As printed in the QR, usually `DD-MM-YYYY`
    pub date_of_birth: String,
    pub gender: String,
    pub address: Address,
    pub mobile_last_digits: String,
    #[serde(serialize_with = "as_base64")]
    pub photo: Vec<u8>,
    #[serde(serialize_with = "as_hex")]
    pub signature: Vec<u8>,
    pub delimiter_count: usize,
}

impl SecureQrData {
    /// Extracts every field from a decompressed buffer.
    pub fn from_buffer(buffer: &[u8]) -> std::result::Result<Self, FormatError> {
        let (region, signature) = SignedRegion::split(buffer)?;

        let found = region.delimiters().len();
        if found < MIN_DELIMITERS {
            return Err(FormatError::InsufficientStructure {
                found,
                min: MIN_DELIMITERS,
            });
        }

        Ok(SecureQrData {
            version: region.version(),
            email_mobile_indicator: region.field(field::EMAIL_MOBILE_INDICATOR),
            reference_id: region.field(field::REFERENCE_ID),
            last_4_digits: region.last_4_digits(),
            name: region.field(field::NAME),
            date_of_birth: region.field(field::DATE_OF_BIRTH),
            gender: region.field(field::GENDER),
            address: Address {
                care_of: region.field(field::CARE_OF),
                district: region.field(field::DISTRICT),
                landmark: region.field(field::LANDMARK),
                house: region.field(field::HOUSE),
                location: region.field(field::LOCATION),
                pincode: region.field(field::PINCODE),
                post_office: region.field(field::POST_OFFICE),
                state: region.field(field::STATE),
                street: region.field(field::STREET),
                sub_district: region.field(field::SUB_DISTRICT),
                vtc: region.field(field::VTC),
            },
            mobile_last_digits: region.field(field::MOBILE_LAST_DIGITS),
            photo: region.photo().to_vec(),
            signature: signature.to_vec(),
            delimiter_count: found,
        })
    }

    /// 0 none, 1 email, 2 mobile, 3 both
    pub fn email_mobile_indicator(&self) -> Option<u8> {
        self.email_mobile_indicator.parse().ok()
    }

    pub fn has_email(&self) -> bool {
        matches!(self.email_mobile_indicator(), Some(1) | Some(3))
    }

    pub fn has_mobile(&self) -> bool {
        matches!(self.email_mobile_indicator(), Some(2) | Some(3))
    }

    pub fn photo_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.photo)
    }

    pub fn signature_hex(&self) -> String {
        hex::encode(&self.signature)
    }

    pub fn identity_record(&self) -> IdentityRecord {
        let address = &self.address;
        IdentityRecord {
            name: self.name.clone(),
            date_of_birth: format_date_of_birth(&self.date_of_birth),
            gender: self.gender.clone(),
            address: join_address([
                address.care_of.as_str(),
                address.district.as_str(),
                address.landmark.as_str(),
                address.house.as_str(),
                address.location.as_str(),
            ]),
            aadhaar_last_4_digits: self.last_4_digits.clone(),
            pincode: non_empty(address.pincode.clone()),
            state: non_empty(address.state.clone()),
        }
    }
}

fn as_base64<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
}

fn as_hex<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

/// Decoder with a pluggable decompression step.
#[derive(Debug, Clone, Default)]
pub struct SecureQrDecoder<D = ZlibDecompressor> {
    decompressor: D,
}

impl<D: Decompressor> SecureQrDecoder<D> {
    pub fn new(decompressor: D) -> Self {
        SecureQrDecoder { decompressor }
    }

    pub fn decode(&self, payload: &str) -> Result<IdentityRecord> {
        Ok(self.decode_full(payload)?.identity_record())
    }

    pub fn decode_full(&self, payload: &str) -> Result<SecureQrData> {
        let buffer = decompress_payload(payload, &self.decompressor)?;
        Ok(SecureQrData::from_buffer(&buffer)?)
    }
}

/// Decodes an mAadhaar numeric payload into an [`IdentityRecord`].
pub fn decode(payload: &str) -> Result<IdentityRecord> {
    SecureQrDecoder::new(ZlibDecompressor).decode(payload)
}

/// Like [`decode`], but keeps every field, the photo and the signature.
pub fn decode_full(payload: &str) -> Result<SecureQrData> {
    SecureQrDecoder::new(ZlibDecompressor).decode_full(payload)
}
