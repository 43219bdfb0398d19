//! mAadhaar Secure QR decoding
//!
//! Turns the numeric text of a scanned mAadhaar Secure QR into an
//! [`IdentityRecord`], and tells apart QR codes that are not in this format
//! (the XML QR of physical cards, or anything else).

pub mod classify;
pub mod compression;
pub mod error;
pub mod record;
pub mod scan;
pub mod secure_qr;
pub mod store;

pub use classify::{classify, is_maadhaar_payload, is_physical_card_payload, PayloadKind};
pub use compression::{Decompressor, ZlibDecompressor};
pub use error::{DecodeError, Error, FormatError, Result};
pub use record::IdentityRecord;
pub use scan::{ScanError, ScanSession};
pub use secure_qr::{decode, decode_full, SecureQrData, SecureQrDecoder};
pub use store::{KeyValueStore, MemoryStore};
