//! Scan flow used by the UI: classify, decode, remember the result

use chrono::Duration;
use thiserror::Error;

use crate::classify::{classify, PayloadKind};
use crate::compression::{Decompressor, ZlibDecompressor};
use crate::record::IdentityRecord;
use crate::secure_qr::SecureQrDecoder;
use crate::store::KeyValueStore;

/// Cached record of the last successful scan
pub const IDENTITY_KEY: &str = "identity:record";

/// Onboarding flag set after the first successful scan
pub const SCANNED_FLAG_KEY: &str = "onboarding:qr_scanned";

const DEFAULT_TTL_HOURS: i64 = 24;

/// Why a scan did not produce a record
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("QR code is from a physical card or eAadhaar")]
    PhysicalCard,

    #[error("QR code is not an Aadhaar QR")]
    Unrecognized,

    #[error(transparent)]
    Decode(#[from] crate::Error),

    #[error("failed to cache identity record: {0}")]
    Cache(#[from] serde_json::Error),
}

impl ScanError {
    /// Text to show the user
    pub fn user_message(&self) -> &'static str {
        match self {
            ScanError::PhysicalCard => {
                "This QR code is from a physical Aadhaar card or eAadhaar. \
                 Please use the Secure QR from the mAadhaar app instead."
            }
            ScanError::Unrecognized => {
                "This does not look like an Aadhaar QR code. Please scan the Secure QR from the mAadhaar app."
            }
            ScanError::Decode(err) if err.is_decode() => {
                "The QR code could not be read completely. Please rescan with a clearer image."
            }
            ScanError::Decode(_) => "The QR code data is incomplete or invalid. Please rescan.",
            ScanError::Cache(_) => "The scan succeeded but could not be saved. Please try again.",
        }
    }
}

/// One user's scanning session backed by an injected store.
pub struct ScanSession<S, D = ZlibDecompressor> {
    store: S,
    decoder: SecureQrDecoder<D>,
    ttl: Duration,
}

impl<S: KeyValueStore> ScanSession<S> {
    pub fn new(store: S) -> Self {
        Self::with_decoder(store, SecureQrDecoder::new(ZlibDecompressor))
    }
}

impl<S: KeyValueStore, D: Decompressor> ScanSession<S, D> {
    pub fn with_decoder(store: S, decoder: SecureQrDecoder<D>) -> Self {
        ScanSession {
            store,
            decoder,
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
        }
    }

    /// How long the decoded record stays cached
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Decodes a scanned QR string and caches the record on success.
    pub fn submit(&mut self, raw: &str) -> Result<IdentityRecord, ScanError> {
        let data = raw.trim();

        match classify(data) {
            PayloadKind::MAadhaar => {}
            PayloadKind::PhysicalCard => {
                log::warn!("Rejected physical card QR ({} chars)", data.len());
                return Err(ScanError::PhysicalCard);
            }
            PayloadKind::Unrecognized => {
                log::warn!("Rejected unrecognized QR ({} chars)", data.len());
                return Err(ScanError::Unrecognized);
            }
        }

        let record = match self.decoder.decode(data) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Secure QR decode failed: {}", e);
                return Err(e.into());
            }
        };

        let json = serde_json::to_string(&record)?;
        self.store.put(IDENTITY_KEY, json, Some(self.ttl));
        self.store.put(SCANNED_FLAG_KEY, "true".to_string(), None);

        log::info!("Decoded Secure QR for Aadhaar ending {}", record.aadhaar_last_4_digits);
        Ok(record)
    }

    /// Record from the last successful scan, if still cached
    pub fn cached_record(&mut self) -> Option<IdentityRecord> {
        let json = self.store.get(IDENTITY_KEY)?;
        match serde_json::from_str(&json) {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("Ignoring unreadable cached record: {}", e);
                None
            }
        }
    }

    pub fn has_scanned(&mut self) -> bool {
        self.store.get(SCANNED_FLAG_KEY).as_deref() == Some("true")
    }

    pub fn clear(&mut self) {
        self.store.delete(IDENTITY_KEY);
        self.store.delete(SCANNED_FLAG_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::store::MemoryStore;

    /// Returns a buffer with too few separators.
    struct Truncated;

    impl Decompressor for Truncated {
        fn decompress(&self, _compressed: &[u8]) -> std::io::Result<Vec<u8>> {
            let mut buf = b"V2\xff3\xff1234\xffName\xff".to_vec();
            buf.extend([0u8; 256]);
            Ok(buf)
        }
    }

    #[test]
    fn test_rejects_physical_card() {
        env_logger::try_init().ok();

        let mut session = ScanSession::new(MemoryStore::new());
        let err = session
            .submit(r#"<?xml version="1.0"?><PrintLetterBarcodeData uid="1234"/>"#)
            .unwrap_err();
        assert!(matches!(err, ScanError::PhysicalCard));
        assert!(err.user_message().contains("mAadhaar"));
        assert!(!session.has_scanned());
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_rejects_unrecognized() {
        let mut session = ScanSession::new(MemoryStore::new());
        let err = session.submit("12345").unwrap_err();
        assert!(matches!(err, ScanError::Unrecognized));
    }

    #[test]
    fn test_decode_failure_messages() {
        let mut session = ScanSession::new(MemoryStore::new());
        let err = session.submit(&"1".repeat(150)).unwrap_err();
        assert!(matches!(&err, ScanError::Decode(e) if e.is_decode()));
        assert!(err.user_message().contains("clearer image"));

        let mut session = ScanSession::with_decoder(MemoryStore::new(), SecureQrDecoder::new(Truncated));
        let err = session.submit(&"1".repeat(150)).unwrap_err();
        assert!(matches!(
            err,
            ScanError::Decode(crate::Error::Format(FormatError::InsufficientStructure { found: 4, .. }))
        ));
        assert!(err.user_message().contains("incomplete"));
        assert!(session.cached_record().is_none());
    }

    #[test]
    fn test_clear_and_bad_cache() {
        let mut store = MemoryStore::new();
        store.put(IDENTITY_KEY, "{not json".to_string(), None);
        store.put(SCANNED_FLAG_KEY, "true".to_string(), None);

        let mut session = ScanSession::new(store);
        assert!(session.has_scanned());
        assert!(session.cached_record().is_none());

        session.clear();
        assert!(!session.has_scanned());
        assert!(session.store().is_empty());
    }
}
