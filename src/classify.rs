//! Classification of raw scanned QR text

/// Shortest digit string accepted as an mAadhaar Secure QR
pub const MIN_PAYLOAD_LEN: usize = 100;

/// Markers found in the XML QR printed on physical cards and eAadhaar PDFs
const PHYSICAL_CARD_MARKERS: [&str; 3] = ["<?xml", "<PrintLetterBarcodeData", "<UidData"];

/// The three shapes a scanned QR string can take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Numeric Secure QR from the mAadhaar app
    MAadhaar,
    /// XML QR from a physical card or eAadhaar
    PhysicalCard,
    Unrecognized,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::MAadhaar => "maadhaar",
            PayloadKind::PhysicalCard => "physical-card",
            PayloadKind::Unrecognized => "unrecognized",
        }
    }
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when `data` is all ASCII digits and at least [`MIN_PAYLOAD_LEN`] long.
pub fn is_maadhaar_payload(data: &str) -> bool {
    data.len() >= MIN_PAYLOAD_LEN && data.bytes().all(|b| b.is_ascii_digit())
}

/// True when `data` carries any of the physical-card XML markers.
pub fn is_physical_card_payload(data: &str) -> bool {
    PHYSICAL_CARD_MARKERS.iter().any(|marker| data.contains(marker))
}

pub fn classify(data: &str) -> PayloadKind {
    if is_maadhaar_payload(data) {
        PayloadKind::MAadhaar
    } else if is_physical_card_payload(data) {
        PayloadKind::PhysicalCard
    } else {
        PayloadKind::Unrecognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maadhaar_length_boundary() {
        assert!(!is_maadhaar_payload(&"7".repeat(99)));
        assert!(is_maadhaar_payload(&"7".repeat(100)));
        assert!(is_maadhaar_payload(&"0".repeat(2000)));
    }

    #[test]
    fn test_maadhaar_rejects_non_digits() {
        let mut data = "1".repeat(150);
        data.push('a');
        assert!(!is_maadhaar_payload(&data));

        assert!(!is_maadhaar_payload(&format!("{} ", "1".repeat(150))));
        assert!(!is_maadhaar_payload(&format!("-{}", "1".repeat(150))));
        assert!(!is_maadhaar_payload(""));
        // non-ASCII digits do not count
        assert!(!is_maadhaar_payload(&"٣".repeat(120)));
    }

    #[test]
    fn test_physical_card_markers() {
        assert!(is_physical_card_payload(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(is_physical_card_payload(r#"<PrintLetterBarcodeData uid="xxxxxxxx1234"/>"#));
        assert!(is_physical_card_payload("garbage before <UidData and after"));
        assert!(!is_physical_card_payload("<Uid"));
        assert!(!is_physical_card_payload(&"1".repeat(200)));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&"4".repeat(300)), PayloadKind::MAadhaar);
        assert_eq!(classify("<UidData/>"), PayloadKind::PhysicalCard);
        assert_eq!(classify("12345"), PayloadKind::Unrecognized);
        assert_eq!(classify("https://example.org"), PayloadKind::Unrecognized);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(PayloadKind::MAadhaar.to_string(), "maadhaar");
        assert_eq!(PayloadKind::PhysicalCard.to_string(), "physical-card");
        assert_eq!(PayloadKind::Unrecognized.as_str(), "unrecognized");
    }
}
