//! Decoded identity record handed to the UI and proof-generation layers

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Placeholder used when every address component is empty
pub const ADDRESS_NOT_AVAILABLE: &str = "Address not available";

/// Identity fields extracted from one Secure QR.
///
/// Built once per successful decode and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    pub name: String,

    /// Date of birth as `DD/MM/YYYY`
    pub date_of_birth: String,

    /// M/F/T
    pub gender: String,

    /// Comma-joined address, or [`ADDRESS_NOT_AVAILABLE`]
    pub address: String,

    #[serde(rename = "aadhaarLast4Digits")]
    pub aadhaar_last_4_digits: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl IdentityRecord {
    /// Parsed date of birth, if the field holds a real `DD/MM/YYYY` date
    pub fn birth_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date_of_birth, "%d/%m/%Y").ok()
    }

    /// Age in whole years on `today`
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let dob = self.birth_date()?;
        let mut age = today.year() - dob.year();

        // Birthday not reached yet this year
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            age -= 1;
        }

        u32::try_from(age).ok()
    }

    /// Age as of today
    pub fn age(&self) -> Option<u32> {
        self.age_on(chrono::Local::now().date_naive())
    }

    pub fn is_above_age(&self, threshold: u32) -> Option<bool> {
        self.age().map(|age| age >= threshold)
    }
}

/// Rewrites a `DD-MM-YYYY` date as `DD/MM/YYYY`.
///
/// Anything without exactly two `-` separators only has its dashes swapped
/// for slashes, with no reordering.
pub fn format_date_of_birth(raw: &str) -> String {
    let parts: Vec<&str> = raw.split('-').collect();
    match parts.as_slice() {
        [day, month, year] => format!("{}/{}/{}", day, month, year),
        _ => raw.replace('-', "/"),
    }
}

/// Joins the non-empty address parts with `", "`.
pub fn join_address<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let parts: Vec<&str> = parts.into_iter().filter(|part| !part.is_empty()).collect();
    if parts.is_empty() {
        ADDRESS_NOT_AVAILABLE.to_string()
    } else {
        parts.join(", ")
    }
}

/// Empty fields are reported as absent.
pub fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
