//! Domain models for the SWIFT code registry.
//!
//! - [`SwiftCode`] - a validated SWIFT/BIC identifier
//! - [`SwiftCodeRecord`] - a normalized registry entry
//! - [`NewSwiftCode`] - payload for creating a single entry

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dataset::normalize_text;
use crate::error::{RecordError, RecordResult};
use crate::hierarchy::{is_headquarter_code, swift_base};
use crate::validation::is_valid_swift_code;

// =============================================================================
// SWIFT Code
// =============================================================================

/// A SWIFT/BIC code that is known to have the 8 or 11 character shape.
///
/// Construction goes through [`SwiftCode::parse`], so every accessor can
/// slice the underlying ASCII string without further checks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SwiftCode(String);

impl SwiftCode {
    /// Validate `code` as given. No trimming or case folding happens here.
    pub fn parse(code: &str) -> RecordResult<Self> {
        if is_valid_swift_code(code) {
            Ok(Self(code.to_string()))
        } else {
            Err(RecordError::InvalidSwiftCode(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters, shared by a headquarter and its branches.
    pub fn base(&self) -> &str {
        swift_base(&self.0)
    }

    /// Positions 5-6.
    pub fn country_code(&self) -> &str {
        &self.0[4..6]
    }

    /// Positions 9-11, if present.
    pub fn branch_code(&self) -> Option<&str> {
        (self.0.len() == 11).then(|| &self.0[8..])
    }

    /// 11 characters ending in `XXX`.
    pub fn is_headquarter(&self) -> bool {
        is_headquarter_code(&self.0)
    }
}

impl fmt::Display for SwiftCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SwiftCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for SwiftCode {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SwiftCode {
    type Error = RecordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid_swift_code(&value) {
            Ok(Self(value))
        } else {
            Err(RecordError::InvalidSwiftCode(value))
        }
    }
}

impl From<SwiftCode> for String {
    fn from(code: SwiftCode) -> Self {
        code.0
    }
}

// =============================================================================
// Registry Record
// =============================================================================

/// A normalized registry entry.
///
/// Text fields are trimmed and upper-cased. `is_headquarter` is always
/// derived from `swift_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwiftCodeRecord {
    pub swift_code: SwiftCode,
    pub address: String,
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: String,
    pub is_headquarter: bool,
}

impl SwiftCodeRecord {
    pub fn base(&self) -> &str {
        self.swift_code.base()
    }
}

// =============================================================================
// Creation Payload
// =============================================================================

/// Payload for adding one entry to the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSwiftCode {
    pub address: String,
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: String,
    pub is_headquarter: bool,
    pub swift_code: String,
}

impl NewSwiftCode {
    /// Validate the payload and normalize it like an ingested row.
    ///
    /// The identifier is checked as given. The country code must match the
    /// identifier's country segment, and the supplied headquarter flag must
    /// agree with the one derived from the identifier.
    pub fn into_record(self) -> RecordResult<SwiftCodeRecord> {
        let swift_code = SwiftCode::try_from(self.swift_code)?;

        let country_iso2 = normalize_text(&self.country_iso2);
        if country_iso2.len() != 2 || !country_iso2.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(RecordError::InvalidCountryCode(country_iso2));
        }
        if country_iso2 != swift_code.country_code() {
            return Err(RecordError::CountryMismatch {
                expected: swift_code.country_code().to_string(),
                found: country_iso2,
            });
        }

        let derived = swift_code.is_headquarter();
        if self.is_headquarter != derived {
            return Err(RecordError::HeadquarterMismatch {
                code: swift_code.to_string(),
                expected: derived,
            });
        }

        Ok(SwiftCodeRecord {
            swift_code,
            address: normalize_text(&self.address),
            bank_name: normalize_text(&self.bank_name),
            country_iso2,
            country_name: normalize_text(&self.country_name),
            is_headquarter: derived,
        })
    }
}
