//! REST API response types.
//!
//! Keys are camelCase, with `countryISO2` spelled out.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ParseError;
use crate::models::SwiftCodeRecord;
use crate::store::LoadSummary;

/// A single SWIFT code. Headquarters carry their branches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwiftCodeResponse {
    pub address: String,
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: String,
    pub is_headquarter: bool,
    pub swift_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<BranchResponse>>,
}

impl SwiftCodeResponse {
    pub fn new(record: &SwiftCodeRecord, branches: Option<Vec<BranchResponse>>) -> Self {
        Self {
            address: record.address.clone(),
            bank_name: record.bank_name.clone(),
            country_iso2: record.country_iso2.clone(),
            country_name: record.country_name.clone(),
            is_headquarter: record.is_headquarter,
            swift_code: record.swift_code.to_string(),
            branches,
        }
    }
}

/// Compact form used in branch and country listings (no country name).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchResponse {
    pub address: String,
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub is_headquarter: bool,
    pub swift_code: String,
}

impl From<&SwiftCodeRecord> for BranchResponse {
    fn from(record: &SwiftCodeRecord) -> Self {
        Self {
            address: record.address.clone(),
            bank_name: record.bank_name.clone(),
            country_iso2: record.country_iso2.clone(),
            is_headquarter: record.is_headquarter,
            swift_code: record.swift_code.to_string(),
        }
    }
}

/// All SWIFT codes of one country.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryResponse {
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: String,
    pub swift_codes: Vec<BranchResponse>,
}

/// Plain confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of a CSV upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    /// Unique import identifier
    pub import_id: String,
    /// "imported" when every record was new, "partial" when some already existed
    pub status: String,
    pub file_name: Option<String>,
    pub encoding: String,
    pub delimiter: String,
    /// Records in the file
    pub total: usize,
    pub headquarters: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub imported_at: String,
}

impl ImportResponse {
    pub fn new(
        file_name: Option<String>,
        encoding: String,
        delimiter: char,
        total: usize,
        headquarters: usize,
        summary: LoadSummary,
    ) -> Self {
        Self {
            import_id: uuid::Uuid::new_v4().to_string(),
            status: if summary.skipped == 0 { "imported" } else { "partial" }.to_string(),
            file_name,
            encoding,
            delimiter: match delimiter {
                '\t' => "\\t".to_string(),
                c => c.to_string(),
            },
            total,
            headquarters,
            inserted: summary.inserted,
            skipped: summary.skipped,
            imported_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Create an error body
pub fn error_response(detail: &str) -> Value {
    json!({ "detail": detail })
}

/// Error body for a rejected CSV upload
pub fn parse_error_response(err: &ParseError) -> Value {
    json!({
        "detail": err.to_string(),
        "kind": err.code(),
    })
}
