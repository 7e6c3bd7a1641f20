//! Row normalization.

use crate::models::{SwiftCode, SwiftCodeRecord};
use crate::parser::RawRow;

use super::columns;

/// Trim and upper-case a text cell.
pub fn normalize_text(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Build a normalized record from a raw row whose identifier has already
/// been validated.
///
/// Missing cells become empty strings. The headquarter flag comes from the
/// identifier, never from the row.
pub fn normalize_row(swift_code: SwiftCode, row: &RawRow) -> SwiftCodeRecord {
    SwiftCodeRecord {
        is_headquarter: swift_code.is_headquarter(),
        swift_code,
        address: normalize_text(row.get(columns::ADDRESS)),
        bank_name: normalize_text(row.get(columns::NAME)),
        country_iso2: normalize_text(row.get(columns::COUNTRY_ISO2_CODE)),
        country_name: normalize_text(row.get(columns::COUNTRY_NAME)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        let cells: HashMap<String, String> = cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RawRow::new(2, cells)
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  sofia, bulgaria "), "SOFIA, BULGARIA");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_normalize_row() {
        let raw = row(&[
            ("SWIFT CODE", "AAISALTRXXX"),
            ("COUNTRY ISO2 CODE", " al"),
            ("COUNTRY NAME", "albania "),
            ("NAME", "united bank of albania"),
            ("ADDRESS", " hyrja 3 rr. ismail qemali "),
        ]);
        let record = normalize_row(SwiftCode::parse("AAISALTRXXX").unwrap(), &raw);

        assert_eq!(record.swift_code.as_str(), "AAISALTRXXX");
        assert_eq!(record.country_iso2, "AL");
        assert_eq!(record.country_name, "ALBANIA");
        assert_eq!(record.bank_name, "UNITED BANK OF ALBANIA");
        assert_eq!(record.address, "HYRJA 3 RR. ISMAIL QEMALI");
        assert!(record.is_headquarter);
    }

    #[test]
    fn test_missing_cells_become_empty() {
        let raw = row(&[("SWIFT CODE", "ABIEBGS1123")]);
        let record = normalize_row(SwiftCode::parse("ABIEBGS1123").unwrap(), &raw);

        assert_eq!(record.address, "");
        assert_eq!(record.bank_name, "");
        assert_eq!(record.country_iso2, "");
        assert!(!record.is_headquarter);
    }

    #[test]
    fn test_headquarter_flag_ignores_input() {
        let raw = row(&[("SWIFT CODE", "ABIEBXXX"), ("IS HEADQUARTER", "true")]);
        let record = normalize_row(SwiftCode::parse("ABIEBXXX").unwrap(), &raw);
        assert!(!record.is_headquarter);
    }
}
