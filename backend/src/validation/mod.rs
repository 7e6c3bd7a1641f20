//! SWIFT/BIC identifier validation.
//!
//! A SWIFT code is 8 or 11 characters:
//!
//! | Positions | Segment       | Characters |
//! |-----------|---------------|------------|
//! | 1-4       | bank code     | `A-Z`      |
//! | 5-6       | country code  | `A-Z`      |
//! | 7-8       | location code | `A-Z0-9`   |
//! | 9-11      | branch code   | `A-Z0-9` (optional) |
//!
//! Validation is case-sensitive. Upper-casing is the caller's business.
//!
//! # Example
//!
//! ```
//! use swiftcodes::is_valid_swift_code;
//!
//! assert!(is_valid_swift_code("AAAABBCC123"));
//! assert!(is_valid_swift_code("AAAABBCC"));
//! assert!(!is_valid_swift_code("aaaabbcc123"));
//! assert!(!is_valid_swift_code("AABBCC"));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Shape of a SWIFT/BIC code.
pub const SWIFT_CODE_PATTERN: &str = r"^[A-Z]{6}[A-Z0-9]{2}([A-Z0-9]{3})?$";

static SWIFT_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(SWIFT_CODE_PATTERN).expect("SWIFT code pattern is valid"));

/// Returns true if `code` is a syntactically valid SWIFT/BIC code.
pub fn is_valid_swift_code(code: &str) -> bool {
    SWIFT_CODE_RE.is_match(code)
}

/// Same check for loosely typed JSON input. Anything that is not a string
/// is simply invalid.
pub fn is_valid_swift_value(value: &Value) -> bool {
    value.as_str().is_some_and(is_valid_swift_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_valid_codes() {
        assert!(is_valid_swift_code("AAAABBCC123"));
        assert!(is_valid_swift_code("AAISALTRXXX"));
        assert!(is_valid_swift_code("ABIEBGS1"));
        assert!(is_valid_swift_code("ABIEBGS1123"));
        assert!(is_valid_swift_code("BCHICLR10R2"));
    }

    #[test]
    fn test_lowercase_rejected() {
        assert!(!is_valid_swift_code("aaaabbcc123"));
        assert!(!is_valid_swift_code("AAAAbBCC123"));
        assert!(!is_valid_swift_code("AAAABBCCxxx"));
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(!is_valid_swift_code(""));
        assert!(!is_valid_swift_code("AABBCC"));
        assert!(!is_valid_swift_code("AAAABBCC1"));
        assert!(!is_valid_swift_code("AAAABBCC12"));
        assert!(!is_valid_swift_code("AAAABBCC1234"));
    }

    #[test]
    fn test_digits_in_letter_segments_rejected() {
        // bank code
        assert!(!is_valid_swift_code("AA1ABBCC123"));
        // country code
        assert!(!is_valid_swift_code("AAAAB1CC123"));
    }

    #[test]
    fn test_surrounding_whitespace_rejected() {
        assert!(!is_valid_swift_code(" AAAABBCC"));
        assert!(!is_valid_swift_code("AAAABBCC "));
        assert!(!is_valid_swift_code("AAAABBCC\n"));
    }

    #[test]
    fn test_non_string_values_rejected() {
        assert!(is_valid_swift_value(&json!("AAAABBCCXXX")));
        assert!(!is_valid_swift_value(&json!(123)));
        assert!(!is_valid_swift_value(&json!(1.0)));
        assert!(!is_valid_swift_value(&json!(null)));
        assert!(!is_valid_swift_value(&json!([])));
        assert!(!is_valid_swift_value(&json!({})));
    }

    proptest! {
        #[test]
        fn prop_well_formed_codes_accepted(code in "[A-Z]{6}[A-Z0-9]{2}([A-Z0-9]{3})?") {
            prop_assert!(is_valid_swift_code(&code));
        }

        #[test]
        fn prop_lowercased_codes_rejected(code in "[A-Z]{6}[A-Z0-9]{2}([A-Z0-9]{3})?") {
            // the bank segment always holds letters, so lowering changes the string
            prop_assert!(!is_valid_swift_code(&code.to_lowercase()));
        }

        #[test]
        fn prop_other_lengths_rejected(code in "[A-Z0-9]{0,20}") {
            prop_assume!(code.len() != 8 && code.len() != 11);
            prop_assert!(!is_valid_swift_code(&code));
        }
    }
}
