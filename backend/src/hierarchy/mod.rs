//! Headquarter/branch relationships derived from SWIFT code structure.
//!
//! No record carries a parent reference. Two codes are related when they
//! share the same 8-character base:
//!
//! ```text
//! ABIEBGS1XXX   headquarter   (11 chars, ends in XXX)
//! ABIEBGS1123   branch        (same base ABIEBGS1)
//! ABIEBGS1      branch        (same base, 8 chars)
//! ```
//!
//! The relationship is recomputed on every lookup, so it cannot drift out of
//! sync with the identifiers no matter in which order records are inserted
//! or removed.

use crate::models::SwiftCodeRecord;
use crate::validation::is_valid_swift_code;

/// Length of the shared headquarter/branch prefix.
pub const BASE_LEN: usize = 8;

/// Branch segment marking a headquarter.
pub const HEADQUARTER_SUFFIX: &str = "XXX";

/// First 8 characters of `code`, or the whole string if it is shorter.
pub fn swift_base(code: &str) -> &str {
    code.get(..BASE_LEN).unwrap_or(code)
}

/// A headquarter code is exactly 11 characters and ends in `XXX`.
///
/// Length dominates: `ABIEBXXX` is not a headquarter.
pub fn is_headquarter_code(code: &str) -> bool {
    code.chars().count() == 11 && code.ends_with(HEADQUARTER_SUFFIX)
}

/// Anything that can list the records sharing a base.
///
/// Implementations return records in their own natural order.
pub trait BaseLookup {
    fn with_base<'a>(&'a self, base: &str) -> Vec<&'a SwiftCodeRecord>;
}

impl BaseLookup for [SwiftCodeRecord] {
    fn with_base<'a>(&'a self, base: &str) -> Vec<&'a SwiftCodeRecord> {
        self.iter()
            .filter(|r| r.swift_code.as_str().starts_with(base))
            .collect()
    }
}

impl BaseLookup for Vec<SwiftCodeRecord> {
    fn with_base<'a>(&'a self, base: &str) -> Vec<&'a SwiftCodeRecord> {
        self.as_slice().with_base(base)
    }
}

/// All records sharing `hq_code`'s base, except the record for `hq_code`
/// itself.
///
/// The headquarter is excluded by identity, not by the `XXX` pattern.
/// An invalid `hq_code` has no branches.
pub fn branches_of<'a, S>(hq_code: &str, source: &'a S) -> Vec<&'a SwiftCodeRecord>
where
    S: BaseLookup + ?Sized,
{
    if !is_valid_swift_code(hq_code) {
        return Vec::new();
    }

    let branches: Vec<_> = source
        .with_base(swift_base(hq_code))
        .into_iter()
        .filter(|r| r.swift_code.as_str() != hq_code)
        .collect();

    tracing::debug!(hq = hq_code, count = branches.len(), "resolved branches");
    branches
}
