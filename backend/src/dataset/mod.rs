//! SWIFT code dataset parsing.
//!
//! Turns one CSV feed into a fully validated [`Dataset`], or fails with the
//! first violated precondition. Nothing is ever partially accepted.
//!
//! # Checks
//!
//! Applied strictly in this order; the first failure wins:
//!
//! 1. path is non-empty ([`ParseError::InvalidInput`])
//! 2. path is a regular file ([`ParseError::SourceNotFound`])
//! 3. extension is `.csv` ([`ParseError::UnsupportedFormat`])
//! 4. content is readable, non-empty and well-formed
//!    ([`ParseError::SourceUnreadable`], [`ParseError::EmptySource`],
//!    [`ParseError::MalformedSource`])
//! 5. required columns present, matched against trimmed header names, so
//!    `" ADDRESS"` counts as `ADDRESS` ([`ParseError::MissingColumn`])
//! 6. every identifier valid ([`ParseError::InvalidIdentifier`])
//! 7. no identifier repeated ([`ParseError::DuplicateIdentifier`])
//! 8. normalize every row
//!
//! # Example
//!
//! ```rust,ignore
//! use swiftcodes::parse_swift_file;
//!
//! let dataset = parse_swift_file("data/swift_codes.csv")?;
//! println!("{} records", dataset.len());
//! ```

mod normalize;

use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{ParseError, ParseResult};
use crate::models::{SwiftCode, SwiftCodeRecord};
use crate::parser::{read_bytes, CsvTable};

pub use normalize::{normalize_row, normalize_text};

/// Header names of the input feed.
pub mod columns {
    pub const SWIFT_CODE: &str = "SWIFT CODE";
    pub const COUNTRY_ISO2_CODE: &str = "COUNTRY ISO2 CODE";
    pub const COUNTRY_NAME: &str = "COUNTRY NAME";
    pub const NAME: &str = "NAME";
    pub const ADDRESS: &str = "ADDRESS";

    /// Required columns in the order they are checked.
    pub const REQUIRED: [&str; 5] = [SWIFT_CODE, COUNTRY_ISO2_CODE, COUNTRY_NAME, NAME, ADDRESS];
}

/// Options for dataset parsing.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Field delimiter; auto-detected from the header line when `None`.
    pub delimiter: Option<u8>,
}

/// A validated, normalized set of records from one feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    /// Records in input row order
    pub records: Vec<SwiftCodeRecord>,
    /// Detected encoding of the source
    pub encoding: String,
    /// Delimiter used
    pub delimiter: char,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn headquarter_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_headquarter).count()
    }

    pub fn into_records(self) -> Vec<SwiftCodeRecord> {
        self.records
    }
}

/// Parse a SWIFT code CSV file with auto-detected delimiter.
pub fn parse_swift_file<P: AsRef<Path>>(path: P) -> ParseResult<Dataset> {
    parse_swift_file_with_options(path, &ParseOptions::default())
}

/// Parse a SWIFT code CSV file.
pub fn parse_swift_file_with_options<P: AsRef<Path>>(
    path: P,
    options: &ParseOptions,
) -> ParseResult<Dataset> {
    let path = path.as_ref();

    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(ParseError::InvalidInput);
    }

    if !path.is_file() {
        return Err(ParseError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    check_extension(path)?;

    let bytes = std::fs::read(path).map_err(|source| ParseError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "parsing SWIFT code file");
    parse_swift_bytes(&bytes, options)
}

/// Parse SWIFT code CSV content that is already in memory.
///
/// Runs checks 4 to 8; the file-level checks are the caller's business.
pub fn parse_swift_bytes(bytes: &[u8], options: &ParseOptions) -> ParseResult<Dataset> {
    let table = read_bytes(bytes, options.delimiter)?;
    build_dataset(table)
}

/// Fails with [`ParseError::UnsupportedFormat`] unless the name ends in
/// `.csv` (any case).
pub fn check_extension(path: &Path) -> ParseResult<()> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        Ok(())
    } else {
        Err(ParseError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }
}

fn build_dataset(table: CsvTable) -> ParseResult<Dataset> {
    if let Some(missing) = columns::REQUIRED.iter().find(|c| !table.has_column(c)) {
        return Err(ParseError::MissingColumn(missing.to_string()));
    }

    let codes = validate_codes(&table)?;
    check_duplicates(&table, &codes)?;

    let records: Vec<SwiftCodeRecord> = codes
        .into_iter()
        .zip(&table.rows)
        .map(|(code, row)| normalize_row(code, row))
        .collect();

    tracing::info!(
        records = records.len(),
        encoding = %table.encoding,
        "SWIFT code dataset validated"
    );

    Ok(Dataset {
        records,
        encoding: table.encoding,
        delimiter: char::from(table.delimiter),
    })
}

/// Validate the whole identifier column before anything else is accepted.
fn validate_codes(table: &CsvTable) -> ParseResult<Vec<SwiftCode>> {
    let mut codes = Vec::with_capacity(table.rows.len());
    let mut first_invalid = None;
    let mut invalid = 0;

    for row in &table.rows {
        let raw = row.get(columns::SWIFT_CODE);
        match SwiftCode::parse(raw) {
            Ok(code) => codes.push(code),
            Err(_) => {
                invalid += 1;
                first_invalid.get_or_insert_with(|| (raw.to_string(), row.line));
            }
        }
    }

    match first_invalid {
        Some((value, line)) => {
            tracing::warn!(%value, line, count = invalid, "invalid SWIFT codes in dataset");
            Err(ParseError::InvalidIdentifier {
                value,
                line,
                count: invalid,
            })
        }
        None => Ok(codes),
    }
}

fn check_duplicates(table: &CsvTable, codes: &[SwiftCode]) -> ParseResult<()> {
    let mut seen = HashSet::with_capacity(codes.len());

    for (code, row) in codes.iter().zip(&table.rows) {
        if !seen.insert(code.as_str()) {
            tracing::warn!(value = %code, line = row.line, "duplicate SWIFT code in dataset");
            return Err(ParseError::DuplicateIdentifier {
                value: code.to_string(),
                line: row.line,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    const HEADER: &str = "SWIFT CODE,COUNTRY ISO2 CODE,COUNTRY NAME,NAME,ADDRESS";

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn csv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.push('\n');
        out
    }

    fn kind_of(content: &str) -> ParseErrorKind {
        parse_swift_bytes(content.as_bytes(), &ParseOptions::default())
            .unwrap_err()
            .kind()
    }

    #[test]
    fn test_parse_valid_file() {
        let dir = tempdir().unwrap();
        let path = write(
            &dir,
            "codes.csv",
            &csv(&[
                "AAISALTRXXX,al,albania,United Bank of Albania Sh.A, hyrja 3 rr. ismail qemali ",
                "ABIEBGS1123,BG,Bulgaria,ABV Investments Ltd,\"tsar asen 20, varna\"",
                "ABIEBXXX,BG,Bulgaria,ABV Investments Ltd,",
            ]),
        );

        let dataset = parse_swift_file(&path).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.headquarter_count(), 1);
        assert_eq!(dataset.delimiter, ',');

        let first = &dataset.records[0];
        assert_eq!(first.swift_code.as_str(), "AAISALTRXXX");
        assert_eq!(first.country_iso2, "AL");
        assert_eq!(first.country_name, "ALBANIA");
        assert_eq!(first.bank_name, "UNITED BANK OF ALBANIA SH.A");
        assert_eq!(first.address, "HYRJA 3 RR. ISMAIL QEMALI");
        assert!(first.is_headquarter);

        assert_eq!(dataset.records[1].address, "TSAR ASEN 20, VARNA");
        assert!(!dataset.records[1].is_headquarter);
        assert!(!dataset.records[2].is_headquarter);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let content = "COUNTRY ISO2 CODE,SWIFT CODE,CODE TYPE,NAME,ADDRESS,TOWN NAME,COUNTRY NAME,TIME ZONE\n\
                       BG,ABIEBGS1XXX,BIC11,ABV,ADDR,VARNA,BULGARIA,Europe/Sofia\n";
        let dataset = parse_swift_bytes(content.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(dataset.records[0].country_name, "BULGARIA");
        assert!(dataset.records[0].is_headquarter);
    }

    #[test]
    fn test_header_only_is_empty_dataset() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "empty_body.csv", &format!("{HEADER}\n"));
        let dataset = parse_swift_file(&path).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_semicolon_delimiter() {
        let content = "SWIFT CODE;COUNTRY ISO2 CODE;COUNTRY NAME;NAME;ADDRESS\n\
                       ABIEBGS1XXX;BG;BULGARIA;ABV;ADDR, 1\n";
        let dataset = parse_swift_bytes(content.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(dataset.delimiter, ';');
        assert_eq!(dataset.records[0].address, "ADDR, 1");
    }

    #[test]
    fn test_reparse_is_deterministic() {
        let dir = tempdir().unwrap();
        let path = write(
            &dir,
            "codes.csv",
            &csv(&["ABIEBGS1XXX,BG,Bulgaria,ABV,a", "ABIEBGS1123,BG,Bulgaria,ABV,b"]),
        );

        let first = serde_json::to_vec(&parse_swift_file(&path).unwrap()).unwrap();
        let second = serde_json::to_vec(&parse_swift_file(&path).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_path_is_invalid_input() {
        assert!(matches!(parse_swift_file(""), Err(ParseError::InvalidInput)));
        assert!(matches!(parse_swift_file("   "), Err(ParseError::InvalidInput)));
    }

    #[test]
    fn test_missing_file_and_directory() {
        let dir = tempdir().unwrap();
        assert_eq!(
            parse_swift_file(dir.path().join("nope.csv")).unwrap_err().kind(),
            ParseErrorKind::SourceNotFound
        );
        assert_eq!(
            parse_swift_file(dir.path()).unwrap_err().kind(),
            ParseErrorKind::SourceNotFound
        );
    }

    #[test]
    fn test_wrong_extension() {
        let dir = tempdir().unwrap();
        let txt = write(&dir, "codes.txt", &csv(&[]));
        let bare = write(&dir, "codes", &csv(&[]));
        assert_eq!(
            parse_swift_file(txt).unwrap_err().kind(),
            ParseErrorKind::UnsupportedFormat
        );
        assert_eq!(
            parse_swift_file(bare).unwrap_err().kind(),
            ParseErrorKind::UnsupportedFormat
        );

        let upper = write(&dir, "CODES.CSV", &csv(&[]));
        assert!(parse_swift_file(upper).is_ok());
    }

    #[test]
    fn test_extension_checked_before_content() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "empty.txt", "");
        assert_eq!(
            parse_swift_file(path).unwrap_err().kind(),
            ParseErrorKind::UnsupportedFormat
        );
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "empty.csv", "");
        assert_eq!(
            parse_swift_file(path).unwrap_err().kind(),
            ParseErrorKind::EmptySource
        );
    }

    #[test]
    fn test_malformed_row() {
        let content = csv(&["ABIEBGS1XXX,BG,BULGARIA,ABV,ADDR,EXTRA"]);
        assert_eq!(kind_of(&content), ParseErrorKind::MalformedSource);
    }

    #[test]
    fn test_missing_address_column() {
        let content = "SWIFT CODE,COUNTRY ISO2 CODE,COUNTRY NAME,NAME\nABIEBGS1XXX,BG,BULGARIA,ABV\n";
        let err = parse_swift_bytes(content.as_bytes(), &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn(ref c) if c == "ADDRESS"));
    }

    #[test]
    fn test_first_declared_missing_column_wins() {
        // COUNTRY NAME and ADDRESS both missing; declared order puts COUNTRY NAME first
        let content = "ADDRESS2,NAME,COUNTRY ISO2 CODE,SWIFT CODE\n";
        let err = parse_swift_bytes(content.as_bytes(), &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn(ref c) if c == "COUNTRY NAME"));

        let content = "NAME\n";
        let err = parse_swift_bytes(content.as_bytes(), &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn(ref c) if c == "SWIFT CODE"));
    }

    #[test]
    fn test_invalid_identifier_rejects_whole_file() {
        let content = csv(&[
            "ABIEBGS1XXX,BG,BULGARIA,ABV,A",
            "abiebgs1123,BG,BULGARIA,ABV,B",
            "TOOSHORT1,BG,BULGARIA,ABV,C",
        ]);
        let err = parse_swift_bytes(content.as_bytes(), &ParseOptions::default()).unwrap_err();
        match err {
            ParseError::InvalidIdentifier { value, line, count } => {
                assert_eq!(value, "abiebgs1123");
                assert_eq!(line, 3);
                assert_eq!(count, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_identifier_not_trimmed() {
        let content = csv(&[" ABIEBGS1XXX,BG,BULGARIA,ABV,A"]);
        assert_eq!(kind_of(&content), ParseErrorKind::InvalidIdentifier);
    }

    #[test]
    fn test_empty_identifier_is_invalid() {
        let content = csv(&[",BG,BULGARIA,ABV,A"]);
        assert_eq!(kind_of(&content), ParseErrorKind::InvalidIdentifier);
    }

    #[test]
    fn test_duplicate_identifier() {
        let content = csv(&[
            "ABIEBGS1XXX,BG,BULGARIA,ABV,A",
            "ABIEBGS1123,BG,BULGARIA,ABV,B",
            "ABIEBGS1XXX,PL,POLAND,OTHER,C",
        ]);
        let err = parse_swift_bytes(content.as_bytes(), &ParseOptions::default()).unwrap_err();
        match err {
            ParseError::DuplicateIdentifier { value, line } => {
                assert_eq!(value, "ABIEBGS1XXX");
                assert_eq!(line, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_duplicate_reported_as_invalid() {
        let content = csv(&["bad,BG,BULGARIA,ABV,A", "bad,BG,BULGARIA,ABV,A"]);
        assert_eq!(kind_of(&content), ParseErrorKind::InvalidIdentifier);
    }

    #[test]
    fn test_explicit_delimiter_option() {
        let content = "SWIFT CODE|COUNTRY ISO2 CODE|COUNTRY NAME|NAME|ADDRESS\nABIEBGS1XXX|BG|BULGARIA|ABV|A\n";
        let options = ParseOptions {
            delimiter: Some(b'|'),
        };
        let dataset = parse_swift_bytes(content.as_bytes(), &options).unwrap();
        assert_eq!(dataset.delimiter, '|');
        assert_eq!(dataset.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = write(&dir, "locked.csv", &csv(&["ABIEBGS1XXX,BG,BULGARIA,ABV,A"]));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        // privileged users read through any mode bits
        if fs::read(&path).is_ok() {
            return;
        }

        let err = parse_swift_file(&path).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::SourceUnreadable);
        assert!(err.to_string().contains("locked.csv"));
    }

    #[test]
    fn test_utf8_names_survive_normalization() {
        let dir = tempdir().unwrap();
        let path = write(
            &dir,
            "codes.csv",
            &csv(&[
                "BSCHESMMXXX,ES,España,Banco Español de Crédito,Calle Alcalá 49",
                "ZABAHR2XXXX,HR,Hrvatska,Zagrebačka banka,Trg bana Jelačića 10",
                "SOGEFRPPXXX,FR,France,Société Générale,29 bd Haussmann",
            ]),
        );

        let dataset = parse_swift_file(&path).unwrap();
        assert_eq!(dataset.encoding, "utf-8");

        let names: Vec<&str> = dataset.records.iter().map(|r| r.bank_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["BANCO ESPAÑOL DE CRÉDITO", "ZAGREBAČKA BANKA", "SOCIÉTÉ GÉNÉRALE"]
        );
        assert_eq!(dataset.records[0].country_name, "ESPAÑA");
        assert_eq!(dataset.records[0].address, "CALLE ALCALÁ 49");
        assert_eq!(dataset.records[1].address, "TRG BANA JELAČIĆA 10");
    }

    #[test]
    fn test_error_lines_count_blank_lines() {
        let content = format!("{HEADER}\n\nABIEBGS1XXX,BG,BULGARIA,ABV,A\n\nABIEBGS1XXX,BG,BULGARIA,ABV,B\n");
        let err = parse_swift_bytes(content.as_bytes(), &ParseOptions::default()).unwrap_err();
        match err {
            ParseError::DuplicateIdentifier { value, line } => {
                assert_eq!(value, "ABIEBGS1XXX");
                assert_eq!(line, 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_padded_header_names_match() {
        let content = "SWIFT CODE , COUNTRY ISO2 CODE,COUNTRY NAME,NAME, ADDRESS\n\
                       ABIEBGS1XXX,BG,BULGARIA,ABV,ADDR\n";
        let dataset = parse_swift_bytes(content.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(dataset.records[0].address, "ADDR");
    }
}
