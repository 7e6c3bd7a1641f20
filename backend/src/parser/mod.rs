//! Generic CSV reading with encoding and delimiter auto-detection.
//!
//! Turns raw bytes into a [`CsvTable`]: trimmed header names plus one
//! [`RawRow`] per data line. No SWIFT-specific logic here.
//!
//! Header names are trimmed before anyone looks them up, so a header cell
//! of `" ADDRESS"` satisfies a required `ADDRESS` column. Cell values are
//! left exactly as read.
//!
//! Line numbers are physical source lines, counted from the byte offsets
//! the reader has consumed. Skipped blank lines and line breaks inside
//! quoted cells both count.

use std::collections::HashMap;

use crate::error::{ParseError, ParseResult};

/// Delimiters considered by [`detect_delimiter`], in order of preference.
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// One data row, keyed by header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in the source.
    pub line: u64,
    cells: HashMap<String, String>,
}

impl RawRow {
    pub fn new(line: u64, cells: HashMap<String, String>) -> Self {
        Self { line, cells }
    }

    /// Raw cell value; absent cells read as the empty string.
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

/// A parsed CSV document with metadata.
#[derive(Debug, Clone)]
pub struct CsvTable {
    /// Column headers, trimmed, in file order
    pub headers: Vec<String>,
    /// Data rows in file order
    pub rows: Vec<RawRow>,
    /// Detected encoding
    pub encoding: String,
    /// Delimiter used
    pub delimiter: u8,
}

impl CsvTable {
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }
}

/// Detect the encoding of raw bytes.
///
/// Anything that is valid UTF-8 is UTF-8. Only other inputs go through
/// chardet, which misreads some accented UTF-8 as ISO-8859-1.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "utf-8" | "utf8" => "utf-8".to_string(),
        // not UTF-8 and no better guess: single-byte western
        "ascii" | "" | "windows-1252" | "cp1252" => "windows-1252".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Labels encoding_rs does not know, and invalid UTF-8, fall back to lossy
/// UTF-8. A leading byte order mark is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) if enc != encoding_rs::UTF_8 => enc.decode(bytes).0.into_owned(),
            _ => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Pick the candidate delimiter occurring most often in the header line.
/// Ties and header lines without any candidate resolve to a comma.
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    let mut best = b',';
    let mut best_count = 0;

    for &sep in &CANDIDATE_DELIMITERS {
        let count = first_line.bytes().filter(|&b| b == sep).count();
        if count > best_count {
            best_count = count;
            best = sep;
        }
    }

    best
}

/// Read a decoded CSV document.
///
/// The first non-blank line is the header. Blank lines are skipped. Rows
/// shorter than the header leave the missing cells absent; rows longer than
/// the header are malformed.
pub fn read_table(content: &str, delimiter: u8, encoding: String) -> ParseResult<CsvTable> {
    if content.trim().is_empty() {
        return Err(ParseError::EmptySource);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(malformed)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut lines = LineCounter::new(content.as_bytes());
    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();

    while reader.read_record(&mut record).map_err(malformed)? {
        let line = lines.record_start(reader.position().byte(), &record);

        if record.len() > headers.len() {
            return Err(ParseError::MalformedSource {
                line,
                message: format!("expected {} fields, saw {}", headers.len(), record.len()),
            });
        }

        let mut cells = HashMap::with_capacity(record.len());
        for (header, value) in headers.iter().zip(record.iter()) {
            // first occurrence wins on repeated header names
            cells
                .entry(header.clone())
                .or_insert_with(|| value.to_string());
        }
        rows.push(RawRow::new(line, cells));
    }

    Ok(CsvTable {
        headers,
        rows,
        encoding,
        delimiter,
    })
}

/// Read CSV bytes, detecting the encoding and, unless given, the delimiter.
pub fn read_bytes(bytes: &[u8], delimiter: Option<u8>) -> ParseResult<CsvTable> {
    if bytes.is_empty() {
        return Err(ParseError::EmptySource);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    tracing::debug!(%encoding, delimiter = %char::from(delimiter), "reading CSV");
    read_table(&content, delimiter, encoding)
}

/// Maps reader byte offsets to 1-based physical line numbers.
struct LineCounter<'a> {
    bytes: &'a [u8],
    scanned: usize,
    newlines: u64,
}

impl<'a> LineCounter<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            scanned: 0,
            newlines: 0,
        }
    }

    /// Line on which `record` starts, given the offset just past it.
    ///
    /// Offsets must not decrease between calls.
    fn record_start(&mut self, end: u64, record: &csv::StringRecord) -> u64 {
        let len = self.bytes.len();
        let mut end = usize::try_from(end).map_or(len, |e| e.min(len)).max(self.scanned);

        // trailing terminators are counted with the next record
        while end > self.scanned && matches!(self.bytes[end - 1], b'\n' | b'\r') {
            end -= 1;
        }

        self.newlines += self.bytes[self.scanned..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count() as u64;
        self.scanned = end;

        let embedded: u64 = record
            .iter()
            .map(|field| field.matches('\n').count() as u64)
            .sum();

        (self.newlines + 1).saturating_sub(embedded)
    }
}

fn malformed(err: csv::Error) -> ParseError {
    ParseError::MalformedSource {
        line: err.position().map_or(0, |p| p.line()),
        message: err.to_string(),
    }
}
