//! Error types for the SWIFT code registry.
//!
//! Each layer gets its own error enum:
//!
//! - [`ParseError`] - dataset ingestion failures (terminal, about the input)
//! - [`RecordError`] - single-record validation failures
//! - [`StoreError`] - record store failures
//! - [`ConfigError`] - invalid environment configuration
//! - [`ServerError`] - HTTP server startup and runtime errors
//!
//! Conversions into [`ServerError`] are automatic via `From`, so `?` works
//! across layer boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Dataset Parsing Errors
// =============================================================================

/// Coarse classification of a [`ParseError`].
///
/// Callers translating failures into user-facing responses match on this
/// instead of on the error payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    InvalidInput,
    SourceNotFound,
    UnsupportedFormat,
    SourceUnreadable,
    EmptySource,
    MalformedSource,
    MissingColumn,
    InvalidIdentifier,
    DuplicateIdentifier,
}

impl ParseErrorKind {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::SourceNotFound => "SOURCE_NOT_FOUND",
            Self::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            Self::SourceUnreadable => "SOURCE_UNREADABLE",
            Self::EmptySource => "EMPTY_SOURCE",
            Self::MalformedSource => "MALFORMED_SOURCE",
            Self::MissingColumn => "MISSING_COLUMN",
            Self::InvalidIdentifier => "INVALID_IDENTIFIER",
            Self::DuplicateIdentifier => "DUPLICATE_IDENTIFIER",
        }
    }
}

/// Errors raised while turning a CSV feed into a dataset.
///
/// All variants describe the input, never transient infrastructure, so none
/// of them are worth retrying.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Path is empty or whitespace only.
    #[error("invalid input: path is empty")]
    InvalidInput,

    /// Path does not exist or is not a regular file.
    #[error("source not found or not a regular file: {path}")]
    SourceNotFound { path: PathBuf },

    /// File does not carry the `.csv` extension.
    #[error("unsupported format: expected a '.csv' file, got {path}")]
    UnsupportedFormat { path: PathBuf },

    /// File exists but could not be read.
    #[error("failed to read {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No bytes, or whitespace only.
    #[error("source is empty")]
    EmptySource,

    /// Content is not valid delimited data.
    #[error("malformed source at line {line}: {message}")]
    MalformedSource { line: u64, message: String },

    /// A required column is absent from the header row.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// One or more identifier values do not have the SWIFT/BIC shape.
    #[error("invalid SWIFT code '{value}' at line {line} ({count} invalid in total)")]
    InvalidIdentifier {
        value: String,
        line: u64,
        count: usize,
    },

    /// The same identifier appears more than once.
    #[error("duplicate SWIFT code '{value}' at line {line}")]
    DuplicateIdentifier { value: String, line: u64 },
}

impl ParseError {
    /// Classification of this error.
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            Self::InvalidInput => ParseErrorKind::InvalidInput,
            Self::SourceNotFound { .. } => ParseErrorKind::SourceNotFound,
            Self::UnsupportedFormat { .. } => ParseErrorKind::UnsupportedFormat,
            Self::SourceUnreadable { .. } => ParseErrorKind::SourceUnreadable,
            Self::EmptySource => ParseErrorKind::EmptySource,
            Self::MalformedSource { .. } => ParseErrorKind::MalformedSource,
            Self::MissingColumn(_) => ParseErrorKind::MissingColumn,
            Self::InvalidIdentifier { .. } => ParseErrorKind::InvalidIdentifier,
            Self::DuplicateIdentifier { .. } => ParseErrorKind::DuplicateIdentifier,
        }
    }

    /// Shorthand for `self.kind().code()`.
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

// =============================================================================
// Record Validation Errors
// =============================================================================

/// Errors validating a single record outside of bulk ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Identifier does not have the SWIFT/BIC shape.
    #[error("invalid SWIFT code format: '{0}'")]
    InvalidSwiftCode(String),

    /// Country code is not two letters.
    #[error("country ISO2 code must be exactly 2 letters, got '{0}'")]
    InvalidCountryCode(String),

    /// Country code disagrees with positions 5-6 of the identifier.
    #[error("country ISO2 code '{found}' does not match '{expected}' in the SWIFT code")]
    CountryMismatch { expected: String, found: String },

    /// Supplied headquarter flag disagrees with the identifier.
    #[error("SWIFT code '{code}' must have isHeadquarter = {expected}")]
    HeadquarterMismatch { code: String, expected: bool },
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors from the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with this identifier.
    #[error("SWIFT code not found: {0}")]
    NotFound(String),

    /// A record with this identifier already exists.
    #[error("SWIFT code already exists: {0}")]
    AlreadyExists(String),

    /// Snapshot IO error.
    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot JSON error.
    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Store error during startup or persistence.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Preload of a CSV feed failed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Socket or runtime IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for dataset parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for single-record validation.
pub type RecordResult<T> = Result<T, RecordError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
