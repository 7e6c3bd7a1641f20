//! # swiftcodes - SWIFT/BIC code ingestion and lookup
//!
//! Parses bank identifier feeds (CSV) into a normalized, validated record
//! set, resolves headquarter/branch relationships, and serves the result
//! over HTTP.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│   Dataset   │────▶│    Store    │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (all-or-no) │     │ (HQ lookup) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use swiftcodes::{parse_swift_file, SwiftCodeStore};
//!
//! let dataset = parse_swift_file("swift_codes.csv").unwrap();
//! let mut store = SwiftCodeStore::new();
//! store.load(dataset.into_records());
//!
//! for branch in store.branches("ABIEBGS1XXX") {
//!     println!("{}", branch.swift_code);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Identifier and record types
//! - [`validation`] - Identifier shape check
//! - [`parser`] - CSV decoding with auto-detection
//! - [`dataset`] - Column checks, normalization, uniqueness
//! - [`hierarchy`] - Headquarter/branch resolution
//! - [`store`] - In-memory registry with JSON snapshot
//! - [`config`] - Environment settings
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Validation
pub mod validation;

// Parsing
pub mod parser;
pub mod dataset;

// Hierarchy
pub mod hierarchy;

// Storage
pub mod store;

// Configuration
pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    ParseError,
    ParseErrorKind,
    ParseResult,
    RecordError,
    ServerError,
    StoreError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{NewSwiftCode, SwiftCode, SwiftCodeRecord};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_swift_code, is_valid_swift_value, SWIFT_CODE_PATTERN};

// =============================================================================
// Re-exports - Dataset parsing
// =============================================================================

pub use dataset::{
    normalize_row,
    normalize_text,
    parse_swift_bytes,
    parse_swift_file,
    parse_swift_file_with_options,
    Dataset,
    ParseOptions,
};

pub use parser::{decode_content, detect_delimiter, detect_encoding};

// =============================================================================
// Re-exports - Hierarchy
// =============================================================================

pub use hierarchy::{branches_of, is_headquarter_code, swift_base, BaseLookup};

// =============================================================================
// Re-exports - Store
// =============================================================================

pub use store::{LoadSummary, SwiftCodeStore};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::Settings;

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
