//! Error types and classification for GeoFlow.
//!
//! This crate provides:
//! - [`GfError`] - Top-level error enum for initialization and host errors
//! - Domain-specific errors ([`ConfigError`], [`ResolverError`], [`LookupError`])
//! - [`ErrorCategory`] for deciding whether an error stops startup or is only logged

use thiserror::Error;

/// Top-level error type for GeoFlow.
#[derive(Error, Debug)]
pub enum GfError {
    /// Configuration errors (parsing, validation)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Resolver backend errors (opening, format checks)
    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    /// Per-address lookup errors
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration document is malformed
    #[error("Parse error: {0}")]
    Parse(String),

    /// `db_type` is not one of city, country, asn
    #[error("Unknown database type '{0}' (expected city, country or asn)")]
    UnknownDatabaseType(String),

    /// Resolver was opened for a different database type than configured
    #[error("Database type mismatch: configured {configured}, resolver serves {actual}")]
    DatabaseTypeMismatch { configured: String, actual: String },
}

/// Resolver backend errors raised while opening a database.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// Database file not found
    #[error("Database not found: {0}")]
    NotFound(String),

    /// Database file exists but could not be opened or read
    #[error("Failed to open database {path}: {reason}")]
    Open { path: String, reason: String },

    /// File is not a valid database of the expected format
    #[error("Invalid database format: {0}")]
    InvalidFormat(String),

    /// Database is valid but cannot serve the configured database type
    #[error("Database {path} is a {found} database, which cannot serve '{expected}' lookups")]
    IncompatibleDatabase {
        path: String,
        expected: String,
        found: String,
    },
}

/// Errors from a single address lookup.
///
/// A missing entry is not an error: resolvers report it as `Ok(None)`.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The database is corrupt or its search tree is invalid
    #[error("Invalid database: {0}")]
    Database(String),

    /// The record at the resolved location could not be decoded
    #[error("Decoding failed: {0}")]
    Decoding(String),

    /// I/O failure while reading from the backend
    #[error("I/O error: {0}")]
    Io(String),
}

/// Error classification.
///
/// Startup must halt on fatal errors; recoverable errors are logged and the
/// affected rule is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Stop before processing any records
    ///
    /// Examples: bad config, missing database, wrong database type
    Fatal,

    /// Log and continue with the next rule or record
    ///
    /// Examples: corrupt record in the database, backend read failure
    Recoverable,
}

/// Classifies an error to decide whether processing may continue.
pub fn classify_error(error: &GfError) -> ErrorCategory {
    match error {
        GfError::Config(_) => ErrorCategory::Fatal,
        GfError::Resolver(_) => ErrorCategory::Fatal,
        GfError::Lookup(_) => ErrorCategory::Recoverable,
        GfError::Other(_) => ErrorCategory::Fatal,
    }
}

/// Result type alias using GfError.
pub type Result<T> = std::result::Result<T, GfError>;
