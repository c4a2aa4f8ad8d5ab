//! Error types for taglog operations.
//!
//! This module defines [`Error`], the primary error type for all log
//! operations, along with a convenient [`Result`] type alias.

/// Error type for taglog operations.
///
/// Almost every operation on a [`Log`](crate::Log) is total: lookups by an
/// unknown key return an absent result, and tagging operations addressed to
/// an unknown key are silent no-ops. The only fallible surface is bulk
/// construction, which is handed explicit keys and must reject repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A bulk-load pair list contained the same key more than once.
    ///
    /// Keys identify exactly one record for the lifetime of the log, so a
    /// repeated key in the initial pair sequence is a caller bug rather
    /// than a condition the log can resolve on its own.
    DuplicateKey(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::DuplicateKey(key) => write!(f, "Duplicate key: {}", key),
        }
    }
}

/// Result type alias for taglog operations.
///
/// This is a convenience alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
