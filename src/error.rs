//! Error types and result type for the hawdict crate.
//!
//! This module defines all error variants that can occur while turning cleaned
//! lexicon entries into StarDict and XDXF dictionaries. It uses the `snafu`
//! library for ergonomic error handling with automatic backtrace capture.
//!
//! # Examples
//!
//! ```
//! use hawdict::{Result, DictError};
//!
//! fn make_key(key: &str) -> Result<String> {
//!     if key.trim().is_empty() {
//!         return Err(DictError::invalid_parameter("key"));
//!     }
//!     Ok(key.trim().to_string())
//! }
//!
//! assert!(make_key("  ").is_err());
//! ```
//!
//! # Error Variants
//!
//! - [`DictError::Io`]: I/O errors from file creation and writes
//! - [`DictError::ParserError`]: XML/JSON parsing errors
//! - [`DictError::InvalidParameter`]: Empty or missing required values
//! - [`DictError::InvalidDataFormat`]: Malformed dictionary file data
//! - [`DictError::AggregateFailure`]: Several independent build units failed

use std::io;
use snafu::{Snafu, Backtrace};

// Re-export snafu for context providers
pub use snafu;

/// One failed build unit inside an [`DictError::AggregateFailure`].
#[derive(Debug)]
pub struct UnitFailure {
    /// Unit label, `"{id}\{direction}"`
    pub unit: String,
    pub error: DictError,
}

/// Main error type for the hawdict crate.
///
/// All errors include automatic backtrace capture for debugging purposes.
/// Use the helper methods on `DictError` for convenient error construction.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DictError {
    /// I/O error occurred during file operations.
    #[snafu(display("IO error: {source}"))]
    Io {
        source: io::Error,
        backtrace: Backtrace,
    },

    /// Error parsing XML, JSON, or other structured data formats.
    #[snafu(display("Parser error: {source}"))]
    ParserError {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        backtrace: Backtrace,
    },

    /// Dictionary file data is malformed or doesn't match expected format.
    #[snafu(display("Invalid data format: {message}"))]
    InvalidDataFormat {
        message: String,
        backtrace: Backtrace,
    },

    /// A required value was empty or missing.
    #[snafu(display("Invalid parameter: {message}"))]
    InvalidParameter {
        message: String,
        backtrace: Backtrace,
    },

    /// More than one independent build unit failed.
    #[snafu(display("{} build unit(s) failed: {}", failures.len(), failures.iter().map(|f| f.unit.as_str()).collect::<Vec<_>>().join(", ")))]
    AggregateFailure {
        failures: Vec<UnitFailure>,
        backtrace: Backtrace,
    },
}

// For automatic conversions from standard error types
impl From<io::Error> for DictError {
    fn from(source: io::Error) -> Self {
        Self::Io { source, backtrace: Backtrace::capture() }
    }
}

impl From<quick_xml::Error> for DictError {
    fn from(source: quick_xml::Error) -> Self {
        Self::ParserError { source: Box::new(source), backtrace: Backtrace::capture() }
    }
}

impl From<serde_json::Error> for DictError {
    fn from(source: serde_json::Error) -> Self {
        Self::ParserError { source: Box::new(source), backtrace: Backtrace::capture() }
    }
}

impl From<std::string::FromUtf8Error> for DictError {
    fn from(source: std::string::FromUtf8Error) -> Self {
        Self::InvalidDataFormat { message: format!("Invalid UTF-8 (String): {}", source), backtrace: Backtrace::capture() }
    }
}

impl From<std::str::Utf8Error> for DictError {
    fn from(source: std::str::Utf8Error) -> Self {
        Self::InvalidDataFormat { message: format!("Invalid UTF-8 (&str): {}", source), backtrace: Backtrace::capture() }
    }
}

/// Helper methods for creating errors without context providers.
impl DictError {
    /// Creates an `InvalidParameter` error naming the offending value.
    ///
    /// # Examples
    ///
    /// ```
    /// use hawdict::DictError;
    ///
    /// let error = DictError::invalid_parameter("output_dir");
    /// assert!(error.is_invalid_parameter());
    /// ```
    pub fn invalid_parameter<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameter {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates an `InvalidDataFormat` error with the given message.
    pub fn invalid_data_format<S: Into<String>>(message: S) -> Self {
        Self::InvalidDataFormat {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Wraps the failures of several build units into one error.
    pub fn aggregate(failures: Vec<UnitFailure>) -> Self {
        Self::AggregateFailure {
            failures,
            backtrace: Backtrace::capture(),
        }
    }

    /// Checks if this error is an `InvalidParameter` variant.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, DictError::InvalidParameter { .. })
    }

    /// Returns the per-unit failures of an `AggregateFailure`, or an empty slice.
    pub fn unit_failures(&self) -> &[UnitFailure] {
        match self {
            DictError::AggregateFailure { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// A specialized `Result` type for hawdict operations.
///
/// This is a convenience type alias that uses [`DictError`] as the error type.
pub type Result<T> = std::result::Result<T, DictError>;
