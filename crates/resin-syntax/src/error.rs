//! Error handling types and utilities for the Resin language toolchain.
//!
//! This module provides the unified error handling system used throughout all
//! Resin components. It includes a structured error type with source location
//! information and convenience functions for error creation and propagation.
//!
//! Positions are 0-based rows and columns, the way the lexer counts them.
//!
//! # Examples
//!
//! ## Basic error creation
//!
//! ```rust
//! use resin_syntax::error::{Error, Result, error};
//!
//! // Create a simple error
//! let simple_error = Error::new("something went wrong");
//!
//! // Create an error with source location
//! let located_error = Error::with_span("unexpected token", 10, 5);
//!
//! // Use the convenience function
//! fn might_fail() -> Result<i32> {
//!     error("operation failed")
//! }
//! ```
//!
//! ## Error propagation
//!
//! ```rust
//! use resin_syntax::error::{Result, Error, error};
//!
//! fn parse_number(s: &str) -> Result<i32> {
//!     s.parse().map_err(|_| Error::new(format!("invalid number: {}", s)))
//! }
//!
//! fn process_input(input: &str) -> Result<i32> {
//!     let num = parse_number(input)?;
//!     if num < 0 {
//!         error("number must be positive")
//!     } else {
//!         Ok(num * 2)
//!     }
//! }
//! ```

use std::fmt;

/// An error that occurred during Resin language processing.
///
/// This structure represents all types of errors that can occur in the Resin
/// toolchain, from lexical analysis through evaluation. Each error carries a
/// descriptive message and optional source location information.
///
/// # Examples
///
/// ```rust
/// use resin_syntax::Error;
///
/// // Error without location
/// let generic_error = Error::new("failure reading input file");
///
/// // Error with precise location
/// let syntax_error = Error::with_span("stray right parenthesis", 15, 8);
///
/// println!("{}", syntax_error);  // "stray right parenthesis at 15:8"
/// ```
#[derive(Debug, Clone)]
pub struct Error {
    /// Human-readable error message
    pub msg: String,

    /// Optional row in the source (0-based)
    pub row: Option<u32>,

    /// Optional column in the source (0-based)
    pub col: Option<u32>,
}

impl Error {
    /// Creates a new error with the given message and no source location.
    ///
    /// Suitable for runtime errors or cases where a location is not relevant.
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            row: None,
            col: None,
        }
    }

    /// Creates a new error with the given message and source location.
    ///
    /// This is used for lex and parse errors that can be precisely located
    /// in the source text.
    pub fn with_span(msg: impl Into<String>, row: u32, col: u32) -> Self {
        Self {
            msg: msg.into(),
            row: Some(row),
            col: Some(col),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(r), Some(c)) = (self.row, self.col) {
            write!(f, "{} at {}:{}", self.msg, r, c)
        } else {
            write!(f, "{}", self.msg)
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::new(s)
    }
}
impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::new(s)
    }
}

/// A specialized `Result` type for Resin operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Convenience function to create an error result.
///
/// Shorthand for `Err(Error::new(msg))`.
///
/// # Examples
///
/// ```rust
/// use resin_syntax::error::{Result, error};
///
/// fn validate_input(s: &str) -> Result<()> {
///     if s.is_empty() {
///         error("input cannot be empty")
///     } else {
///         Ok(())
///     }
/// }
/// ```
pub fn error<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::new(msg))
}

/// Convenience function to create an error result with source location.
///
/// Shorthand for `Err(Error::with_span(msg, row, col))`.
pub fn error_at<T>(row: u32, col: u32, msg: impl Into<String>) -> Result<T> {
    Err(Error::with_span(msg, row, col))
}
