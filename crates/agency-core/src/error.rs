//! # Error Hierarchy
//!
//! Structured error types for the agency ERP, built with `thiserror`.
//! Every variant carries the offending field or value so an operator can
//! act on the message without reading the code.

use thiserror::Error;

/// Top-level error type for the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Document or identifier validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A collection name that is not in the catalog.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    /// An aggregate over stored amounts left the representable range.
    #[error("{0} totals exceed the supported amount range")]
    Overflow(&'static str),
}

/// Validation errors raised while normalizing or checking documents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identifier is not a 24-character hex string.
    #[error("invalid id: \"{0}\" (expected 24 hexadecimal characters)")]
    InvalidId(String),

    /// A required field is missing or blank.
    #[error("{field} is required")]
    MissingField {
        /// Canonical field name.
        field: String,
    },

    /// A numeric field holds something that is not a number.
    #[error("{field} must be a number, got {value}")]
    NotANumber {
        /// Canonical field name.
        field: String,
        /// The rejected value, rendered as JSON.
        value: String,
    },

    /// A number, or an amount derived from numbers, that does not fit the
    /// decimal range (about 7.9e28, 28 fractional digits).
    #[error("{field} is outside the supported amount range")]
    AmountOutOfRange {
        /// Canonical or derived field name.
        field: String,
    },

    /// A field restricted to a fixed set of labels holds another value.
    #[error("{field} must be one of [{allowed}], got \"{value}\"")]
    InvalidChoice {
        /// Canonical field name.
        field: String,
        /// The rejected value.
        value: String,
        /// Comma-separated allowed labels.
        allowed: String,
    },

    /// A field has the wrong JSON type.
    #[error("{field} must be {expected}")]
    WrongType {
        /// Canonical field name.
        field: String,
        /// Human description of the expected type.
        expected: &'static str,
    },

    /// IATA airport code is not three ASCII letters.
    #[error("invalid IATA code: \"{0}\" (expected 3 letters)")]
    InvalidIataCode(String),

    /// Date string could not be parsed.
    #[error("invalid date for {field}: \"{value}\" (expected YYYY-MM-DD or RFC 3339)")]
    InvalidDate {
        /// Canonical field name.
        field: String,
        /// The rejected value.
        value: String,
    },

    /// Request body is not a JSON object.
    #[error("request body must be a JSON object")]
    NotAnObject,
}
