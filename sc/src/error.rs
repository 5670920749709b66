//! Calculator error types

use thiserror::Error;

/// How an error should be treated by the interaction loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Expected, user-correctable input problem
    Domain,
    /// Tampered or corrupted serialized data
    Integrity,
    /// Internal consistency failure; indicates a bug
    Fatal,
}

/// Errors raised by the computation pipeline
#[derive(Debug, Error)]
pub enum CalcError {
    #[error("Value {value} is out of range (only 0-10 is supported)")]
    OutOfRange { value: i64 },

    #[error("Minuend {a} is smaller than subtrahend {b} (negative results are not supported)")]
    Underflow { a: i64, b: i64 },

    #[error("Unsupported operator '{symbol}' (only + and - are supported)")]
    UnsupportedOperator { symbol: String },

    #[error("Input validation failed for {a} and {b}")]
    ValidationFailed { a: i64, b: i64 },

    #[error("No operation selected; enter an expression with + or -")]
    NoOperation,

    #[error("Invalid input format, expected: <number> <operator> <number> (e.g. 5 - 2)")]
    InvalidFormat,

    #[error("Invalid number '{token}', enter an integer between 0 and 10")]
    InvalidNumber { token: String },

    #[error("Integrity check failed: {reason}")]
    Integrity { reason: String },

    #[error("Internal error: {operation} cross-check failed (expected {expected}, got {actual})")]
    CrossCheck {
        operation: &'static str,
        expected: i64,
        actual: i64,
    },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CalcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::OutOfRange { .. }
            | CalcError::Underflow { .. }
            | CalcError::UnsupportedOperator { .. }
            | CalcError::ValidationFailed { .. }
            | CalcError::NoOperation
            | CalcError::InvalidFormat
            | CalcError::InvalidNumber { .. } => ErrorKind::Domain,
            CalcError::Integrity { .. } | CalcError::Json(_) => ErrorKind::Integrity,
            CalcError::CrossCheck { .. } => ErrorKind::Fatal,
        }
    }

    /// Check if this is an expected, user-correctable error
    pub fn is_domain(&self) -> bool {
        self.kind() == ErrorKind::Domain
    }

    /// Check if this error indicates an algorithmic defect
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }
}
