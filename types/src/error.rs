//! Error types shared by the value types.

use thiserror::Error;

/// Failure kinds reported by 256-bit arithmetic and decimal parsing.
///
/// Every producing operation on [`crate::U256`] and the unit wrappers built on it
/// returns one of these instead of wrapping or truncating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumericError {
    #[error("numeric string contains unexpected characters")]
    StrangeDigits,

    #[error("numeric overflow")]
    Overflow,

    #[error("numeric underflow")]
    Underflow,
}

/// Errors from parsing hex-encoded hashes and addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
