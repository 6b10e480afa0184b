use thiserror::Error;

/// Errors from decoding or interpreting RLP data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RlpError {
    #[error("input truncated: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("non-canonical length prefix")]
    NonCanonicalLength,

    #[error("single byte below 0x80 must encode itself")]
    NonCanonicalSingleByte,

    #[error("integer has leading zero bytes")]
    NonCanonicalInteger,

    #[error("integer too large: {0} bytes")]
    IntegerTooLarge(usize),

    #[error("{0} trailing bytes after item")]
    TrailingBytes(usize),

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),

    #[error("expected a byte string, found a list")]
    ExpectedBytes,

    #[error("expected a list, found a byte string")]
    ExpectedList,

    #[error("wrong item count: expected {expected}, got {actual}")]
    WrongItemCount { expected: usize, actual: usize },

    #[error("wrong byte length: expected {expected}, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}
