use ewm_crypto::CryptoError;
use ewm_rlp::RlpError;
use ewm_types::{Address, Hash, NumericError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("rlp: {0}")]
    Rlp(#[from] RlpError),

    #[error("crypto: {0}")]
    Crypto(#[from] CryptoError),

    #[error("numeric: {0}")]
    Numeric(#[from] NumericError),

    #[error("transaction hash mismatch: expected {expected}, computed {actual}")]
    TransactionHashMismatch { expected: Hash, actual: Hash },

    #[error("transaction is not signed")]
    NotSigned,

    #[error("transaction nonce has not been assigned")]
    NonceUnassigned,

    #[error("invalid signature: v = {v}")]
    InvalidSignature { v: u64 },

    #[error("signing key controls {signer}, not the source address {source_address}")]
    WrongSigner {
        signer: Address,
        source_address: Address,
    },

    #[error("malformed field {field}: {reason}")]
    MalformedField { field: &'static str, reason: String },
}
