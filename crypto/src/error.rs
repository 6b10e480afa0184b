use thiserror::Error;

/// Errors arising from key handling, derivation and signing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid mnemonic phrase: {0}")]
    InvalidMnemonic(String),

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("signature recovery failed")]
    RecoveryFailed,

    #[error("entropy source unavailable: {0}")]
    Entropy(String),
}
