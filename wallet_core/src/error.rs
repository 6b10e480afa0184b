use ewm_crypto::CryptoError;
use ewm_rlp::RlpError;
use ewm_transactions::TransactionError;
use ewm_types::{Address, Hash, NumericError};
use thiserror::Error;

use crate::transfer::TransferId;
use crate::wallet::WalletId;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("numeric error: {0}")]
    Numeric(#[from] NumericError),

    #[error("rlp error: {0}")]
    Rlp(#[from] RlpError),

    #[error("unknown wallet: {0}")]
    UnknownWallet(WalletId),

    #[error("unknown transfer: {0}")]
    UnknownTransfer(TransferId),

    #[error("unknown transaction: {0}")]
    UnknownTransaction(Hash),

    #[error("address is not held by this account: {0}")]
    UnknownAccount(Address),

    #[error("unknown token: {0}")]
    UnknownToken(Address),

    #[error("transaction hash mismatch: signed {expected}, reported {actual}")]
    TransactionHashMismatch { expected: Hash, actual: Hash },

    #[error("transfer {0} was not created by this wallet")]
    NotOriginating(TransferId),

    #[error("transfer {0} cannot be cancelled or replaced")]
    NotReplaceable(TransferId),

    #[error("amount currency does not match the wallet")]
    CurrencyMismatch,

    #[error("malformed log: {0}")]
    MalformedLog(String),

    #[error("configuration error: {0}")]
    Config(String),
}
