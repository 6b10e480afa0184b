//! Ethereum transactions for the EWM wallet engine.
//!
//! - [`Transaction`]: the mutable pre-submission value object with its
//!   unsigned, signed (EIP-155) and archive RLP encodings
//! - [`TransactionStatus`]: network-reported lifecycle
//! - [`Log`]: contract event logs, used for ERC20 token transfers
//! - [`contract`]: the ERC20 `transfer` call data and event topic
//! - [`TokenRegistry`]: tokens known to a session

pub mod contract;
pub mod error;
pub mod log;
pub mod status;
pub mod token;
pub mod transaction;

pub use contract::{
    decode_erc20_transfer_data, erc20_transfer_data, AbiArgument, TRANSFER_EVENT_TOPIC,
    TRANSFER_SELECTOR,
};
pub use error::TransactionError;
pub use log::{Log, LogIdentifier};
pub use status::{Inclusion, TransactionErrorKind, TransactionStatus};
pub use token::TokenRegistry;
pub use transaction::{RlpKind, Transaction};
