//! Wallet core for the EWM engine.
//!
//! Provides everything above the transaction layer:
//! - The session [`Account`]: primary address, signing and nonce table
//! - [`Transfer`]s backed by a transaction or an ERC20 log
//! - Per-currency [`Wallet`] ledgers with balance and default gas policy
//! - The [`WalletManager`] session and its announce entry points
//! - TOML configuration ([`EwmConfig`])

pub mod account;
pub mod config;
pub mod error;
pub mod manager;
pub mod transfer;
pub mod wallet;

pub use account::{Account, PRIMARY_INDEX};
pub use config::{EwmConfig, TokenConfig};
pub use error::WalletError;
pub use manager::WalletManager;
pub use transfer::{Transfer, TransferBasis, TransferId, TransferStatus};
pub use wallet::{Wallet, WalletId};
