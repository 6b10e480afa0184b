//! Fundamental value types for the EWM wallet engine.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! the 256-bit integer, hashes, addresses, ether and gas amounts, tokens, keys and
//! network identifiers.

pub mod address;
pub mod amount;
pub mod error;
pub mod ether;
pub mod gas;
pub mod hash;
pub mod keys;
pub mod network;
pub mod u256;

pub use address::Address;
pub use amount::{Amount, Token, TokenQuantity};
pub use error::{NumericError, ParseError};
pub use ether::{Ether, EtherUnit};
pub use gas::{FeeBasis, Gas, GasPrice, GAS_LIMIT_MARGIN_PERCENT};
pub use hash::{keccak256, Hash};
pub use keys::{PrivateKey, PublicKey, Signature};
pub use network::Network;
pub use u256::U256;
