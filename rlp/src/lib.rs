//! Recursive Length Prefix (RLP) codec.
//!
//! RLP has two shapes, byte strings and lists of items, each length-prefixed.
//! The codec is context-free: callers interpret decoded lists positionally.

pub mod codec;
pub mod error;
pub mod item;

pub use codec::{decode, decode_prefix, encode, MAX_DEPTH};
pub use error::RlpError;
pub use item::RlpItem;
