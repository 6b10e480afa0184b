//! Cryptographic primitives for the EWM wallet engine.
//!
//! - **secp256k1** recoverable ECDSA for transaction signing and sender recovery
//! - **Keccak-256** for digests and address derivation (re-exported from `ewm-types`)
//! - **BIP39** recovery phrases and **BIP32** derivation on `m/44'/60'/0'/0/index`

pub mod error;
pub mod hd;
pub mod keys;
pub mod mnemonic;
pub mod sign;

pub use error::CryptoError;
pub use ewm_types::keccak256;
pub use hd::{derive_private_key, private_key_from_phrase, ExtendedKey};
pub use keys::{
    address_from_private, compressed_public_from_private, generate_private_key,
    private_key_from_hex, public_from_private,
};
pub use mnemonic::{generate_mnemonic, seed_from_phrase, validate_mnemonic};
pub use sign::{recover_address, recover_public_key, sign_bytes, sign_hash};
