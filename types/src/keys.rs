//! Key and signature types for account signing.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A 64-byte uncompressed secp256k1 public key (the `0x04` prefix removed).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 64]);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(&self.0[..8]))
    }
}

/// A 32-byte secp256k1 secret scalar.
///
/// This type intentionally does not implement `Debug` or `Clone`. Key bytes
/// are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

impl PrivateKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// A recoverable ECDSA signature.
///
/// `v` is `27 + recovery id`; zero means "not signed".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    pub v: u8,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl Signature {
    pub fn is_set(&self) -> bool {
        self.v != 0
    }

    /// Recovery id in `0..=3`, if `v` holds one.
    pub fn recovery_id(&self) -> Option<u8> {
        self.v.checked_sub(27).filter(|id| *id < 4)
    }
}
