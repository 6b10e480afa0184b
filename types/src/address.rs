//! 20-byte account address.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::hash::{keccak256, Hash};

/// An account address: the low 20 bytes of the Keccak-256 hash of an
/// uncompressed public key.
///
/// Equality, hashing and the canonical string form are all based on the raw
/// bytes; the mixed-case checksum form is only produced for display.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Self = Self([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        let arr: [u8; 20] = bytes.try_into().map_err(|_| ParseError::InvalidLength {
            expected: 20,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Parse 40 hex digits, with or without `0x`. Case is ignored.
    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Derive the address of a 64-byte uncompressed public key (prefix byte removed).
    pub fn from_public_key(public_key: &[u8; 64]) -> Self {
        let hash = keccak256(public_key);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Self(bytes)
    }

    /// Extract the address held in the low 20 bytes of a log topic.
    pub fn from_topic(topic: &Hash) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&topic.as_bytes()[12..]);
        Self(bytes)
    }

    /// Left-pad to a 32-byte log topic.
    pub fn to_topic(&self) -> Hash {
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(&self.0);
        Hash::new(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase `0x`-prefixed 42-character form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// EIP-55 mixed-case checksum form, for display only.
    pub fn to_checksum_string(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Stable key for hash-set membership.
    pub fn set_key(&self) -> u64 {
        let mut key = [0u8; 8];
        key.copy_from_slice(&self.0[..8]);
        u64::from_be_bytes(key)
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
