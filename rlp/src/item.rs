//! The two-shape RLP data model and typed accessors.

use ewm_types::{Address, Hash, U256};

use crate::error::RlpError;

/// An RLP value: a byte string or a list of values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RlpItem {
    Bytes(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    /// The empty byte string, which is also the encoding of integer zero.
    pub fn empty() -> Self {
        Self::Bytes(Vec::new())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn list(items: Vec<RlpItem>) -> Self {
        Self::List(items)
    }

    /// Big-endian integer with leading zeros stripped.
    pub fn from_u64(value: u64) -> Self {
        let bytes = value.to_be_bytes();
        let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        Self::Bytes(bytes[start..].to_vec())
    }

    pub fn from_u256(value: &U256) -> Self {
        Self::Bytes(value.to_be_bytes_trimmed())
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn as_bytes(&self) -> Result<&[u8], RlpError> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::List(_) => Err(RlpError::ExpectedBytes),
        }
    }

    pub fn as_list(&self) -> Result<&[RlpItem], RlpError> {
        match self {
            Self::List(items) => Ok(items),
            Self::Bytes(_) => Err(RlpError::ExpectedList),
        }
    }

    /// A list with exactly `expected` items.
    pub fn as_list_of_len(&self, expected: usize) -> Result<&[RlpItem], RlpError> {
        let items = self.as_list()?;
        if items.len() != expected {
            return Err(RlpError::WrongItemCount {
                expected,
                actual: items.len(),
            });
        }
        Ok(items)
    }

    pub fn as_u64(&self) -> Result<u64, RlpError> {
        let bytes = integer_bytes(self.as_bytes()?)?;
        if bytes.len() > 8 {
            return Err(RlpError::IntegerTooLarge(bytes.len()));
        }
        Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64))
    }

    pub fn as_u256(&self) -> Result<U256, RlpError> {
        let bytes = integer_bytes(self.as_bytes()?)?;
        U256::from_be_slice(bytes).ok_or(RlpError::IntegerTooLarge(bytes.len()))
    }

    /// A byte string of exactly `N` bytes.
    pub fn as_fixed<const N: usize>(&self) -> Result<[u8; N], RlpError> {
        let bytes = self.as_bytes()?;
        bytes.try_into().map_err(|_| RlpError::WrongLength {
            expected: N,
            actual: bytes.len(),
        })
    }

    pub fn as_address(&self) -> Result<Address, RlpError> {
        self.as_fixed::<20>().map(Address::new)
    }

    pub fn as_hash(&self) -> Result<Hash, RlpError> {
        self.as_fixed::<32>().map(Hash::new)
    }
}

fn integer_bytes(bytes: &[u8]) -> Result<&[u8], RlpError> {
    if bytes.first() == Some(&0) {
        return Err(RlpError::NonCanonicalInteger);
    }
    Ok(bytes)
}

impl From<u64> for RlpItem {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<&U256> for RlpItem {
    fn from(value: &U256) -> Self {
        Self::from_u256(value)
    }
}

impl From<&Address> for RlpItem {
    fn from(address: &Address) -> Self {
        Self::Bytes(address.as_bytes().to_vec())
    }
}

impl From<&Hash> for RlpItem {
    fn from(hash: &Hash) -> Self {
        Self::Bytes(hash.as_bytes().to_vec())
    }
}

impl From<&[u8]> for RlpItem {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<Vec<RlpItem>> for RlpItem {
    fn from(items: Vec<RlpItem>) -> Self {
        Self::List(items)
    }
}
