//! The session account: primary address, signing and the nonce table.
//!
//! Only public material is kept. Private keys are derived from the phrase (or
//! supplied raw) for each signing call and dropped, zeroized, when it returns.

use std::collections::HashMap;

use ewm_crypto::CryptoError;
use ewm_types::{Address, PrivateKey, PublicKey, Signature};

/// Address index of the primary address.
pub const PRIMARY_INDEX: u32 = 0;

pub struct Account {
    primary_address: Address,
    primary_public_key: PublicKey,
    nonces: HashMap<Address, u64>,
}

impl Account {
    /// Build the account for a BIP39 recovery phrase.
    pub fn from_phrase(phrase: &str) -> Result<Self, CryptoError> {
        let key = ewm_crypto::private_key_from_phrase(phrase, PRIMARY_INDEX)?;
        Self::from_private_key(&key)
    }

    /// Build a single-key account.
    pub fn from_private_key(key: &PrivateKey) -> Result<Self, CryptoError> {
        let public = ewm_crypto::public_from_private(key)?;
        Ok(Self::from_public_key(public))
    }

    /// Build an account that can track but not sign without a supplied key.
    pub fn from_public_key(public: PublicKey) -> Self {
        Self {
            primary_address: Address::from_public_key(public.as_bytes()),
            primary_public_key: public,
            nonces: HashMap::new(),
        }
    }

    pub fn primary_address(&self) -> Address {
        self.primary_address
    }

    pub fn primary_public_key(&self) -> &PublicKey {
        &self.primary_public_key
    }

    pub fn has_address(&self, address: &Address) -> bool {
        self.primary_address == *address
    }

    /// Private key at `index` for `phrase`.
    pub fn private_key_for(&self, phrase: &str, index: u32) -> Result<PrivateKey, CryptoError> {
        ewm_crypto::private_key_from_phrase(phrase, index)
    }

    /// Keccak-256 `bytes` and sign with the primary key derived from `phrase`.
    pub fn sign_bytes_with_phrase(&self, bytes: &[u8], phrase: &str) -> Result<Signature, CryptoError> {
        let key = self.private_key_for(phrase, PRIMARY_INDEX)?;
        ewm_crypto::sign_bytes(bytes, &key)
    }

    pub fn sign_bytes_with_private_key(
        &self,
        bytes: &[u8],
        key: &PrivateKey,
    ) -> Result<Signature, CryptoError> {
        ewm_crypto::sign_bytes(bytes, key)
    }

    // ── Nonces ──────────────────────────────────────────────────────────

    /// Next nonce to use for `address`.
    pub fn nonce(&self, address: &Address) -> u64 {
        self.nonces.get(address).copied().unwrap_or(0)
    }

    /// Return the next nonce for `address` and advance it.
    pub fn nonce_get_then_increment(&mut self, address: &Address) -> u64 {
        let entry = self.nonces.entry(*address).or_insert(0);
        let nonce = *entry;
        *entry += 1;
        tracing::debug!(address = %address, nonce, "assigned nonce");
        nonce
    }

    /// Set the next nonce. Without `force` it only ever moves forward.
    pub fn set_nonce(&mut self, address: &Address, nonce: u64, force: bool) {
        let current = self.nonce(address);
        if force || nonce > current {
            self.nonces.insert(*address, nonce);
            tracing::debug!(address = %address, from = current, to = nonce, force, "updated nonce");
        }
    }
}
