//! BIP32 hierarchical key derivation.
//!
//! Account keys live on the BIP44 path `m/44'/60'/0'/0/index`. Only private
//! (CKDpriv) derivation is needed: each step is an HMAC-SHA512 over the parent
//! chain code, with the left half added to the parent scalar modulo the curve
//! order.

use ewm_types::PrivateKey;
use hmac::{Hmac, Mac};
use k256::elliptic_curve::{Field, PrimeField};
use k256::{FieldBytes, Scalar};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::compressed_public_from_private;
use crate::mnemonic::seed_from_phrase;

type HmacSha512 = Hmac<Sha512>;

/// Indices at or above this bound are hardened.
pub const HARDENED: u32 = 0x8000_0000;

const MASTER_KEY_SALT: &[u8] = b"Bitcoin seed";

/// Account prefix of the derivation path: `m/44'/60'/0'/0`.
pub const ACCOUNT_PATH: [u32; 4] = [44 | HARDENED, 60 | HARDENED, HARDENED, 0];

/// An extended private key: secret scalar plus chain code.
pub struct ExtendedKey {
    key: PrivateKey,
    chain_code: Zeroizing<[u8; 32]>,
}

impl ExtendedKey {
    /// Master key for a BIP39 seed.
    pub fn master(seed: &[u8]) -> Result<Self, CryptoError> {
        let output = hmac_sha512(MASTER_KEY_SALT, &[seed])?;
        Self::from_hmac_output(&output, None)
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.key
    }

    /// Derive child `index` (hardened when `index >= HARDENED`).
    pub fn derive_child(&self, index: u32) -> Result<Self, CryptoError> {
        let index_bytes = index.to_be_bytes();
        let output = if index >= HARDENED {
            hmac_sha512(
                &self.chain_code[..],
                &[&[0u8][..], &self.key.as_bytes()[..], &index_bytes[..]],
            )?
        } else {
            let public = compressed_public_from_private(&self.key)?;
            hmac_sha512(&self.chain_code[..], &[&public[..], &index_bytes[..]])?
        };
        Self::from_hmac_output(&output, Some(&self.key))
    }

    /// Derive along a sequence of child indices.
    pub fn derive_path(&self, path: &[u32]) -> Result<Self, CryptoError> {
        let mut current = Self {
            key: PrivateKey(*self.key.as_bytes()),
            chain_code: self.chain_code.clone(),
        };
        for index in path {
            current = current.derive_child(*index)?;
        }
        Ok(current)
    }

    fn from_hmac_output(output: &[u8; 64], parent: Option<&PrivateKey>) -> Result<Self, CryptoError> {
        let mut left = [0u8; 32];
        left.copy_from_slice(&output[..32]);
        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&output[32..]);

        let tweak = scalar_from_bytes(&left)
            .ok_or_else(|| CryptoError::DerivationFailed("derived scalar out of range".into()))?;
        let scalar = match parent {
            Some(parent) => {
                let parent = scalar_from_bytes(parent.as_bytes())
                    .ok_or(CryptoError::InvalidPrivateKey)?;
                tweak + parent
            }
            None => tweak,
        };
        if bool::from(scalar.is_zero()) {
            return Err(CryptoError::DerivationFailed("derived key is zero".into()));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&scalar.to_repr());
        Ok(Self {
            key: PrivateKey(key),
            chain_code,
        })
    }
}

fn scalar_from_bytes(bytes: &[u8; 32]) -> Option<Scalar> {
    Option::from(Scalar::from_repr(FieldBytes::clone_from_slice(bytes)))
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<Zeroizing<[u8; 64]>, CryptoError> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| CryptoError::DerivationFailed(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    let mut output = Zeroizing::new([0u8; 64]);
    output.copy_from_slice(&mac.finalize().into_bytes());
    Ok(output)
}

/// Private key at `m/44'/60'/0'/0/index` for a BIP39 seed.
pub fn derive_private_key(seed: &[u8], index: u32) -> Result<PrivateKey, CryptoError> {
    let account = ExtendedKey::master(seed)?.derive_path(&ACCOUNT_PATH)?;
    let child = account.derive_child(index)?;
    Ok(PrivateKey(*child.private_key().as_bytes()))
}

/// Private key at `m/44'/60'/0'/0/index` for a recovery phrase.
pub fn private_key_from_phrase(phrase: &str, index: u32) -> Result<PrivateKey, CryptoError> {
    let seed = seed_from_phrase(phrase)?;
    derive_private_key(&seed[..], index)
}
