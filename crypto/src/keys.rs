//! secp256k1 key handling and address derivation.

use ewm_types::{Address, PrivateKey, PublicKey};
use k256::ecdsa::{SigningKey, VerifyingKey};

use crate::error::CryptoError;

/// Generate a random private key from the operating system's entropy source.
pub fn generate_private_key() -> Result<PrivateKey, CryptoError> {
    loop {
        let mut bytes = [0u8; 32];
        getrandom::getrandom(&mut bytes).map_err(|e| CryptoError::Entropy(e.to_string()))?;
        // Zero and out-of-range scalars are redrawn.
        if SigningKey::from_slice(&bytes).is_ok() {
            return Ok(PrivateKey(bytes));
        }
    }
}

/// Parse a 32-byte private key from hex, with or without `0x`.
pub fn private_key_from_hex(s: &str) -> Result<PrivateKey, CryptoError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(digits, &mut bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let key = PrivateKey(bytes);
    signing_key(&key)?;
    Ok(key)
}

pub(crate) fn signing_key(private: &PrivateKey) -> Result<SigningKey, CryptoError> {
    SigningKey::from_slice(private.as_bytes()).map_err(|_| CryptoError::InvalidPrivateKey)
}

pub(crate) fn uncompressed(verifying_key: &VerifyingKey) -> Result<PublicKey, CryptoError> {
    let point = verifying_key.to_encoded_point(false);
    let bytes: [u8; 64] = point
        .as_bytes()
        .get(1..)
        .and_then(|b| b.try_into().ok())
        .ok_or(CryptoError::InvalidPrivateKey)?;
    Ok(PublicKey(bytes))
}

/// Derive the uncompressed public key for a private key.
pub fn public_from_private(private: &PrivateKey) -> Result<PublicKey, CryptoError> {
    let key = signing_key(private)?;
    uncompressed(key.verifying_key())
}

/// 33-byte SEC1 compressed public key.
pub fn compressed_public_from_private(private: &PrivateKey) -> Result<[u8; 33], CryptoError> {
    let key = signing_key(private)?;
    key.verifying_key()
        .to_encoded_point(true)
        .as_bytes()
        .try_into()
        .map_err(|_| CryptoError::InvalidPrivateKey)
}

/// The address controlled by a private key.
pub fn address_from_private(private: &PrivateKey) -> Result<Address, CryptoError> {
    Ok(Address::from_public_key(public_from_private(private)?.as_bytes()))
}
