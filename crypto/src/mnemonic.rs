//! BIP39 recovery phrases.
//!
//! A phrase is turned into a 64-byte seed with PBKDF2-HMAC-SHA512 ("mnemonic"
//! salt, 2048 rounds, empty passphrase). Account keys are derived from that
//! seed by [`crate::hd`].

use bip39::Mnemonic;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Generate a new 12-word phrase from 128 bits of entropy.
pub fn generate_mnemonic() -> Result<String, CryptoError> {
    let mut entropy = Zeroizing::new([0u8; 16]);
    getrandom::getrandom(&mut entropy[..]).map_err(|e| CryptoError::Entropy(e.to_string()))?;
    let mnemonic = Mnemonic::from_entropy(&entropy[..])
        .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()))?;
    Ok(mnemonic.to_string())
}

/// Validate a phrase (word list and checksum).
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_normalized(phrase).is_ok()
}

/// Derive the BIP39 seed for a phrase.
pub fn seed_from_phrase(phrase: &str) -> Result<Zeroizing<[u8; 64]>, CryptoError> {
    let mnemonic = Mnemonic::parse_normalized(phrase)
        .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()))?;
    Ok(Zeroizing::new(mnemonic.to_seed_normalized("")))
}
