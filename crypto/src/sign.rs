//! Recoverable secp256k1 signatures over Keccak-256 digests.

use ewm_types::{Address, Hash, PrivateKey, PublicKey, Signature};
use k256::ecdsa::{signature::hazmat::PrehashSigner, RecoveryId, VerifyingKey};

use crate::error::CryptoError;
use crate::keys::{signing_key, uncompressed};

/// Offset added to the recovery id to form `v`.
pub const RECOVERY_ID_OFFSET: u8 = 27;

/// Sign a 32-byte digest. The returned `v` is `27 + recovery id`.
pub fn sign_hash(hash: &Hash, private: &PrivateKey) -> Result<Signature, CryptoError> {
    let key = signing_key(private)?;
    let (sig, recovery_id): (k256::ecdsa::Signature, RecoveryId) = key
        .sign_prehash(hash.as_bytes())
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    let bytes = sig.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);
    Ok(Signature {
        v: RECOVERY_ID_OFFSET + recovery_id.to_byte(),
        r,
        s,
    })
}

/// Hash `data` with Keccak-256 and sign the digest.
pub fn sign_bytes(data: &[u8], private: &PrivateKey) -> Result<Signature, CryptoError> {
    sign_hash(&Hash::keccak(data), private)
}

/// Recover the signer's public key from a digest and signature.
pub fn recover_public_key(hash: &Hash, signature: &Signature) -> Result<PublicKey, CryptoError> {
    let recovery_id = signature
        .recovery_id()
        .and_then(RecoveryId::from_byte)
        .ok_or(CryptoError::RecoveryFailed)?;
    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&signature.r);
    compact[32..].copy_from_slice(&signature.s);
    let sig =
        k256::ecdsa::Signature::from_slice(&compact).map_err(|_| CryptoError::RecoveryFailed)?;
    let verifying_key = VerifyingKey::recover_from_prehash(hash.as_bytes(), &sig, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    uncompressed(&verifying_key)
}

/// Recover the signer's address from a digest and signature.
pub fn recover_address(hash: &Hash, signature: &Signature) -> Result<Address, CryptoError> {
    let public = recover_public_key(hash, signature)?;
    Ok(Address::from_public_key(public.as_bytes()))
}
