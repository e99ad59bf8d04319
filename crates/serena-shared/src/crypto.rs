//! Symmetric crypto for sync snapshots.
//!
//! The key is derived from the user's credentials alone (password plus
//! digits-only CPF) through a BLAKE3 KDF with a fixed domain-separation
//! context.  There is deliberately no salt and no stored key: a second
//! device must be able to rebuild the exact key from re-entered
//! credentials, with nothing but the encrypted blob on the wire.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;

use crate::constants::{KDF_CONTEXT_SYNC_KEY, NONCE_SIZE};
use crate::error::CryptoError;
use crate::models::cpf_digits;

pub type SymmetricKey = [u8; 32];

/// Derive the snapshot key from login credentials.
///
/// The CPF is normalised to bare digits first, so formatted and unformatted
/// input produce the same key.  A zero byte separates the two inputs to
/// keep (password, cpf) pairs unambiguous.
pub fn derive_sync_key(password: &str, cpf: &str) -> SymmetricKey {
    let mut hasher = blake3::Hasher::new_derive_key(KDF_CONTEXT_SYNC_KEY);
    hasher.update(password.as_bytes());
    hasher.update(&[0]);
    hasher.update(cpf_digits(cpf).as_bytes());
    let hash = hasher.finalize();
    let mut key = [0u8; 32];
    key.copy_from_slice(&hash.as_bytes()[..32]);
    key
}

pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    nonce
}

// Returns nonce || ciphertext (24 bytes nonce prepended)
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.into());
    let nonce_bytes = generate_nonce();
    let nonce = XNonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut output = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Authenticated decryption.  A wrong key or tampered ciphertext fails with
/// [`CryptoError::DecryptionFailed`]; it never yields garbage plaintext.
pub fn decrypt(key: &SymmetricKey, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if data.len() < NONCE_SIZE {
        return Err(CryptoError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
    let cipher = XChaCha20Poly1305::new(key.into());
    let nonce = XNonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}
