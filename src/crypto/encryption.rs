//! AES-256-GCM envelope encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and a
//! fresh 16-byte KDF salt, derives the AES key from the password hash
//! and salt, and prepends both to the ciphertext.  `decrypt` splits
//! them back out before decrypting.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | 16-byte salt | ciphertext + 16-byte auth tag ]
//!
//! The original scheme this replaces used AES-CBC, detecting a wrong
//! password purely through padding validity.  The GCM auth tag carries
//! that role here: a failed tag check surfaces as
//! `CryptoError::AuthFailed`, and the 16-byte CBC IV becomes the
//! standard 12-byte GCM nonce.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use zeroize::Zeroize;

use crate::crypto::kdf::{derive_key, generate_salt, KdfParams, SALT_LEN};
use crate::errors::{CryptoError, CryptoResult};

/// Size of the AES-256-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Encrypt `plaintext` under a key derived from `password_hash`.
///
/// Returns nonce || salt || ciphertext.  Nonce and salt are freshly
/// random on every call, never reused — two encryptions of the same
/// plaintext under the same hash produce different envelopes.
pub fn encrypt(plaintext: &[u8], password_hash: &[u8], params: &KdfParams) -> CryptoResult<Vec<u8>> {
    let salt = generate_salt();
    let mut key = derive_key(password_hash, &salt, params)?;

    // Build the cipher from the derived key bytes.
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| CryptoError::EncryptionFailed(format!("invalid key length: {e}")));
    key.zeroize();
    let cipher = cipher?;

    // Generate a random 12-byte nonce.
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    // Encrypt and authenticate the plaintext.
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(format!("encryption error: {e}")))?;

    // Prepend nonce and salt so the caller only needs to store one blob.
    let mut output = Vec::with_capacity(NONCE_LEN + SALT_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&salt);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt an envelope produced by `encrypt`.
///
/// Expects nonce || salt || ciphertext.  Fails with `AuthFailed` when
/// the auth tag does not verify — the wrong-password signal.
pub fn decrypt(envelope: &[u8], password_hash: &[u8], params: &KdfParams) -> CryptoResult<Vec<u8>> {
    // Make sure we have at least the nonce and salt.
    if envelope.len() < NONCE_LEN + SALT_LEN {
        return Err(CryptoError::InvalidEnvelope(
            "envelope too short to hold nonce and salt".into(),
        ));
    }

    // Split nonce and salt from the ciphertext.
    let (nonce_bytes, rest) = envelope.split_at(NONCE_LEN);
    let (salt, ciphertext) = rest.split_at(SALT_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let mut key = derive_key(password_hash, salt, params)?;

    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::AuthFailed);
    key.zeroize();
    let cipher = cipher?;

    // Decrypt and verify the auth tag.
    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::AuthFailed)?;

    Ok(plaintext)
}
