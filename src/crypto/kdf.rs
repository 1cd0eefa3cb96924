//! Encryption-key derivation using PBKDF2-HMAC-SHA256.
//!
//! Even though the input is already a SHA3-256 password hash, the KDF
//! is deliberately slow (65 536 iterations by default) so brute-forcing
//! a stolen vault offline stays expensive.  The iteration count is
//! configurable via `KdfParams` (loaded from `repovault.toml` or
//! sensible defaults) and a floor is enforced to prevent dangerously
//! weak settings.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use crate::errors::{CryptoError, CryptoResult};

/// Length of the per-envelope salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
const KEY_LEN: usize = 32;

/// Minimum accepted PBKDF2 iteration count.
const MIN_ITERATIONS: u32 = 10_000;

/// Configurable PBKDF2 parameters.
///
/// Maps 1:1 to the `kdf_iterations` field in `Settings` so the host
/// application can pass whatever the user configured.
#[derive(Debug, Clone, Copy)]
pub struct KdfParams {
    /// Number of PBKDF2 iterations (default: 65 536).
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self { iterations: 65_536 }
    }
}

/// Derive a 32-byte AES key from a password hash and salt.
///
/// The same hash + salt + params always produce the same key.
pub fn derive_key(
    password_hash: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> CryptoResult<[u8; KEY_LEN]> {
    if params.iterations < MIN_ITERATIONS {
        return Err(CryptoError::KeyDerivationFailed(format!(
            "kdf_iterations must be at least {MIN_ITERATIONS} (got {})",
            params.iterations
        )));
    }

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password_hash, salt, params.iterations, &mut key);
    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
