//! Master-password wrapper types.
//!
//! The raw password only ever exists inside a [`MasterPassword`], which
//! is consumed by value by every vault operation that accepts one — the
//! caller's copy is zeroized when the wrapper drops.  Everything past
//! that boundary works with the [`MasterHash`], a SHA3-256 digest that
//! serves as the vault's key material and verification value.

use sha3::{Digest, Sha3_256};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Length of the SHA3-256 digest in bytes.
const HASH_LEN: usize = 32;

/// A raw master password on its way into the vault.
///
/// Vault APIs take this by value and drop it as soon as the hash has
/// been computed, which zeroizes the underlying string.  The caller is
/// expected to hand over its only copy.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterPassword(String);

impl MasterPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Hash the password with SHA3-256, consuming (and zeroizing) it.
    pub fn into_hash(self) -> MasterHash {
        let digest = Sha3_256::digest(self.0.as_bytes());
        let mut bytes = [0u8; HASH_LEN];
        bytes.copy_from_slice(&digest);
        MasterHash { bytes }
    }
}

impl std::fmt::Debug for MasterPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterPassword(<redacted>)")
    }
}

/// The SHA3-256 hash of the master password.
///
/// This is the only form of the password the vault stores or caches.
/// Its hex form is also the plaintext of the marker envelope, so a
/// successful marker decryption that matches proves the password.
/// Zeroized on drop; equality is constant-time.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterHash {
    bytes: [u8; HASH_LEN],
}

impl MasterHash {
    /// Access the raw digest bytes (used as KDF input).
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.bytes
    }

    /// Lowercase hex form — the marker envelope's plaintext.
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(HASH_LEN * 2);
        for b in &self.bytes {
            use std::fmt::Write;
            // Writing to a String cannot fail.
            let _ = write!(s, "{b:02x}");
        }
        s
    }

    /// Constant-time comparison against a candidate marker plaintext.
    ///
    /// The hex copy is key-material-equivalent, so it is wiped before
    /// this returns.
    pub fn matches_hex(&self, candidate: &[u8]) -> bool {
        let hex = Zeroizing::new(self.to_hex());
        hex.as_bytes().ct_eq(candidate).into()
    }
}

impl PartialEq for MasterHash {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for MasterHash {}

impl std::fmt::Debug for MasterHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterHash(<redacted>)")
    }
}
