//! Cryptographic primitives for the credential vault.
//!
//! This module provides:
//! - Master-password hashing and the zeroizing wrapper types (`hash`)
//! - PBKDF2-HMAC-SHA256 key derivation (`kdf`)
//! - AES-256-GCM envelope encryption and decryption (`encryption`)
//!
//! Everything here is stateless: each call derives what it needs from
//! its arguments and wipes intermediate key material before returning.

pub mod encryption;
pub mod hash;
pub mod kdf;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use encryption::{decrypt, encrypt};
pub use hash::{MasterHash, MasterPassword};
pub use kdf::{derive_key, generate_salt, KdfParams};
