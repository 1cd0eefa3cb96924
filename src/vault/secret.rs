//! `SensitiveBytes` — an owned secret value that wipes itself.
//!
//! Credential secrets (HTTPS passwords, SSH passphrases) live in this
//! wrapper from the moment they enter the crate.  Dropping it zeroizes
//! the buffer; `destroy()` wipes it in place while the value is still
//! owned, which is how `Vault::store` fulfils its zero-after-persist
//! contract.  Serialized as a base64 string inside the (encrypted)
//! record JSON.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// A secret byte buffer, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SensitiveBytes(Vec<u8>);

impl SensitiveBytes {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Access the secret bytes.  Callers must not copy them anywhere
    /// that outlives the wrapper.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    /// Overwrite the buffer with zeros in place.
    ///
    /// After this the value still exists but holds nothing; `expose`
    /// returns an empty slice.
    pub fn destroy(&mut self) {
        self.0.zeroize();
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for SensitiveBytes {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl std::fmt::Debug for SensitiveBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SensitiveBytes(<redacted>)")
    }
}

// Serde as base64 text so the decrypted record JSON stays readable
// during debugging sessions without embedding raw byte arrays.
impl Serialize for SensitiveBytes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&BASE64.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for SensitiveBytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = BASE64.decode(&s).map_err(serde::de::Error::custom)?;
        Ok(Self(bytes))
    }
}
