//! Credential records stored inside the vault.
//!
//! A `Credential` is a closed tagged union: an HTTPS login, an SSH key
//! passphrase, or the master-password marker.  Records serialize to
//! tagged JSON (the `kind` field carries the variant) before
//! encryption, so the variant survives a round trip without any
//! positional guessing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::secret::SensitiveBytes;

/// Name reported by the marker record.
pub const MARKER_NAME: &str = "MP_SET";

/// Which authentication mechanism a record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Https,
    Ssh,
    /// The marker record authenticates nothing itself.
    None,
}

/// A single credential record.
///
/// `id` is generated once at creation and never reused; the nil UUID
/// is reserved for the marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credential {
    /// An HTTPS remote login (username + password/token).
    Https {
        id: Uuid,
        name: String,
        username: String,
        secret: SensitiveBytes,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },

    /// An SSH key passphrase, tied to the key file it unlocks.
    Ssh {
        id: Uuid,
        name: String,
        key_path: String,
        passphrase: SensitiveBytes,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },

    /// The master-password sentinel.  Never stored as record JSON: its
    /// envelope's plaintext is the password hash's hex form, which is
    /// what makes it a verification value.
    Marker,
}

impl Credential {
    /// Create a new HTTPS credential with a fresh id.
    pub fn new_https(
        name: impl Into<String>,
        username: impl Into<String>,
        secret: SensitiveBytes,
    ) -> Self {
        let now = Utc::now();
        Credential::Https {
            id: Uuid::new_v4(),
            name: name.into(),
            username: username.into(),
            secret,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new SSH credential with a fresh id.
    pub fn new_ssh(
        name: impl Into<String>,
        key_path: impl Into<String>,
        passphrase: SensitiveBytes,
    ) -> Self {
        let now = Utc::now();
        Credential::Ssh {
            id: Uuid::new_v4(),
            name: name.into(),
            key_path: key_path.into(),
            passphrase,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Credential::Https { id, .. } | Credential::Ssh { id, .. } => *id,
            Credential::Marker => Uuid::nil(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Credential::Https { name, .. } | Credential::Ssh { name, .. } => name,
            Credential::Marker => MARKER_NAME,
        }
    }

    pub fn auth_method(&self) -> AuthMethod {
        match self {
            Credential::Https { .. } => AuthMethod::Https,
            Credential::Ssh { .. } => AuthMethod::Ssh,
            Credential::Marker => AuthMethod::None,
        }
    }

    /// Overwrite the record's secret bytes with zeros.
    ///
    /// `Vault::store` and `Vault::update` call this after persisting,
    /// so the caller's in-memory copy of the secret is gone once the
    /// encrypted envelope is on disk.
    pub fn destroy(&mut self) {
        match self {
            Credential::Https { secret, .. } => secret.destroy(),
            Credential::Ssh { passphrase, .. } => passphrase.destroy(),
            Credential::Marker => {}
        }
    }

    /// Bump `updated_at` to now.  Used by `Vault::update`.
    pub(crate) fn touch(&mut self) {
        match self {
            Credential::Https { updated_at, .. } | Credential::Ssh { updated_at, .. } => {
                *updated_at = Utc::now();
            }
            Credential::Marker => {}
        }
    }
}
