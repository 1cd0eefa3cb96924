use thiserror::Error;
use uuid::Uuid;

/// Low-level failures from the crypto primitives.
///
/// These never reach callers directly: the vault layer catches them and
/// reclassifies authentication failures as `VaultError::WrongPassword`.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Decryption failed its authentication check — wrong key or
    /// tampered ciphertext.  The only reliable wrong-password signal.
    #[error("decryption failed authentication — wrong key or corrupted data")]
    AuthFailed,

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
}

/// All errors the vault surfaces to its callers.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Master-password lifecycle preconditions ---
    #[error("master password is already set")]
    AlreadySet,

    #[error("no master password has been set yet")]
    NotSetYet,

    // --- Authentication ---
    /// Recoverable by re-prompting the user.
    #[error("wrong master password")]
    WrongPassword,

    /// Caller error: a cache-dependent call was made with no cached
    /// password and none supplied.  Distinct from `WrongPassword` so
    /// callers know re-prompting will not help by itself.
    #[error("no master password supplied and none cached")]
    NotCached,

    // --- Record errors ---
    #[error("no credential stored under id {0}")]
    MissingCredential(Uuid),

    #[error("credential id {0} already exists (use update)")]
    CredentialExists(Uuid),

    #[error("the nil id is reserved for the master-password marker")]
    ReservedId,

    #[error("invalid credential record: {0}")]
    InvalidRecord(String),

    #[error("invalid envelope file: {0}")]
    InvalidEnvelope(String),

    // --- Re-keying ---
    #[error("master password change failed: {0}")]
    KeyChangeFailed(String),

    // --- Config errors ---
    #[error("config file error: {0}")]
    Config(String),

    // --- IO errors (surfaced as-is, never retried internally) ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CryptoError> for VaultError {
    /// Boundary reclassification: a failed auth check means the
    /// password was wrong; a rejected KDF setting is a configuration
    /// problem; anything else is a corrupt or malformed envelope,
    /// which callers cannot fix by re-prompting.
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::AuthFailed => VaultError::WrongPassword,
            CryptoError::KeyDerivationFailed(msg) => VaultError::Config(msg),
            other => VaultError::InvalidRecord(other.to_string()),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Alias for the crypto layer, which never sees vault-level concerns.
pub type CryptoResult<T> = std::result::Result<T, CryptoError>;
