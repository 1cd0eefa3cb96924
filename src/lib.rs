pub mod config;
pub mod crypto;
pub mod errors;
pub mod vault;

// Most callers only need the vault handle and its input types.
pub use crypto::hash::{MasterHash, MasterPassword};
pub use errors::{CryptoError, VaultError};
pub use vault::cache::EvictionPolicy;
pub use vault::record::{AuthMethod, Credential};
pub use vault::secret::SensitiveBytes;
pub use vault::store::Vault;
