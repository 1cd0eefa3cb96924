//! Vault module — encrypted credential storage.
//!
//! This module provides:
//! - `SensitiveBytes`, the zeroizing secret buffer (`secret`)
//! - `Credential` records and their variants (`record`)
//! - Per-record envelope files on disk (`envelope`)
//! - The master-password cache and its eviction policies (`cache`)
//! - The high-level `Vault` handle (`store`)

pub mod cache;
pub mod envelope;
pub mod record;
pub mod secret;
pub mod store;

// Re-export the most commonly used items.
pub use cache::EvictionPolicy;
pub use record::{AuthMethod, Credential};
pub use secret::SensitiveBytes;
pub use store::Vault;
