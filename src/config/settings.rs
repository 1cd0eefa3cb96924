use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};
use crate::vault::cache::EvictionPolicy;

/// Vault configuration, loaded from `repovault.toml`.
///
/// Every field has a sensible default so the vault works without any
/// config file at all.  The host application reads this at vault
/// construction and whenever the user changes the eviction policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether a validated master-password hash may be cached in memory.
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,

    /// Eviction policy kind: "never", "max_uses" or "expiration".
    #[serde(default = "default_eviction_policy")]
    pub eviction_policy: String,

    /// How many cached uses are allowed under the "max_uses" policy.
    #[serde(default = "default_max_uses")]
    pub max_uses: u32,

    /// Cache lifetime in minutes under the "expiration" policy.
    #[serde(default = "default_expiration_minutes")]
    pub expiration_minutes: u64,

    /// PBKDF2 iteration count (default: 65 536).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_cache_enabled() -> bool {
    true
}

fn default_eviction_policy() -> String {
    "never".to_string()
}

fn default_max_uses() -> u32 {
    10
}

fn default_expiration_minutes() -> u64 {
    5
}

fn default_kdf_iterations() -> u32 {
    65_536
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_enabled: default_cache_enabled(),
            eviction_policy: default_eviction_policy(),
            max_uses: default_max_uses(),
            expiration_minutes: default_expiration_minutes(),
            kdf_iterations: default_kdf_iterations(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the vault directory.
    const FILE_NAME: &'static str = "repovault.toml";

    /// Load settings from `<vault_dir>/repovault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(vault_dir: &Path) -> Result<Self> {
        let config_path = vault_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::Config(format!("failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Convert the policy fields into the typed cache-layer enum.
    ///
    /// Unknown policy names are rejected rather than silently treated
    /// as "never".
    pub fn policy(&self) -> Result<EvictionPolicy> {
        match self.eviction_policy.as_str() {
            "never" => Ok(EvictionPolicy::Never),
            "max_uses" => Ok(EvictionPolicy::MaxUses(self.max_uses)),
            "expiration" => Ok(EvictionPolicy::Expiration(Duration::from_secs(
                self.expiration_minutes * 60,
            ))),
            other => Err(VaultError::Config(format!(
                "unknown eviction_policy '{other}' — expected never, max_uses or expiration"
            ))),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
