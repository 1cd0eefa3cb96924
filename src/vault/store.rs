//! High-level vault operations used by the host application.
//!
//! `Vault` wraps the envelope layer, the crypto layer and the password
//! cache so that callers can work with simple method calls like
//! `vault.store(None, &mut credential)`.  One vault instance owns one
//! directory of envelope files; all state sits behind a single mutex,
//! so concurrent callers (GUI thread, pull workers) and the eviction
//! timer are totally ordered.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use uuid::Uuid;
use zeroize::{Zeroize, Zeroizing};

use crate::config::Settings;
use crate::crypto::encryption::{decrypt, encrypt};
use crate::crypto::hash::{MasterHash, MasterPassword};
use crate::crypto::kdf::KdfParams;
use crate::errors::{Result, VaultError};

use super::cache::{EvictionPolicy, PasswordCache, TimerRequest};
use super::envelope;
use super::record::Credential;

/// The master-password-gated credential store.
///
/// Construct one with [`Vault::open`]; clone the handle freely — all
/// clones share the same directory, cache and lock.
#[derive(Clone)]
pub struct Vault {
    inner: Arc<Mutex<VaultInner>>,
}

struct VaultInner {
    /// Directory holding one envelope file per record.
    dir: PathBuf,

    /// KDF parameters applied to every envelope.
    kdf: KdfParams,

    /// The in-memory password cache (hash copies only, never raw
    /// passwords).
    cache: PasswordCache,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open (or initialize) a vault in `dir`.
    ///
    /// Creates the directory if it does not exist.  Cache behaviour and
    /// KDF strength come from `settings`; an unknown eviction policy
    /// name is a config error.
    pub fn open(dir: &Path, settings: &Settings) -> Result<Self> {
        std::fs::create_dir_all(dir)?;

        let policy = settings.policy()?;
        let inner = VaultInner {
            dir: dir.to_path_buf(),
            kdf: KdfParams {
                iterations: settings.kdf_iterations,
            },
            cache: PasswordCache::new(settings.cache_enabled, policy),
        };

        Ok(Self {
            inner: Arc::new(Mutex::new(inner)),
        })
    }

    /// Take the vault lock, recovering from a poisoned mutex — the
    /// protected state is valid after any panic because every mutation
    /// is complete before the guard drops.
    fn lock(&self) -> MutexGuard<'_, VaultInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ------------------------------------------------------------------
    // Master-password lifecycle
    // ------------------------------------------------------------------

    /// Whether a master password has been set (the marker envelope
    /// exists).
    pub fn is_master_password_set(&self) -> bool {
        let inner = self.lock();
        envelope::exists(&inner.dir, Uuid::nil())
    }

    /// Set the master password for the first time.
    ///
    /// Stores the marker envelope: the hash's hex form, encrypted under
    /// that same hash.  Decrypting it later and comparing proves a
    /// candidate password.  Fails with `AlreadySet` if a marker exists.
    pub fn set_master_password(&self, password: MasterPassword) -> Result<()> {
        let mut inner = self.lock();
        if envelope::exists(&inner.dir, Uuid::nil()) {
            return Err(VaultError::AlreadySet);
        }

        let hash = password.into_hash();
        let plaintext = Zeroizing::new(hash.to_hex());
        let env = encrypt(plaintext.as_bytes(), hash.as_bytes(), &inner.kdf)?;
        envelope::write(&inner.dir, Uuid::nil(), &env)?;

        let timer = inner.cache.populate(&hash);
        drop(inner);
        self.arm_timer(timer);
        Ok(())
    }

    /// Check a candidate hash against the marker envelope.
    ///
    /// Any failure — missing marker, undecryptable envelope, text
    /// mismatch — means `false`; this never errors and mutates no
    /// state, so repeated calls always agree.
    pub fn is_master_password_correct(&self, hash: &MasterHash) -> bool {
        let inner = self.lock();
        inner.verify(hash)
    }

    /// Change the master password, re-encrypting every stored record.
    ///
    /// The pass is staged: every envelope is decrypted under the old
    /// hash and re-encrypted under the new one in memory first, so any
    /// crypto failure leaves the disk untouched.  Only then are the new
    /// envelopes persisted (each write atomic).  A write failure during
    /// that second phase also reports `KeyChangeFailed`, and may leave
    /// mixed keys on disk — the staging keeps that window down to IO
    /// errors alone.
    pub fn update_master_password(
        &self,
        old_password: MasterPassword,
        new_password: MasterPassword,
    ) -> Result<()> {
        let mut inner = self.lock();
        if !envelope::exists(&inner.dir, Uuid::nil()) {
            return Err(VaultError::NotSetYet);
        }

        let old_hash = old_password.into_hash();
        let new_hash = new_password.into_hash();

        if !inner.verify(&old_hash) {
            return Err(VaultError::WrongPassword);
        }

        // Phase 1: stage every re-encrypted envelope in memory.
        let ids = envelope::list_ids(&inner.dir)?;
        let mut staged: Vec<(Uuid, Vec<u8>)> = Vec::with_capacity(ids.len());

        for id in ids {
            let env = if id.is_nil() {
                // The marker's plaintext is the key material itself, so
                // it is rebuilt from the new hash rather than carried
                // over.
                let plaintext = Zeroizing::new(new_hash.to_hex());
                encrypt(plaintext.as_bytes(), new_hash.as_bytes(), &inner.kdf)
                    .map_err(|e| VaultError::KeyChangeFailed(e.to_string()))?
            } else {
                let old_env = envelope::read(&inner.dir, id)?;
                let mut plaintext = decrypt(&old_env, old_hash.as_bytes(), &inner.kdf)
                    .map_err(|e| VaultError::KeyChangeFailed(e.to_string()))?;
                let new_env = encrypt(&plaintext, new_hash.as_bytes(), &inner.kdf)
                    .map_err(|e| VaultError::KeyChangeFailed(e.to_string()));
                plaintext.zeroize();
                new_env?
            };
            staged.push((id, env));
        }

        // Phase 2: persist.
        for (id, env) in staged {
            envelope::write(&inner.dir, id, &env)
                .map_err(|e| VaultError::KeyChangeFailed(e.to_string()))?;
        }

        // The old hash is no longer valid anywhere.
        inner.cache.clear();
        let timer = inner.cache.populate(&new_hash);
        drop(inner);
        self.arm_timer(timer);
        Ok(())
    }

    /// Wipe the vault: delete every envelope (marker included) and
    /// clear the cache.  Full data loss by design — the recovery path
    /// for a forgotten master password.
    pub fn reset_master_password(&self) -> Result<()> {
        let mut inner = self.lock();
        for id in envelope::list_ids(&inner.dir)? {
            envelope::remove(&inner.dir, id)?;
        }
        inner.cache.clear();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cache control
    // ------------------------------------------------------------------

    /// Whether a validated hash is currently cached.
    pub fn is_master_password_cached(&self) -> bool {
        self.lock().cache.is_cached()
    }

    /// Turn hash caching on or off.  Disabling wipes the current entry.
    pub fn enable_cache(&self, enabled: bool) {
        self.lock().cache.set_enabled(enabled);
    }

    /// Change the eviction policy.  The current entry is wiped; the
    /// next validated operation repopulates under the new policy.
    pub fn set_cache_policy(&self, policy: EvictionPolicy) {
        self.lock().cache.set_policy(policy);
    }

    // ------------------------------------------------------------------
    // Credential operations
    // ------------------------------------------------------------------

    /// Persist a new credential record.
    ///
    /// Gated by the master password (explicit or cached).  After the
    /// envelope is on disk the record's secret bytes are zeroed — the
    /// caller keeps the metadata but not the secret.
    pub fn store(&self, password: Option<MasterPassword>, record: &mut Credential) -> Result<()> {
        let mut inner = self.lock();
        let id = record.id();
        if id.is_nil() {
            return Err(VaultError::ReservedId);
        }

        let (hash, timer) = inner.authorize(password)?;
        let result = if envelope::exists(&inner.dir, id) {
            Err(VaultError::CredentialExists(id))
        } else {
            inner.persist(&hash, record)
        };
        if result.is_ok() {
            record.destroy();
        }
        drop(inner);
        self.arm_timer(timer);
        result
    }

    /// Re-encrypt and persist an existing credential record.
    ///
    /// Same gate and zero-after-persist contract as [`Vault::store`];
    /// fails if no envelope exists for the record's id.
    pub fn update(&self, password: Option<MasterPassword>, record: &mut Credential) -> Result<()> {
        let mut inner = self.lock();
        let id = record.id();
        if id.is_nil() {
            return Err(VaultError::ReservedId);
        }

        let (hash, timer) = inner.authorize(password)?;
        let result = if envelope::exists(&inner.dir, id) {
            record.touch();
            inner.persist(&hash, record)
        } else {
            Err(VaultError::MissingCredential(id))
        };
        if result.is_ok() {
            record.destroy();
        }
        drop(inner);
        self.arm_timer(timer);
        result
    }

    /// Decrypt and return one credential record.
    pub fn get(&self, password: Option<MasterPassword>, id: Uuid) -> Result<Credential> {
        let mut inner = self.lock();
        let (hash, timer) = inner.authorize(password)?;

        let record = inner.load(&hash, id);
        drop(inner);
        self.arm_timer(timer);
        record
    }

    /// Decrypt several credential records in one gated pass.
    ///
    /// Repositories may reference the same stored login, so `ids` can
    /// contain duplicates; each underlying envelope is decrypted once
    /// and the record appears once in the returned map.  A referenced
    /// id with no envelope is an error, never silently skipped.
    pub fn get_many(
        &self,
        password: Option<MasterPassword>,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Credential>> {
        let mut inner = self.lock();
        let (hash, timer) = inner.authorize(password)?;

        let mut out = HashMap::with_capacity(ids.len());
        let mut result = Ok(());
        for &id in ids {
            if out.contains_key(&id) {
                continue;
            }
            match inner.load(&hash, id) {
                Ok(record) => {
                    out.insert(id, record);
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        drop(inner);
        self.arm_timer(timer);
        result.map(|()| out)
    }

    /// Delete a credential's envelope.
    ///
    /// Takes no password: removing ciphertext reveals nothing, and the
    /// host application deletes credentials when their repository
    /// records go away regardless of vault state.
    pub fn delete(&self, id: Uuid) -> Result<()> {
        let inner = self.lock();
        if id.is_nil() {
            return Err(VaultError::ReservedId);
        }
        envelope::remove(&inner.dir, id)
    }

    /// Report which of the referenced credential ids have no envelope
    /// on disk.  Presence check only — nothing is decrypted.
    pub fn missing_credentials(&self, ids: &[Uuid]) -> Vec<Uuid> {
        let inner = self.lock();
        let mut missing: Vec<Uuid> = ids
            .iter()
            .copied()
            .filter(|id| !envelope::exists(&inner.dir, *id))
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }

    // ------------------------------------------------------------------
    // Eviction timer
    // ------------------------------------------------------------------

    /// Arm a background eviction timer, if the cache asked for one.
    ///
    /// The timer thread takes the same vault lock as every operation
    /// before clearing, and the generation check makes it a no-op when
    /// the cache was repopulated (or cleared) in the meantime.
    fn arm_timer(&self, request: Option<TimerRequest>) {
        let Some(req) = request else { return };
        let inner = Arc::clone(&self.inner);
        thread::spawn(move || {
            thread::sleep(req.ttl);
            let mut guard = inner.lock().unwrap_or_else(|e| e.into_inner());
            guard.cache.clear_if_generation(req.generation);
        });
    }
}

impl VaultInner {
    /// Decrypt the marker envelope with `hash` and compare the
    /// plaintext to the hash's own hex form.  All failures mean false.
    fn verify(&self, hash: &MasterHash) -> bool {
        let Ok(env) = envelope::read(&self.dir, Uuid::nil()) else {
            return false;
        };
        let Ok(mut plaintext) = decrypt(&env, hash.as_bytes(), &self.kdf) else {
            return false;
        };
        let ok = hash.matches_hex(&plaintext);
        plaintext.zeroize();
        ok
    }

    /// Resolve and validate the effective password hash for a gated
    /// operation, then feed the cache.
    ///
    /// - Explicit password: hashed (consuming and zeroizing the raw
    ///   password), verified, and — when caching is enabled — cached.
    /// - No password: requires a cached hash (`NotCached` otherwise);
    ///   a successful use counts against a `MaxUses` policy.
    ///
    /// Returns the hash plus a timer request to arm once the vault
    /// lock is released.
    fn authorize(
        &mut self,
        password: Option<MasterPassword>,
    ) -> Result<(MasterHash, Option<TimerRequest>)> {
        if !envelope::exists(&self.dir, Uuid::nil()) {
            return Err(VaultError::NotSetYet);
        }

        match password {
            Some(pw) => {
                let hash = pw.into_hash();
                if !self.verify(&hash) {
                    return Err(VaultError::WrongPassword);
                }
                let timer = self.cache.populate(&hash);
                Ok((hash, timer))
            }
            None => {
                let hash = self.cache.get().ok_or(VaultError::NotCached)?;
                if !self.verify(&hash) {
                    // Cache no longer matches the marker (password was
                    // changed through another handle) — drop it.
                    self.cache.clear();
                    return Err(VaultError::WrongPassword);
                }
                self.cache.note_use();
                Ok((hash, None))
            }
        }
    }

    /// Serialize, encrypt and atomically write one record.
    fn persist(&self, hash: &MasterHash, record: &Credential) -> Result<()> {
        let plaintext = Zeroizing::new(
            serde_json::to_vec(record).map_err(|e| VaultError::InvalidRecord(e.to_string()))?,
        );
        let env = encrypt(&plaintext, hash.as_bytes(), &self.kdf)?;
        envelope::write(&self.dir, record.id(), &env)
    }

    /// Read, decrypt and deserialize one record.
    fn load(&self, hash: &MasterHash, id: Uuid) -> Result<Credential> {
        if id.is_nil() {
            return Err(VaultError::ReservedId);
        }
        let env = envelope::read(&self.dir, id)?;
        let plaintext = Zeroizing::new(decrypt(&env, hash.as_bytes(), &self.kdf)?);
        serde_json::from_slice(&plaintext).map_err(|e| VaultError::InvalidRecord(e.to_string()))
    }
}
