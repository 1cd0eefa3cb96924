//! Integration tests for the password cache and its eviction policies.

use std::thread;
use std::time::Duration;

use repovault::config::Settings;
use repovault::{Credential, EvictionPolicy, MasterPassword, SensitiveBytes, Vault, VaultError};
use tempfile::TempDir;
use uuid::Uuid;

fn open_vault() -> (TempDir, Vault) {
    let dir = TempDir::new().expect("create temp dir");
    let settings = Settings {
        kdf_iterations: 10_000,
        ..Settings::default()
    };
    let vault = Vault::open(dir.path(), &settings).expect("open vault");
    (dir, vault)
}

fn pw(s: &str) -> MasterPassword {
    MasterPassword::new(s)
}

/// Set up a vault with a master password and one stored credential.
fn seeded_vault() -> (TempDir, Vault, Uuid) {
    let (dir, vault) = open_vault();
    vault.set_master_password(pw("Secret123")).unwrap();
    let mut record = Credential::new_https("origin", "bob", SensitiveBytes::from("hunter2"));
    let id = record.id();
    vault.store(None, &mut record).unwrap();
    (dir, vault, id)
}

// ---------------------------------------------------------------------------
// Basic cache behaviour
// ---------------------------------------------------------------------------

#[test]
fn validated_password_is_cached() {
    let (_dir, vault) = open_vault();
    assert!(!vault.is_master_password_cached());

    vault.set_master_password(pw("Secret123")).unwrap();
    assert!(vault.is_master_password_cached());
}

#[test]
fn cache_dependent_call_without_cache_is_not_cached_error() {
    let (_dir, vault, id) = seeded_vault();
    vault.enable_cache(false);
    assert!(!vault.is_master_password_cached());

    // Distinct from WrongPassword: re-prompting alone will not help.
    let result = vault.get(None, id);
    assert!(matches!(result, Err(VaultError::NotCached)));
}

#[test]
fn disabled_cache_never_populates() {
    let (_dir, vault, id) = seeded_vault();
    vault.enable_cache(false);

    let fetched = vault.get(Some(pw("Secret123")), id);
    assert!(fetched.is_ok());
    assert!(!vault.is_master_password_cached());
}

#[test]
fn wrong_explicit_password_leaves_cache_intact() {
    let (_dir, vault, id) = seeded_vault();
    assert!(vault.is_master_password_cached());

    let result = vault.get(Some(pw("WrongPW")), id);
    assert!(matches!(result, Err(VaultError::WrongPassword)));

    // The earlier valid entry still works.
    assert!(vault.is_master_password_cached());
    assert!(vault.get(None, id).is_ok());
}

// ---------------------------------------------------------------------------
// Eviction by use count
// ---------------------------------------------------------------------------

#[test]
fn max_uses_policy_evicts_after_the_limit() {
    let (_dir, vault, id) = seeded_vault();
    vault.set_cache_policy(EvictionPolicy::MaxUses(2));

    // Policy change wiped the cache; repopulate with one explicit op.
    vault.get(Some(pw("Secret123")), id).unwrap();
    assert!(vault.is_master_password_cached());

    // Three cache-consuming operations: the third exceeds MaxUses(2).
    vault.get(None, id).unwrap();
    assert!(vault.is_master_password_cached());
    vault.get(None, id).unwrap();
    assert!(vault.is_master_password_cached());
    vault.get(None, id).unwrap();
    assert!(!vault.is_master_password_cached());

    // The next cached call has nothing to use.
    assert!(matches!(vault.get(None, id), Err(VaultError::NotCached)));
}

#[test]
fn explicit_password_repopulates_and_resets_the_count() {
    let (_dir, vault, id) = seeded_vault();
    vault.set_cache_policy(EvictionPolicy::MaxUses(1));

    vault.get(Some(pw("Secret123")), id).unwrap();
    vault.get(None, id).unwrap(); // use 1

    // Explicit password again: count restarts.
    vault.get(Some(pw("Secret123")), id).unwrap();
    vault.get(None, id).unwrap(); // use 1 of the new entry
    assert!(vault.is_master_password_cached());
}

// ---------------------------------------------------------------------------
// Eviction by expiration
// ---------------------------------------------------------------------------

#[test]
fn expiration_policy_clears_after_the_deadline() {
    let (_dir, vault, id) = seeded_vault();
    vault.set_cache_policy(EvictionPolicy::Expiration(Duration::from_millis(300)));

    vault.get(Some(pw("Secret123")), id).unwrap();
    assert!(vault.is_master_password_cached());

    // Not cleared before the deadline.
    thread::sleep(Duration::from_millis(100));
    assert!(vault.is_master_password_cached());

    // Cleared some bounded time after it, with no further operations.
    thread::sleep(Duration::from_millis(700));
    assert!(!vault.is_master_password_cached());
}

#[test]
fn repopulating_restarts_the_expiration_timer() {
    let (_dir, vault, id) = seeded_vault();
    vault.set_cache_policy(EvictionPolicy::Expiration(Duration::from_millis(400)));

    vault.get(Some(pw("Secret123")), id).unwrap();
    thread::sleep(Duration::from_millis(250));

    // Repopulate: the first timer becomes stale and must not clear
    // this newer entry when it fires.
    vault.get(Some(pw("Secret123")), id).unwrap();
    thread::sleep(Duration::from_millis(250));
    assert!(vault.is_master_password_cached());

    thread::sleep(Duration::from_millis(500));
    assert!(!vault.is_master_password_cached());
}

// ---------------------------------------------------------------------------
// Explicit clearing
// ---------------------------------------------------------------------------

#[test]
fn disabling_the_cache_clears_it() {
    let (_dir, vault, _id) = seeded_vault();
    assert!(vault.is_master_password_cached());

    vault.enable_cache(false);
    assert!(!vault.is_master_password_cached());
}

#[test]
fn policy_change_clears_the_cache() {
    let (_dir, vault, _id) = seeded_vault();
    assert!(vault.is_master_password_cached());

    vault.set_cache_policy(EvictionPolicy::MaxUses(5));
    assert!(!vault.is_master_password_cached());
}

#[test]
fn concurrent_cached_reads_are_serialized_not_corrupted() {
    let (_dir, vault, id) = seeded_vault();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let vault = vault.clone();
            thread::spawn(move || vault.get(None, id))
        })
        .collect();

    for handle in handles {
        let record = handle.join().unwrap().unwrap();
        assert_eq!(record.id(), id);
    }
}
