//! Integration tests for the master-password re-keying transaction.

use repovault::config::Settings;
use repovault::{Credential, MasterPassword, SensitiveBytes, Vault, VaultError};
use tempfile::TempDir;

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

// ---------------------------------------------------------------------------
// Re-keying preserves content
// ---------------------------------------------------------------------------

#[test]
fn rekey_preserves_every_record() {
    let (_dir, vault) = open_vault();
    vault.set_master_password(pw("Secret123")).unwrap();

    let mut https = Credential::new_https("github", "bob", SensitiveBytes::from("hunter2"));
    let https_id = https.id();
    vault.store(None, &mut https).unwrap();

    let mut ssh = Credential::new_ssh("deploy", "/keys/id_ed25519", "phrase".into());
    let ssh_id = ssh.id();
    vault.store(None, &mut ssh).unwrap();

    vault
        .update_master_password(pw("Secret123"), pw("NewPW456"))
        .unwrap();

    // The old password no longer opens anything.
    assert!(matches!(
        vault.get(Some(pw("Secret123")), https_id),
        Err(VaultError::WrongPassword)
    ));

    // Every record is retrievable under the new password, fields intact.
    match vault.get(Some(pw("NewPW456")), https_id).unwrap() {
        Credential::Https {
            username, secret, ..
        } => {
            assert_eq!(username, "bob");
            assert_eq!(secret.expose(), b"hunter2");
        }
        other => panic!("expected an HTTPS credential, got {other:?}"),
    }
    match vault.get(Some(pw("NewPW456")), ssh_id).unwrap() {
        Credential::Ssh {
            key_path,
            passphrase,
            ..
        } => {
            assert_eq!(key_path, "/keys/id_ed25519");
            assert_eq!(passphrase.expose(), b"phrase");
        }
        other => panic!("expected an SSH credential, got {other:?}"),
    }
}

#[test]
fn rekey_rewrites_the_marker() {
    let (_dir, vault) = open_vault();
    vault.set_master_password(pw("Secret123")).unwrap();

    vault
        .update_master_password(pw("Secret123"), pw("NewPW456"))
        .unwrap();

    assert!(vault.is_master_password_set());
    assert!(!vault.is_master_password_correct(&pw("Secret123").into_hash()));
    assert!(vault.is_master_password_correct(&pw("NewPW456").into_hash()));
}

#[test]
fn rekey_works_on_a_marker_only_vault() {
    let (_dir, vault) = open_vault();
    vault.set_master_password(pw("Secret123")).unwrap();

    vault
        .update_master_password(pw("Secret123"), pw("NewPW456"))
        .unwrap();
    assert!(vault.is_master_password_correct(&pw("NewPW456").into_hash()));
}

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

#[test]
fn rekey_with_wrong_old_password_fails_and_changes_nothing() {
    let (_dir, vault) = open_vault();
    vault.set_master_password(pw("Secret123")).unwrap();

    let mut record = Credential::new_https("origin", "bob", SensitiveBytes::from("pw"));
    let id = record.id();
    vault.store(None, &mut record).unwrap();

    let result = vault.update_master_password(pw("WrongPW"), pw("NewPW456"));
    assert!(matches!(result, Err(VaultError::WrongPassword)));

    // Everything still opens under the original password.
    assert!(vault.get(Some(pw("Secret123")), id).is_ok());
}

#[test]
fn rekey_before_set_fails() {
    let (_dir, vault) = open_vault();
    let result = vault.update_master_password(pw("a"), pw("b"));
    assert!(matches!(result, Err(VaultError::NotSetYet)));
}

// ---------------------------------------------------------------------------
// Cache interaction
// ---------------------------------------------------------------------------

#[test]
fn rekey_caches_the_new_hash() {
    let (_dir, vault) = open_vault();
    vault.set_master_password(pw("Secret123")).unwrap();

    let mut record = Credential::new_https("origin", "bob", SensitiveBytes::from("pw"));
    let id = record.id();
    vault.store(None, &mut record).unwrap();

    vault
        .update_master_password(pw("Secret123"), pw("NewPW456"))
        .unwrap();

    // The cached hash is the new one: a passwordless get succeeds.
    assert!(vault.is_master_password_cached());
    assert!(vault.get(None, id).is_ok());
}

#[test]
fn rekey_with_caching_disabled_leaves_nothing_cached() {
    let (_dir, vault) = open_vault();
    vault.set_master_password(pw("Secret123")).unwrap();
    vault.enable_cache(false);

    vault
        .update_master_password(pw("Secret123"), pw("NewPW456"))
        .unwrap();
    assert!(!vault.is_master_password_cached());
}
