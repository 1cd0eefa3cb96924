//! Per-record envelope files and their binary framing.
//!
//! Each credential record is persisted as one file in the vault
//! directory, named after its id:
//!
//! ```text
//! <uuid>.cred = [RVLT: 4 bytes][version: 1 byte][crypto envelope]
//! ```
//!
//! - **Magic** (`RVLT`): identifies the file as a repovault envelope.
//! - **Version**: framing version (currently `1`).
//! - **Crypto envelope**: nonce + salt + ciphertext as produced by
//!   `crypto::encryption::encrypt`.
//!
//! The marker envelope lives at the nil UUID.  Writes go through a
//! same-directory temp file and a rename, so a reader never sees a
//! half-written envelope.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::errors::{Result, VaultError};

/// Magic bytes at the start of every envelope file.
const MAGIC: &[u8; 4] = b"RVLT";

/// Current framing version.
pub const CURRENT_VERSION: u8 = 1;

/// Fixed-size prefix: 4 (magic) + 1 (version).
const PREFIX_LEN: usize = 5;

/// File extension for envelope files.
const EXTENSION: &str = "cred";

/// Path of the envelope file for a record id.
pub fn path_for(dir: &Path, id: Uuid) -> PathBuf {
    dir.join(format!("{id}.{EXTENSION}"))
}

/// Whether an envelope exists for the given id.
pub fn exists(dir: &Path, id: Uuid) -> bool {
    path_for(dir, id).exists()
}

/// Write an envelope file atomically (temp file + rename).
pub fn write(dir: &Path, id: Uuid, envelope: &[u8]) -> Result<()> {
    let mut buf = Vec::with_capacity(PREFIX_LEN + envelope.len());
    buf.extend_from_slice(MAGIC);
    buf.push(CURRENT_VERSION);
    buf.extend_from_slice(envelope);

    // The temp file is in the same directory so the rename is
    // guaranteed to stay on one filesystem.
    let tmp_path = dir.join(format!(".{id}.{EXTENSION}.tmp"));
    fs::write(&tmp_path, &buf)?;
    fs::rename(&tmp_path, path_for(dir, id))?;

    Ok(())
}

/// Read the crypto-envelope bytes for a record id.
///
/// Validates the magic and version before handing the remainder to the
/// crypto layer.
pub fn read(dir: &Path, id: Uuid) -> Result<Vec<u8>> {
    let path = path_for(dir, id);
    if !path.exists() {
        return Err(VaultError::MissingCredential(id));
    }

    let data = fs::read(&path)?;

    if data.len() < PREFIX_LEN {
        return Err(VaultError::InvalidEnvelope(
            "file too small to be a valid envelope".into(),
        ));
    }
    if &data[0..4] != MAGIC {
        return Err(VaultError::InvalidEnvelope(
            "missing RVLT magic bytes".into(),
        ));
    }
    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(VaultError::InvalidEnvelope(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    Ok(data[PREFIX_LEN..].to_vec())
}

/// Delete the envelope file for a record id.
pub fn remove(dir: &Path, id: Uuid) -> Result<()> {
    let path = path_for(dir, id);
    if !path.exists() {
        return Err(VaultError::MissingCredential(id));
    }
    fs::remove_file(&path)?;
    Ok(())
}

/// List the ids of every envelope in the vault directory, marker
/// included.  Files that do not look like envelopes are ignored.
pub fn list_ids(dir: &Path) -> Result<Vec<Uuid>> {
    let mut ids = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Ok(id) = Uuid::parse_str(stem) {
            ids.push(id);
        }
    }

    Ok(ids)
}
