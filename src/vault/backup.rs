//! Backup export and import of the encrypted container.
//!
//! A backup is a byte-identical copy of `vault.sncr`.  Neither direction
//! needs the master password: the ciphertext is portable as-is, and the
//! password is checked on the next unlock.

use std::fs;
use std::path::Path;

use super::format::{atomic_write, EncryptedContainer};
use crate::errors::{SencryptError, Result};

/// Copy the container at `container_path` to `destination` verbatim.
///
/// Refuses to export a container that does not parse, so a backup is
/// never a copy of an already broken file.  Returns the number of bytes
/// written.
pub fn export_backup(container_path: &Path, destination: &Path) -> Result<usize> {
    if !container_path.exists() {
        return Err(SencryptError::NotInitialized(container_path.to_path_buf()));
    }
    let data = fs::read(container_path)?;
    EncryptedContainer::from_bytes(&data)?;

    atomic_write(destination, &data)?;
    tracing::info!(destination = %destination.display(), bytes = data.len(), "exported backup");
    Ok(data.len())
}

/// Replace the container at `container_path` with the backup at `source`.
///
/// The backup is fully read and structurally validated first; a corrupt
/// or foreign file is rejected with `InvalidBackup` and the active
/// container is left untouched.
pub fn import_backup(source: &Path, container_path: &Path) -> Result<()> {
    let data = fs::read(source).map_err(|e| {
        SencryptError::InvalidBackup(format!("cannot read {}: {e}", source.display()))
    })?;

    EncryptedContainer::from_bytes(&data).map_err(|e| match e {
        SencryptError::CorruptVault(msg) => SencryptError::InvalidBackup(msg),
        other => other,
    })?;

    atomic_write(container_path, &data)?;
    tracing::info!(source = %source.display(), bytes = data.len(), "imported backup");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn export_without_vault_fails() {
        let dir = TempDir::new().unwrap();
        let result = export_backup(&dir.path().join("vault.sncr"), &dir.path().join("b.sncr"));
        assert!(matches!(result, Err(SencryptError::NotInitialized(_))));
    }

    #[test]
    fn import_rejects_garbage_without_touching_vault() {
        let dir = TempDir::new().unwrap();
        let vault = dir.path().join("vault.sncr");
        let backup = dir.path().join("backup.bin");
        fs::write(&vault, b"original").unwrap();
        fs::write(&backup, b"this is not a vault at all, just some text").unwrap();

        let result = import_backup(&backup, &vault);
        assert!(matches!(result, Err(SencryptError::InvalidBackup(_))));
        assert_eq!(fs::read(&vault).unwrap(), b"original");
    }

    #[test]
    fn import_missing_file_is_invalid_backup() {
        let dir = TempDir::new().unwrap();
        let result = import_backup(&dir.path().join("nope"), &dir.path().join("vault.sncr"));
        assert!(matches!(result, Err(SencryptError::InvalidBackup(_))));
    }
}
