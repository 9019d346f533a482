//! Account operations over an unlocked vault.
//!
//! `AccountRepository` owns everything an unlocked session needs: the
//! container path, the header, the derived encryption key and the
//! decrypted `VaultState`.  Every mutation re-encrypts the **entire**
//! record set and replaces the container atomically, so the file on disk
//! is always one consistent snapshot.  A mutation is committed to memory
//! only after that write succeeded.

use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use super::account::{Account, AccountRecord};
use super::format::{self, EncryptedContainer, VaultHeader};
use super::state::VaultState;
use crate::crypto::kdf::{generate_salt, Argon2Params};
use crate::crypto::keys::{derive_keys, EncryptionKey};
use crate::errors::{SencryptError, Result};

/// The unlocked vault: key material plus decrypted records.
pub struct AccountRepository {
    /// Path to the `vault.sncr` file on disk.
    path: PathBuf,

    /// Header of the container currently on disk.
    header: VaultHeader,

    /// Session key (zeroized on drop).
    key: EncryptionKey,

    /// Decrypted records (zeroized on drop).
    state: VaultState,
}

impl AccountRepository {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Set the master password for a brand-new vault at `path`.
    ///
    /// Generates a random salt, derives the key and verifier, and writes
    /// an empty encrypted record set.
    pub fn initialize(path: &Path, password: &[u8], params: &Argon2Params) -> Result<Self> {
        if path.exists() {
            return Err(SencryptError::AlreadyInitialized(path.to_path_buf()));
        }
        if password.is_empty() {
            return Err(SencryptError::InvalidInput(
                "master password cannot be empty".into(),
            ));
        }

        let salt = generate_salt()?;
        let keys = derive_keys(password, &salt, params)?;
        let header = VaultHeader::new(&salt, *params, &keys.verification_tag);

        let mut repo = Self {
            path: path.to_path_buf(),
            header,
            key: keys.encryption_key,
            state: VaultState::default(),
        };
        repo.persist(Vec::new())?;

        tracing::info!(path = %path.display(), "created vault");
        Ok(repo)
    }

    /// Check `password` against the vault at `path` and, if it matches,
    /// decrypt the record set.
    ///
    /// Returns `Ok(None)` for a wrong password; nothing derived from it
    /// is kept.  A container that fails authentication or holds an
    /// unreadable payload is `CorruptVault`.
    pub fn unlock(path: &Path, password: &[u8]) -> Result<Option<Self>> {
        let container = format::read_container(path)?;
        if password.is_empty() {
            return Ok(None);
        }

        let header = container.header.clone();
        let keys = derive_keys(password, &header.salt, &header.kdf)?;

        let stored_tag = header.verification_tag()?;
        if !stored_tag.matches(&keys.verification_tag) {
            return Ok(None);
        }

        let plaintext = container.open(&keys.encryption_key).map_err(|e| match e {
            SencryptError::AuthenticationFailed => {
                SencryptError::CorruptVault("record set failed authentication".into())
            }
            other => other,
        })?;
        let records: Vec<AccountRecord> = serde_json::from_slice(&plaintext)
            .map_err(|e| SencryptError::CorruptVault(format!("record set: {e}")))?;

        tracing::info!(accounts = records.len(), "vault unlocked");
        Ok(Some(Self {
            path: path.to_path_buf(),
            header,
            key: keys.encryption_key,
            state: VaultState::new(records),
        }))
    }

    // ------------------------------------------------------------------
    // Account operations
    // ------------------------------------------------------------------

    /// All accounts, in their current order.
    pub fn accounts(&self) -> Vec<Account> {
        self.state.accounts()
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Normalize, duplicate-check, append and persist a new account.
    pub fn create(&mut self, account: &Account) -> Result<()> {
        let account = account.normalized()?;
        self.state.ensure_unique(&account, None)?;

        let mut records = self.state.records().to_vec();
        records.push(AccountRecord::new(&account));
        self.persist(records)?;

        tracing::info!(accounts = self.state.len(), "account created");
        Ok(())
    }

    /// Replace the account at `index` in place.
    ///
    /// The duplicate check skips the record being updated, so saving an
    /// account with only its password changed is always allowed.
    pub fn update(&mut self, index: usize, account: &Account) -> Result<()> {
        let id = self.state.id_at(index)?;
        let account = account.normalized()?;
        self.state.ensure_unique(&account, Some(id))?;

        let mut records = self.state.records().to_vec();
        let pos = self
            .state
            .position(id)
            .ok_or(SencryptError::IndexOutOfRange {
                index,
                len: records.len(),
            })?;
        records[pos] = records[pos].updated_with(&account);
        self.persist(records)?;

        tracing::info!(index, "account updated");
        Ok(())
    }

    /// Remove the account at `index`.  Later indices shift down by one.
    pub fn delete(&mut self, index: usize) -> Result<()> {
        let id = self.state.id_at(index)?;

        let mut records = self.state.records().to_vec();
        records.retain(|r| r.id != id);
        self.persist(records)?;

        tracing::info!(accounts = self.state.len(), "account deleted");
        Ok(())
    }

    /// Re-encrypt every record under a key derived from `new_password`
    /// and a fresh salt.
    ///
    /// The records are already decrypted under the old key.  The new
    /// container is fully built before it replaces the old one, and the
    /// session switches keys only after the write succeeded.
    pub fn reset_master_password(&mut self, new_password: &[u8], params: &Argon2Params) -> Result<()> {
        if new_password.is_empty() {
            return Err(SencryptError::InvalidInput(
                "master password cannot be empty".into(),
            ));
        }

        let salt = generate_salt()?;
        let keys = derive_keys(new_password, &salt, params)?;
        let header = VaultHeader::new(&salt, *params, &keys.verification_tag);

        let payload = encode_records(self.state.records())?;
        let container = EncryptedContainer::seal(header, &keys.encryption_key, &payload)?;
        format::write_container(&self.path, &container)?;

        self.header = container.header;
        self.key = keys.encryption_key;

        tracing::info!(accounts = self.state.len(), "master password reset");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Encrypt `records`, replace the container, then commit `records`
    /// as the new working set.
    fn persist(&mut self, records: Vec<AccountRecord>) -> Result<()> {
        let payload = encode_records(&records)?;
        let container = EncryptedContainer::seal(self.header.clone(), &self.key, &payload)?;
        format::write_container(&self.path, &container)?;

        self.state.replace(records);
        Ok(())
    }
}

/// Serialize records into a buffer that is wiped on drop.
fn encode_records(records: &[AccountRecord]) -> Result<Zeroizing<Vec<u8>>> {
    serde_json::to_vec(records)
        .map(Zeroizing::new)
        .map_err(|e| SencryptError::SerializationError(format!("records: {e}")))
}
