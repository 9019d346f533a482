//! `VaultController` — the single entry point for vault operations.
//!
//! The controller is an explicit session object with three states:
//!
//! ```text
//! Uninitialized --create_master_password--> Unlocked
//! Locked        --verify_master_password--> Unlocked   (on a match)
//! Unlocked      --lock / teardown---------> Locked
//! ```
//!
//! All operations run under one mutex, so read-modify-write-persist
//! sequences from concurrent callers never interleave.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::account::Account;
use super::backup;
use super::lockout::{LockoutStatus, LockoutTracker};
use super::repository::AccountRepository;
use crate::crypto::kdf::Argon2Params;
use crate::errors::{SencryptError, Result};
use crate::generator::{self, PasswordOptions};

/// Name of the container file inside the vault directory.
pub const VAULT_FILE: &str = "vault.sncr";

/// Name of the failed-attempt counter file inside the vault directory.
pub const LOCKOUT_FILE: &str = "lockout.json";

/// Engine configuration: where the vault lives and how keys are derived.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Directory holding the container and its companion files.
    pub vault_dir: PathBuf,

    /// Argon2id costs used when (re)creating the master password.
    pub argon2: Argon2Params,

    /// Erase the vault after this many consecutive wrong passwords
    /// (0 = never).
    pub max_failed_attempts: u32,
}

impl VaultConfig {
    /// Config with default KDF costs and no lockout.
    pub fn new(vault_dir: impl Into<PathBuf>) -> Self {
        Self {
            vault_dir: vault_dir.into(),
            argon2: Argon2Params::default(),
            max_failed_attempts: 0,
        }
    }

    /// Full path to the container file.
    pub fn container_path(&self) -> PathBuf {
        self.vault_dir.join(VAULT_FILE)
    }

    /// Full path to the failed-attempt counter.
    pub fn lockout_path(&self) -> PathBuf {
        self.vault_dir.join(LOCKOUT_FILE)
    }
}

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No master password exists yet.
    Uninitialized,
    /// A vault exists but no session key is held.
    Locked,
    /// The master password was verified; records are decrypted in memory.
    Unlocked,
}

enum Session {
    Uninitialized,
    Locked,
    Unlocked(Box<AccountRepository>),
}

impl Session {
    fn state(&self) -> SessionState {
        match self {
            Session::Uninitialized => SessionState::Uninitialized,
            Session::Locked => SessionState::Locked,
            Session::Unlocked(_) => SessionState::Unlocked,
        }
    }

    fn repository(&mut self) -> Result<&mut AccountRepository> {
        match self {
            Session::Unlocked(repo) => Ok(&mut **repo),
            Session::Uninitialized | Session::Locked => Err(SencryptError::NotUnlocked),
        }
    }
}

/// The vault façade.  Create one per process with `VaultController::open`.
pub struct VaultController {
    config: VaultConfig,
    container_path: PathBuf,
    lockout: LockoutTracker,
    session: Mutex<Session>,
}

impl VaultController {
    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Prepare the vault directory and start in `Locked` if a container
    /// exists, `Uninitialized` otherwise.  Nothing is decrypted here.
    pub fn open(config: VaultConfig) -> Result<Self> {
        ensure_vault_dir(&config.vault_dir)?;

        let container_path = config.container_path();
        let session = if container_path.exists() {
            Session::Locked
        } else {
            Session::Uninitialized
        };
        tracing::debug!(vault_dir = %config.vault_dir.display(), state = ?session.state(), "vault controller opened");

        Ok(Self {
            lockout: LockoutTracker::new(&config.lockout_path(), config.max_failed_attempts),
            container_path,
            config,
            session: Mutex::new(session),
        })
    }

    /// Lock the session and release the controller.
    pub fn teardown(self) {
        self.lock();
    }

    /// Drop the session key and decrypted records.  No-op unless unlocked.
    pub fn lock(&self) {
        let mut session = self.session();
        if let Session::Unlocked(_) = *session {
            *session = Session::Locked;
            tracing::info!("vault locked");
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.session().state()
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// True iff no master password has been created yet.
    pub fn check_is_new(&self) -> bool {
        let _session = self.session();
        !self.container_path.exists()
    }

    /// Set the master password for a new vault and unlock it.
    ///
    /// One-time: fails with `AlreadyInitialized` if a vault exists.
    pub fn create_master_password(&self, password: &str) -> Result<()> {
        let mut session = self.session();
        ensure_vault_dir(&self.config.vault_dir)?;
        let repo = AccountRepository::initialize(
            &self.container_path,
            password.as_bytes(),
            &self.config.argon2,
        )?;
        self.clear_failures()?;
        *session = Session::Unlocked(Box::new(repo));
        Ok(())
    }

    /// Check `password` and, on a match, unlock the vault.
    ///
    /// A wrong password is `Ok(false)`, never an error; any previously
    /// unlocked session is dropped first.  Tampering is `CorruptVault`.
    pub fn verify_master_password(&self, password: &str) -> Result<bool> {
        let mut session = self.session();
        if !self.container_path.exists() {
            *session = Session::Uninitialized;
            return Err(SencryptError::NotInitialized(self.container_path.clone()));
        }
        *session = Session::Locked;

        match AccountRepository::unlock(&self.container_path, password.as_bytes())? {
            Some(repo) => {
                self.clear_failures()?;
                *session = Session::Unlocked(Box::new(repo));
                Ok(true)
            }
            None => {
                self.on_failed_attempt(&mut session)?;
                Ok(false)
            }
        }
    }

    /// Bump the failure counter and erase the vault when it runs out.
    fn on_failed_attempt(&self, session: &mut Session) -> Result<()> {
        let status = match self.lockout.record_failure() {
            Ok(status) => status,
            Err(e) if !self.lockout.is_enforcing() => {
                tracing::warn!(error = %e, "could not record failed unlock");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        match status {
            LockoutStatus::Counting { failed, remaining } => {
                tracing::warn!(failed, ?remaining, "wrong master password");
            }
            LockoutStatus::Exhausted => {
                tracing::warn!(
                    limit = self.config.max_failed_attempts,
                    "too many wrong master passwords, erasing vault"
                );
                fs::remove_file(&self.container_path)?;
                self.lockout.reset()?;
                *session = Session::Uninitialized;
            }
        }
        Ok(())
    }

    /// Clear the failure counter.  Without an erase limit the counter is
    /// informational, so failing to clear it is only logged.
    fn clear_failures(&self) -> Result<()> {
        match self.lockout.reset() {
            Err(e) if !self.lockout.is_enforcing() => {
                tracing::warn!(error = %e, "could not clear failed-unlock counter");
                Ok(())
            }
            other => other,
        }
    }

    /// Consecutive wrong passwords since the last successful unlock.
    pub fn failed_attempts(&self) -> u32 {
        self.lockout.failed_attempts()
    }

    /// Derive a new key and salt from `new_password` and re-encrypt
    /// every record under it.  Requires an unlocked session.
    pub fn reset_master_password(&self, new_password: &str) -> Result<()> {
        let mut session = self.session();
        session
            .repository()?
            .reset_master_password(new_password.as_bytes(), &self.config.argon2)
    }

    // ------------------------------------------------------------------
    // Accounts (unlocked only)
    // ------------------------------------------------------------------

    /// All accounts in their current order.
    ///
    /// Indices are only valid until the next create/update/delete.
    pub fn get_all_accounts(&self) -> Result<Vec<Account>> {
        let mut session = self.session();
        Ok(session.repository()?.accounts())
    }

    pub fn create_account(&self, account: &Account) -> Result<()> {
        let mut session = self.session();
        session.repository()?.create(account)
    }

    pub fn update_account(&self, index: usize, account: &Account) -> Result<()> {
        let mut session = self.session();
        session.repository()?.update(index, account)
    }

    pub fn delete_account(&self, index: usize) -> Result<()> {
        let mut session = self.session();
        session.repository()?.delete(index)
    }

    // ------------------------------------------------------------------
    // Backups (no session required)
    // ------------------------------------------------------------------

    /// Copy the encrypted container to `destination`.
    pub fn export_backup(&self, destination: &Path) -> Result<usize> {
        let _session = self.session();
        backup::export_backup(&self.container_path, destination)
    }

    /// Replace the vault with the backup at `source` and lock.
    ///
    /// The backup may be under a different master password, so the next
    /// `verify_master_password` decides whether it opens.
    pub fn import_backup(&self, source: &Path) -> Result<()> {
        let mut session = self.session();
        backup::import_backup(source, &self.container_path)?;
        self.clear_failures()?;
        *session = Session::Locked;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Utilities
    // ------------------------------------------------------------------

    /// Generate a random password.  Stateless; works in any state.
    pub fn generate_random_password(&self, options: &PasswordOptions, length: usize) -> Result<String> {
        generator::generate_random_password(options, length)
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Returns the path to the container file.
    pub fn container_path(&self) -> &Path {
        &self.container_path
    }

    /// A poisoned lock still guards a consistent session, because
    /// mutations commit to memory only after a successful write.
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create the vault directory with owner-only permissions if missing.
fn ensure_vault_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}
