//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use zeroize::Zeroizing;

use crate::config::{default_vault_dir, Settings};
use crate::errors::{Result, SencryptError};
use crate::vault::{SessionState, VaultController};

/// Minimum length for a newly chosen master password.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable holding the master password (CI/scripts).
pub const PASSWORD_ENV: &str = "SENCRYPT_PASSWORD";

/// Environment variable holding the new master password for `reset-password`.
pub const NEW_PASSWORD_ENV: &str = "SENCRYPT_NEW_PASSWORD";

/// Sencrypt CLI: local, offline password manager.
#[derive(Parser)]
#[command(
    name = "sencrypt",
    about = "Local, offline password manager with an encrypted vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (default: <data dir>/sencrypt)
    #[arg(long, env = "SENCRYPT_VAULT_DIR", global = true)]
    pub vault_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create the vault and choose a master password
    Init,

    /// List all accounts
    List {
        /// Show passwords instead of masking them
        #[arg(long)]
        show: bool,
    },

    /// Add an account
    Add {
        /// Website or URL (stored as its host name)
        website: String,
        /// Username or email
        username: String,
        /// Account password (omit for interactive prompt)
        #[arg(short, long, conflicts_with = "generate")]
        password: Option<String>,
        /// Generate a random password using the configured defaults
        #[arg(short, long)]
        generate: bool,
    },

    /// Update the account at INDEX
    Update {
        /// Index as shown by `sencrypt list`
        index: usize,
        /// New website
        #[arg(long)]
        website: Option<String>,
        /// New username
        #[arg(long)]
        username: Option<String>,
        /// New password
        #[arg(short, long, conflicts_with = "generate")]
        password: Option<String>,
        /// Replace the password with a generated one
        #[arg(short, long)]
        generate: bool,
    },

    /// Delete the account at INDEX
    Delete {
        /// Index as shown by `sencrypt list`
        index: usize,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Generate a random password (no vault needed)
    Generate {
        /// Password length (default from sencrypt.toml, else 20)
        #[arg(short, long)]
        length: Option<usize>,
        /// Include lowercase letters
        #[arg(long)]
        lowercase: bool,
        /// Include uppercase letters
        #[arg(long)]
        uppercase: bool,
        /// Include digits
        #[arg(long)]
        digits: bool,
        /// Include symbols
        #[arg(long)]
        symbols: bool,
    },

    /// Export or import an encrypted backup
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },

    /// Change the master password and re-encrypt the vault
    ResetPassword,

    /// Show where the vault lives and its key-derivation settings
    Status,

    /// View the audit log of vault operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// Backup subcommands.
#[derive(clap::Subcommand)]
pub enum BackupAction {
    /// Copy the encrypted vault to PATH
    Export {
        /// Destination file
        path: PathBuf,
    },

    /// Replace the vault with the backup at PATH
    Import {
        /// Backup file to restore
        path: PathBuf,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the vault directory: `--vault-dir` / `SENCRYPT_VAULT_DIR`,
/// else the platform data directory.
pub fn vault_dir(cli: &Cli) -> PathBuf {
    cli.vault_dir.clone().unwrap_or_else(default_vault_dir)
}

/// Load settings for the vault directory and open a controller on it.
pub fn open_controller(cli: &Cli) -> Result<(VaultController, Settings)> {
    let dir = vault_dir(cli);
    let settings = Settings::load(&dir)?;
    let controller = VaultController::open(settings.vault_config(&dir))?;
    Ok((controller, settings))
}

/// Open the controller and unlock it with the master password.
///
/// A wrong password becomes `WrongMasterPassword` and is recorded in
/// the audit log.
pub fn unlock(cli: &Cli) -> Result<(VaultController, Settings)> {
    let (controller, settings) = open_controller(cli)?;
    if controller.check_is_new() {
        return Err(SencryptError::NotInitialized(
            controller.container_path().to_path_buf(),
        ));
    }

    let password = prompt_password()?;
    if controller.verify_master_password(&password)? {
        return Ok((controller, settings));
    }

    crate::audit::log_audit(&controller.config().vault_dir, "unlock-failed", None);
    if controller.state() == SessionState::Uninitialized {
        output::warning("Too many wrong master passwords — the vault has been erased.");
    } else if settings.max_failed_attempts > 0 {
        let left = settings
            .max_failed_attempts
            .saturating_sub(controller.failed_attempts());
        output::warning(&format!("{left} attempt(s) left before the vault is erased."));
    }
    Err(SencryptError::WrongMasterPassword)
}

/// Get the master password, trying in order:
/// 1. `SENCRYPT_PASSWORD` env var (CI/scripts)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Master password")
        .interact()
        .map_err(|e| SencryptError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation.
///
/// `env_var` is checked first for scripted usage.  Enforces a minimum
/// password length.
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            if pw.chars().count() < MIN_PASSWORD_LEN {
                return Err(SencryptError::InvalidInput(format!(
                    "master password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| SencryptError::CommandFailed(format!("password prompt: {e}")))?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Prompt for an account password (hidden input, confirmed).
pub fn prompt_account_password() -> Result<Zeroizing<String>> {
    let pw = dialoguer::Password::new()
        .with_prompt("Account password")
        .with_confirmation("Confirm account password", "Passwords do not match")
        .interact()
        .map_err(|e| SencryptError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Ask a yes/no question, defaulting to "no".
pub fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| SencryptError::CommandFailed(format!("confirm prompt: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_generate() {
        let cli = Cli::try_parse_from(["sencrypt", "add", "example.com", "alice", "--generate"])
            .unwrap();
        match cli.command {
            Commands::Add {
                website,
                username,
                password,
                generate,
            } => {
                assert_eq!(website, "example.com");
                assert_eq!(username, "alice");
                assert!(password.is_none());
                assert!(generate);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn password_and_generate_conflict() {
        let result = Cli::try_parse_from([
            "sencrypt",
            "add",
            "example.com",
            "alice",
            "--password",
            "x",
            "--generate",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["sencrypt", "-vv", "status"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn explicit_vault_dir_wins() {
        let cli =
            Cli::try_parse_from(["sencrypt", "--vault-dir", "/tmp/somewhere", "status"]).unwrap();
        assert_eq!(vault_dir(&cli), PathBuf::from("/tmp/somewhere"));
    }

    #[test]
    fn backup_import_parses_force() {
        let cli = Cli::try_parse_from(["sencrypt", "backup", "import", "b.sncr", "-f"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Backup {
                action: BackupAction::Import { force: true, .. }
            }
        ));
    }
}
