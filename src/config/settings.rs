use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::Argon2Params;
use crate::errors::{SencryptError, Result};
use crate::generator::PasswordOptions;
use crate::vault::VaultConfig;

/// User configuration, loaded from `<vault_dir>/sencrypt.toml`.
///
/// Every field has a sensible default so Sencrypt works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Erase the vault after this many wrong master passwords in a row.
    /// `0` disables it.
    #[serde(default)]
    pub max_failed_attempts: u32,

    /// Default length for `sencrypt generate`.
    #[serde(default = "default_generator_length")]
    pub generator_length: usize,

    #[serde(default = "default_true")]
    pub generator_lowercase: bool,

    #[serde(default = "default_true")]
    pub generator_uppercase: bool,

    #[serde(default = "default_true")]
    pub generator_digits: bool,

    #[serde(default = "default_true")]
    pub generator_symbols: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_generator_length() -> usize {
    20
}

fn default_true() -> bool {
    true
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            max_failed_attempts: 0,
            generator_length: default_generator_length(),
            generator_lowercase: true,
            generator_uppercase: true,
            generator_digits: true,
            generator_symbols: true,
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the vault directory.
    pub const FILE_NAME: &'static str = "sencrypt.toml";

    /// Load settings from `<vault_dir>/sencrypt.toml`.
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
            SencryptError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        tracing::debug!(path = %config_path.display(), "loaded settings");
        Ok(settings)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Character classes `generate` uses when no flag is given.
    pub fn generator_options(&self) -> PasswordOptions {
        PasswordOptions {
            lowercase: self.generator_lowercase,
            uppercase: self.generator_uppercase,
            digits: self.generator_digits,
            symbols: self.generator_symbols,
        }
    }

    /// Build the engine configuration for the vault in `vault_dir`.
    pub fn vault_config(&self, vault_dir: &Path) -> VaultConfig {
        VaultConfig {
            vault_dir: vault_dir.to_path_buf(),
            argon2: self.argon2_params(),
            max_failed_attempts: self.max_failed_attempts,
        }
    }
}

/// Default vault directory: `<platform data dir>/sencrypt`, falling back
/// to `.sencrypt` in the working directory.
pub fn default_vault_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("sencrypt"))
        .unwrap_or_else(|| PathBuf::from(".sencrypt"))
}

// ── Tests ────────────────────────────────────────────────────────────
