use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in Sencrypt.
#[derive(Debug, Error)]
pub enum SencryptError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Authentication failed — ciphertext was tampered with or the key is wrong")]
    AuthenticationFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Secure random source unavailable: {0}")]
    RandomUnavailable(String),

    // --- Vault lifecycle errors ---
    #[error("A master password has already been created for the vault at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("No vault found at {0} — run `sencrypt init` first")]
    NotInitialized(PathBuf),

    #[error("Vault is locked — unlock it with the master password first")]
    NotUnlocked,

    #[error("Vault is corrupt or has been tampered with: {0}")]
    CorruptVault(String),

    #[error("Invalid backup file: {0}")]
    InvalidBackup(String),

    // --- User input errors ---
    #[error("An account for '{username}' on '{website}' already exists")]
    DuplicateAccount { website: String, username: String },

    #[error("Account index {index} is out of range (vault holds {len} accounts)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid generator configuration: {0}")]
    InvalidConfiguration(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Invalid master password")]
    WrongMasterPassword,

    #[error("Audit error: {0}")]
    AuditError(String),
}

/// Convenience type alias for Sencrypt results.
pub type Result<T> = std::result::Result<T, SencryptError>;
