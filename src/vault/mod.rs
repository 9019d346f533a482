//! Vault module — the encrypted account store.
//!
//! This module provides:
//! - `Account` / `AccountRecord` types and website normalization (`account`, `hostname`)
//! - The binary container format with atomic writes (`format`)
//! - The decrypted working set and CRUD over it (`state`, `repository`)
//! - Backup export/import (`backup`) and the failed-unlock counter (`lockout`)
//! - `VaultController`, the session state machine callers talk to (`controller`)

pub mod account;
pub mod backup;
pub mod controller;
pub mod format;
pub mod hostname;
pub mod lockout;
pub mod repository;
pub mod state;

// Re-export the most commonly used items.
pub use account::{Account, AccountRecord};
pub use controller::{SessionState, VaultConfig, VaultController};
pub use format::{EncryptedContainer, VaultHeader};
pub use hostname::normalize_website;
pub use repository::AccountRepository;
pub use state::VaultState;
