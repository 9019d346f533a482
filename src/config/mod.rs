//! Configuration loaded from `sencrypt.toml`.

pub mod settings;

pub use settings::{default_vault_dir, Settings};
