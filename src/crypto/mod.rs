//! Cryptographic primitives for Sencrypt.
//!
//! This module provides:
//! - OS-backed secure randomness (`random`)
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Argon2id password-based key derivation (`kdf`)
//! - HKDF/HMAC sub-keys and the verification tag (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod random;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_keys, ...};
pub use encryption::{decrypt, encrypt, Sealed};
pub use kdf::{derive_master_key_with_params, generate_salt, Argon2Params};
pub use keys::{compute_verifier, derive_key, derive_keys, EncryptionKey, VerificationTag};
