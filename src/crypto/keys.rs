//! Key material derived from the master password.
//!
//! Argon2id turns the password into a master key.  From that master key
//! we derive, with HKDF-SHA256:
//! - the **encryption key** used for AES-256-GCM over the record set, and
//! - a **verifier key**, which MACs the salt to produce the verification
//!   tag stored in the vault header.
//!
//! The tag proves knowledge of the password without storing it, and it
//! cannot be turned back into the password or the encryption key.

use std::fmt;

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use super::kdf::KEY_LEN;
use super::kdf::{derive_master_key_with_params, Argon2Params};
use crate::errors::{SencryptError, Result};

const ENCRYPTION_KEY_INFO: &[u8] = b"sencrypt-encryption-key-v1";
const VERIFIER_KEY_INFO: &[u8] = b"sencrypt-verifier-key-v1";
const VERIFIER_DOMAIN: &[u8] = b"sencrypt-verifier-v1";

/// The Argon2id output.  Only lives long enough to derive sub-keys.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Derive the AES-256-GCM key for the record set.
    pub fn derive_encryption_key(&self) -> Result<EncryptionKey> {
        hkdf_derive(&self.bytes, ENCRYPTION_KEY_INFO).map(EncryptionKey::new)
    }

    /// Compute the verification tag for this master key and `salt`.
    pub fn compute_verifier(&self, salt: &[u8]) -> Result<VerificationTag> {
        let mut verifier_key = hkdf_derive(&self.bytes, VERIFIER_KEY_INFO)?;

        let mac = Hmac::<Sha256>::new_from_slice(&verifier_key);
        verifier_key.zeroize();
        let mut mac = mac
            .map_err(|e| SencryptError::KeyDerivationFailed(format!("HMAC init failed: {e}")))?;

        mac.update(VERIFIER_DOMAIN);
        mac.update(salt);

        let mut tag = [0u8; KEY_LEN];
        tag.copy_from_slice(&mac.finalize().into_bytes());
        Ok(VerificationTag(tag))
    }
}

/// A 32-byte AES-256-GCM key that zeroes its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_LEN],
}

impl EncryptionKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to build the cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey([redacted])")
    }
}

/// Value stored in the vault header that lets a candidate password be
/// checked without keeping the password or key on disk.
#[derive(Clone)]
pub struct VerificationTag([u8; KEY_LEN]);

impl VerificationTag {
    /// Rebuild a tag from header bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
            SencryptError::CorruptVault(format!(
                "verification tag must be {KEY_LEN} bytes (got {})",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Constant-time equality, so comparison time leaks nothing about
    /// how many leading bytes matched.
    pub fn matches(&self, other: &VerificationTag) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl fmt::Debug for VerificationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationTag(..)")
    }
}

/// Everything one Argon2id run yields for a password.
pub struct DerivedKeys {
    pub encryption_key: EncryptionKey,
    pub verification_tag: VerificationTag,
}

/// Run Argon2id once and derive both the encryption key and the tag.
pub fn derive_keys(password: &[u8], salt: &[u8], params: &Argon2Params) -> Result<DerivedKeys> {
    let mut master_bytes = derive_master_key_with_params(password, salt, params)?;
    let master_key = MasterKey::new(master_bytes);
    master_bytes.zeroize();

    Ok(DerivedKeys {
        encryption_key: master_key.derive_encryption_key()?,
        verification_tag: master_key.compute_verifier(salt)?,
    })
}

/// Derive only the encryption key for `password`.
pub fn derive_key(password: &[u8], salt: &[u8], params: &Argon2Params) -> Result<EncryptionKey> {
    Ok(derive_keys(password, salt, params)?.encryption_key)
}

/// Derive only the verification tag for `password`.
pub fn compute_verifier(
    password: &[u8],
    salt: &[u8],
    params: &Argon2Params,
) -> Result<VerificationTag> {
    Ok(derive_keys(password, salt, params)?.verification_tag)
}

/// Run HKDF-SHA256 expand with the given `info`.
///
/// The master key already has high entropy (it came from Argon2id), so
/// no extract salt is used.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| SencryptError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}
