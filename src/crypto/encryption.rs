//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` draws a fresh random 12-byte nonce, so a nonce
//! is never reused under the same key.  The 16-byte auth tag is appended
//! to the ciphertext by the AEAD, and `decrypt` fails closed: any flipped
//! bit, wrong key or wrong associated data yields
//! `SencryptError::AuthenticationFailed` and no plaintext at all.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use super::keys::EncryptionKey;
use super::random;
use crate::errors::{SencryptError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Output of one encryption: the nonce and `ciphertext || tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

/// Encrypt `plaintext` under `key`, binding `aad` into the auth tag.
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8], aad: &[u8]) -> Result<Sealed> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| SencryptError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce: [u8; NONCE_LEN] = random::random_array()?;

    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| SencryptError::EncryptionFailed(format!("encryption error: {e}")))?;

    Ok(Sealed { nonce, ciphertext })
}

/// Decrypt and authenticate data produced by `encrypt`.
///
/// The plaintext is returned in a zeroizing buffer.
pub fn decrypt(
    key: &EncryptionKey,
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    // Anything shorter than a tag cannot be authentic.
    if ciphertext.len() < TAG_LEN {
        return Err(SencryptError::AuthenticationFailed);
    }

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| SencryptError::AuthenticationFailed)?;

    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| SencryptError::AuthenticationFailed)?;

    Ok(Zeroizing::new(plaintext))
}
