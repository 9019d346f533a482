//! Binary container format and atomic persistence.
//!
//! A `vault.sncr` file has this layout:
//!
//! ```text
//! [SNCR: 4 bytes][version: 1 byte][header_len: 4 bytes LE][header JSON][nonce: 12 bytes][ciphertext + tag]
//! ```
//!
//! - **Magic** (`SNCR`): identifies the file as a Sencrypt vault.
//! - **Version**: format version (currently `1`).
//! - **Header length**: little-endian u32 telling us where the header
//!   JSON ends and the nonce begins.
//! - **Header JSON**: serialized `VaultHeader` (salt, KDF costs, verifier).
//! - **Nonce**: the AES-256-GCM nonce used for this write.
//! - **Ciphertext**: the encrypted record set with its 16-byte auth tag.
//!
//! The header bytes exactly as stored are the AEAD associated data, so the
//! header cannot be edited without the next decryption failing.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::encryption::{self, NONCE_LEN, TAG_LEN};
use crate::crypto::kdf::{Argon2Params, SALT_LEN};
use crate::crypto::keys::{EncryptionKey, VerificationTag, KEY_LEN};
use crate::errors::{SencryptError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"SNCR";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (header_len).
const PREFIX_LEN: usize = 9;

/// Headers are small; anything bigger is not one of ours.
const MAX_HEADER_LEN: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// VaultHeader
// ---------------------------------------------------------------------------

/// Plaintext metadata at the start of the container.  Not secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultHeader {
    /// Format version, mirrored from the binary prefix.
    pub version: u8,

    /// The salt used for Argon2id key derivation (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// Argon2id costs the vault was created with.
    pub kdf: Argon2Params,

    /// Verification tag for the master password (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub verifier: Vec<u8>,

    /// When the master password was set.
    pub created_at: DateTime<Utc>,
}

impl VaultHeader {
    /// Build a header for a freshly derived key set.
    pub fn new(salt: &[u8], kdf: Argon2Params, tag: &VerificationTag) -> Self {
        Self {
            version: CURRENT_VERSION,
            salt: salt.to_vec(),
            kdf,
            verifier: tag.as_bytes().to_vec(),
            created_at: Utc::now(),
        }
    }

    /// The stored verification tag.
    pub fn verification_tag(&self) -> Result<VerificationTag> {
        VerificationTag::from_slice(&self.verifier)
    }

    fn validate(&self) -> Result<()> {
        if self.version != CURRENT_VERSION {
            return Err(SencryptError::CorruptVault(format!(
                "header version {} does not match format version {CURRENT_VERSION}",
                self.version
            )));
        }
        if self.salt.len() != SALT_LEN {
            return Err(SencryptError::CorruptVault(format!(
                "salt must be {SALT_LEN} bytes (got {})",
                self.salt.len()
            )));
        }
        if self.verifier.len() != KEY_LEN {
            return Err(SencryptError::CorruptVault(format!(
                "verifier must be {KEY_LEN} bytes (got {})",
                self.verifier.len()
            )));
        }
        self.kdf
            .validate()
            .map_err(|e| SencryptError::CorruptVault(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// EncryptedContainer
// ---------------------------------------------------------------------------

/// One complete, self-contained snapshot of the vault.
#[derive(Debug, Clone)]
pub struct EncryptedContainer {
    pub header: VaultHeader,
    /// The header JSON exactly as stored (and authenticated).
    header_bytes: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext with the auth tag appended.
    pub ciphertext: Vec<u8>,
}

impl EncryptedContainer {
    /// Encrypt `plaintext` under `key` and wrap it with `header`.
    ///
    /// A fresh nonce is drawn on every call.
    pub fn seal(header: VaultHeader, key: &EncryptionKey, plaintext: &[u8]) -> Result<Self> {
        let header_bytes = serde_json::to_vec(&header)
            .map_err(|e| SencryptError::SerializationError(format!("header: {e}")))?;
        let sealed = encryption::encrypt(key, plaintext, &header_bytes)?;

        Ok(Self {
            header,
            header_bytes,
            nonce: sealed.nonce,
            ciphertext: sealed.ciphertext,
        })
    }

    /// Decrypt and authenticate the payload.
    ///
    /// Returns `AuthenticationFailed` on a wrong key or any tampering.
    pub fn open(&self, key: &EncryptionKey) -> Result<Zeroizing<Vec<u8>>> {
        encryption::decrypt(key, &self.nonce, &self.ciphertext, &self.header_bytes)
    }

    /// Serialize into the on-disk byte layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let header_len = u32::try_from(self.header_bytes.len()).map_err(|_| {
            SencryptError::SerializationError(format!(
                "header length {} exceeds u32::MAX",
                self.header_bytes.len()
            ))
        })?;

        let total = PREFIX_LEN + self.header_bytes.len() + NONCE_LEN + self.ciphertext.len();
        let mut buf = Vec::with_capacity(total);

        buf.extend_from_slice(MAGIC); // 4 bytes
        buf.push(CURRENT_VERSION); // 1 byte
        buf.extend_from_slice(&header_len.to_le_bytes()); // 4 bytes LE
        buf.extend_from_slice(&self.header_bytes); // header JSON
        buf.extend_from_slice(&self.nonce); // 12 bytes
        buf.extend_from_slice(&self.ciphertext); // ciphertext + tag

        Ok(buf)
    }

    /// Parse and structurally validate a container.
    ///
    /// Checks everything that can be checked without the key: magic,
    /// version, section sizes, header JSON and header field sizes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < PREFIX_LEN + NONCE_LEN + TAG_LEN {
            return Err(SencryptError::CorruptVault(
                "file too small to be a valid vault".into(),
            ));
        }

        // --- Parse the fixed-size prefix ---

        if &data[0..4] != MAGIC {
            return Err(SencryptError::CorruptVault(
                "missing SNCR magic bytes".into(),
            ));
        }

        let version = data[4];
        if version != CURRENT_VERSION {
            return Err(SencryptError::CorruptVault(format!(
                "unsupported version {version}, expected {CURRENT_VERSION}"
            )));
        }

        let header_len_u32 = u32::from_le_bytes(
            data[5..9]
                .try_into()
                .map_err(|_| SencryptError::CorruptVault("bad header length".into()))?,
        );
        let header_len = usize::try_from(header_len_u32)
            .ok()
            .filter(|len| *len <= MAX_HEADER_LEN)
            .ok_or_else(|| {
                SencryptError::CorruptVault(format!("header length {header_len_u32} is too large"))
            })?;

        let header_end = PREFIX_LEN + header_len;
        let nonce_end = header_end + NONCE_LEN;
        if nonce_end + TAG_LEN > data.len() {
            return Err(SencryptError::CorruptVault(
                "header length exceeds file size".into(),
            ));
        }

        // --- Split the variable-length sections ---

        let header_bytes = data[PREFIX_LEN..header_end].to_vec();
        let nonce: [u8; NONCE_LEN] = data[header_end..nonce_end]
            .try_into()
            .map_err(|_| SencryptError::CorruptVault("bad nonce".into()))?;
        let ciphertext = data[nonce_end..].to_vec();

        let header: VaultHeader = serde_json::from_slice(&header_bytes)
            .map_err(|e| SencryptError::CorruptVault(format!("header JSON: {e}")))?;
        header.validate()?;

        Ok(Self {
            header,
            header_bytes,
            nonce,
            ciphertext,
        })
    }
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Read and validate the container at `path`.
pub fn read_container(path: &Path) -> Result<EncryptedContainer> {
    if !path.exists() {
        return Err(SencryptError::NotInitialized(path.to_path_buf()));
    }
    let data = fs::read(path)?;
    let container = EncryptedContainer::from_bytes(&data)?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "read vault container");
    Ok(container)
}

/// Write `container` to `path`, replacing any previous one atomically.
pub fn write_container(path: &Path, container: &EncryptedContainer) -> Result<()> {
    let bytes = container.to_bytes()?;
    atomic_write(path, &bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote vault container");
    Ok(())
}

/// Write `data` to `path` **atomically**.
///
/// 1. Write to a temp file in the same directory.
/// 2. Flush it to disk.
/// 3. Rename the temp file over the target path.
///
/// The rename ensures readers never see a half-written file, and the
/// previous file survives untouched if anything before it fails.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let result = write_synced(&tmp_path, data).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    // On Unix, restrict permissions to owner-only read/write.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.sync_all()
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn header() -> VaultHeader {
        let tag = VerificationTag::from_slice(&[9u8; KEY_LEN]).unwrap();
        VaultHeader::new(
            &[3u8; SALT_LEN],
            Argon2Params {
                memory_kib: 8_192,
                iterations: 1,
                parallelism: 1,
            },
            &tag,
        )
    }

    fn key() -> EncryptionKey {
        EncryptionKey::new([0x11; 32])
    }

    #[test]
    fn bytes_roundtrip_preserves_payload() {
        let container = EncryptedContainer::seal(header(), &key(), b"[]").unwrap();
        let bytes = container.to_bytes().unwrap();
        let parsed = EncryptedContainer::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.open(&key()).unwrap().as_slice(), b"[]");
        assert_eq!(parsed.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = EncryptedContainer::seal(header(), &key(), b"x")
            .unwrap()
            .to_bytes()
            .unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            EncryptedContainer::from_bytes(&bytes),
            Err(SencryptError::CorruptVault(_))
        ));
    }

    #[test]
    fn rejects_truncated_file() {
        let bytes = EncryptedContainer::seal(header(), &key(), b"payload")
            .unwrap()
            .to_bytes()
            .unwrap();
        assert!(EncryptedContainer::from_bytes(&bytes[..20]).is_err());
        assert!(EncryptedContainer::from_bytes(&[]).is_err());
    }

    #[test]
    fn rejects_oversized_header_length() {
        let mut bytes = EncryptedContainer::seal(header(), &key(), b"x")
            .unwrap()
            .to_bytes()
            .unwrap();
        bytes[5..9].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(EncryptedContainer::from_bytes(&bytes).is_err());
    }

    #[test]
    fn header_tamper_breaks_authentication() {
        let container = EncryptedContainer::seal(header(), &key(), b"secret").unwrap();
        let mut bytes = container.to_bytes().unwrap();
        // Change the created_at year inside the header JSON, keeping it parseable.
        let text = String::from_utf8_lossy(&bytes[PREFIX_LEN..]).into_owned();
        let pos = text.find("\"created_at\":\"").unwrap() + PREFIX_LEN + 14;
        bytes[pos] = if bytes[pos] == b'2' { b'1' } else { b'2' };
        let parsed = EncryptedContainer::from_bytes(&bytes).unwrap();
        assert!(matches!(
            parsed.open(&key()),
            Err(SencryptError::AuthenticationFailed)
        ));
    }

    #[test]
    fn atomic_write_replaces_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.sncr");
        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!dir.path().join(".vault.sncr.tmp").exists());
    }

    #[test]
    fn read_missing_container_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        let result = read_container(&dir.path().join("vault.sncr"));
        assert!(matches!(result, Err(SencryptError::NotInitialized(_))));
    }

    #[cfg(unix)]
    #[test]
    fn container_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.sncr");
        let container = EncryptedContainer::seal(header(), &key(), b"[]").unwrap();
        write_container(&path, &container).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
