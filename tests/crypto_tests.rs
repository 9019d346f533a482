//! Integration tests for key derivation, the AEAD layer and the
//! container's resistance to tampering.

use std::fs;

use sencrypt::crypto::{
    compute_verifier, decrypt, derive_key, derive_keys, encrypt, generate_salt, Argon2Params,
};
use sencrypt::errors::SencryptError;
use sencrypt::vault::format::{read_container, write_container};
use sencrypt::vault::{Account, AccountRecord, EncryptedContainer, VaultConfig, VaultController, VaultHeader};
use tempfile::TempDir;

fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

fn test_config(dir: &TempDir) -> VaultConfig {
    VaultConfig {
        argon2: fast_params(),
        ..VaultConfig::new(dir.path().join("vault"))
    }
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn derivation_is_deterministic() {
    let salt = generate_salt().unwrap();
    let a = derive_key(b"Tr0ub4dor", &salt, &fast_params()).unwrap();
    let b = derive_key(b"Tr0ub4dor", &salt, &fast_params()).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());

    let t1 = compute_verifier(b"Tr0ub4dor", &salt, &fast_params()).unwrap();
    let t2 = compute_verifier(b"Tr0ub4dor", &salt, &fast_params()).unwrap();
    assert!(t1.matches(&t2));
}

#[test]
fn different_password_or_salt_gives_different_keys() {
    let salt1 = generate_salt().unwrap();
    let salt2 = generate_salt().unwrap();
    assert_ne!(salt1, salt2);

    let base = derive_keys(b"Tr0ub4dor", &salt1, &fast_params()).unwrap();
    let other_pw = derive_keys(b"tr0ub4dor", &salt1, &fast_params()).unwrap();
    let other_salt = derive_keys(b"Tr0ub4dor", &salt2, &fast_params()).unwrap();

    assert_ne!(base.encryption_key.as_bytes(), other_pw.encryption_key.as_bytes());
    assert_ne!(base.encryption_key.as_bytes(), other_salt.encryption_key.as_bytes());
    assert!(!base.verification_tag.matches(&other_pw.verification_tag));
    assert!(!base.verification_tag.matches(&other_salt.verification_tag));
}

#[test]
fn verifier_is_not_the_encryption_key() {
    let salt = generate_salt().unwrap();
    let keys = derive_keys(b"Tr0ub4dor", &salt, &fast_params()).unwrap();
    assert_ne!(keys.encryption_key.as_bytes(), keys.verification_tag.as_bytes());
}

#[test]
fn weak_kdf_params_are_rejected() {
    let salt = generate_salt().unwrap();
    let weak = Argon2Params {
        memory_kib: 1_024,
        ..fast_params()
    };
    assert!(matches!(
        derive_key(b"Tr0ub4dor", &salt, &weak),
        Err(SencryptError::KeyDerivationFailed(_))
    ));
}

// ---------------------------------------------------------------------------
// AEAD
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_with_associated_data() {
    let salt = generate_salt().unwrap();
    let key = derive_key(b"Tr0ub4dor", &salt, &fast_params()).unwrap();

    let sealed = encrypt(&key, b"payload", b"header").unwrap();
    let opened = decrypt(&key, &sealed.nonce, &sealed.ciphertext, b"header").unwrap();
    assert_eq!(opened.as_slice(), b"payload");

    assert!(matches!(
        decrypt(&key, &sealed.nonce, &sealed.ciphertext, b"other header"),
        Err(SencryptError::AuthenticationFailed)
    ));
}

// ---------------------------------------------------------------------------
// Record-set round-trips through the controller
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_zero_and_one_records() {
    let dir = TempDir::new().unwrap();
    let controller = VaultController::open(test_config(&dir)).unwrap();
    controller.create_master_password("Tr0ub4dor").unwrap();
    controller.teardown();

    let controller = VaultController::open(test_config(&dir)).unwrap();
    assert!(controller.verify_master_password("Tr0ub4dor").unwrap());
    assert!(controller.get_all_accounts().unwrap().is_empty());

    let account = Account::new("example.com", "alice", "pw1");
    controller.create_account(&account).unwrap();
    controller.teardown();

    let controller = VaultController::open(test_config(&dir)).unwrap();
    assert!(controller.verify_master_password("Tr0ub4dor").unwrap());
    assert_eq!(controller.get_all_accounts().unwrap(), vec![account]);
}

#[test]
fn roundtrip_ten_thousand_records() {
    let dir = TempDir::new().unwrap();
    let controller = VaultController::open(test_config(&dir)).unwrap();
    controller.create_master_password("Tr0ub4dor").unwrap();
    let path = controller.container_path().to_path_buf();
    controller.teardown();

    // Write the large record set in one go rather than 10k mutations.
    let existing = read_container(&path).unwrap();
    let header: VaultHeader = existing.header.clone();
    let key = derive_key(b"Tr0ub4dor", &header.salt, &header.kdf).unwrap();
    let records: Vec<AccountRecord> = (0..10_000)
        .map(|i| AccountRecord::new(&Account::new(format!("site{i}.com"), format!("user{i}"), format!("pw{i}"))))
        .collect();
    let payload = serde_json::to_vec(&records).unwrap();
    let container = EncryptedContainer::seal(header, &key, &payload).unwrap();
    write_container(&path, &container).unwrap();

    let controller = VaultController::open(test_config(&dir)).unwrap();
    assert!(controller.verify_master_password("Tr0ub4dor").unwrap());
    let accounts = controller.get_all_accounts().unwrap();
    assert_eq!(accounts.len(), 10_000);
    assert_eq!(accounts[0], Account::new("site0.com", "user0", "pw0"));
    assert_eq!(accounts[9_999], Account::new("site9999.com", "user9999", "pw9999"));
}

// ---------------------------------------------------------------------------
// Tamper detection
// ---------------------------------------------------------------------------

/// Offset of the first ciphertext byte: prefix, header JSON, nonce.
fn ciphertext_offset(bytes: &[u8]) -> usize {
    let header_len = u32::from_le_bytes(bytes[5..9].try_into().unwrap()) as usize;
    9 + header_len + 12
}

#[test]
fn flipping_any_ciphertext_or_tag_byte_is_detected() {
    let dir = TempDir::new().unwrap();
    let controller = VaultController::open(test_config(&dir)).unwrap();
    controller.create_master_password("Tr0ub4dor").unwrap();
    controller
        .create_account(&Account::new("example.com", "alice", "pw1"))
        .unwrap();
    let path = controller.container_path().to_path_buf();
    controller.teardown();

    let original = fs::read(&path).unwrap();
    let start = ciphertext_offset(&original);

    // The payload is small, so every byte of ciphertext and tag is checked.
    for i in start..original.len() {
        let mut tampered = original.clone();
        tampered[i] ^= 0x01;
        fs::write(&path, &tampered).unwrap();

        let controller = VaultController::open(test_config(&dir)).unwrap();
        let result = controller.verify_master_password("Tr0ub4dor");
        assert!(
            matches!(result, Err(SencryptError::CorruptVault(_))),
            "byte {i} flip was not detected: {result:?}"
        );
    }
}

#[test]
fn flipping_a_nonce_byte_is_detected() {
    let dir = TempDir::new().unwrap();
    let controller = VaultController::open(test_config(&dir)).unwrap();
    controller.create_master_password("Tr0ub4dor").unwrap();
    let path = controller.container_path().to_path_buf();
    controller.teardown();

    let mut bytes = fs::read(&path).unwrap();
    let nonce_start = ciphertext_offset(&bytes) - 12;
    bytes[nonce_start] ^= 0x80;
    fs::write(&path, &bytes).unwrap();

    let controller = VaultController::open(test_config(&dir)).unwrap();
    assert!(matches!(
        controller.verify_master_password("Tr0ub4dor"),
        Err(SencryptError::CorruptVault(_))
    ));
}

#[test]
fn truncated_container_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let controller = VaultController::open(test_config(&dir)).unwrap();
    controller.create_master_password("Tr0ub4dor").unwrap();
    let path = controller.container_path().to_path_buf();
    controller.teardown();

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 20]).unwrap();

    let controller = VaultController::open(test_config(&dir)).unwrap();
    assert!(matches!(
        controller.verify_master_password("Tr0ub4dor"),
        Err(SencryptError::CorruptVault(_))
    ));
}
