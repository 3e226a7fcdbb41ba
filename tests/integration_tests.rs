//! Integration tests for CryptedHype
//!
//! These tests verify end-to-end functionality across all modules:
//! key generation, armored key exchange, and file encryption and
//! decryption through the engine's public boundary.

use cryptedhype::{
    armor::{decode, ArmorKind},
    decrypt_file, encrypt_file, generate_key_pair, CryptError, Identity, Passphrase,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CHUNK: usize = 64 * 1024;

fn write_source(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write source file");
    path
}

/// Test complete end-to-end file encryption and decryption
#[test]
fn test_end_to_end_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let keys = generate_key_pair(
        &Identity::new("Bob", "bob@example.com"),
        &Passphrase::new("hunter2"),
    )
    .expect("Failed to generate key pair");

    let content = b"This is a secret report from Alice to Bob.";
    let source = write_source(&dir, "report.txt", content);
    let encrypted = dir.path().join("report.txt.chyp");
    let decrypted = dir.path().join("report.out.txt");

    encrypt_file(&keys.public_key, &source, &encrypted).expect("Failed to encrypt file");
    assert!(encrypted.exists());
    assert_ne!(fs::read(&encrypted).unwrap(), content);

    decrypt_file(
        &keys.private_key,
        &Passphrase::new("hunter2"),
        &encrypted,
        &decrypted,
    )
    .expect("Failed to decrypt file");

    assert_eq!(fs::read(&decrypted).unwrap(), content);
}

/// Round trips across the interesting size boundaries: empty, one
/// byte, around the chunk boundary, and several chunks
#[test]
fn test_file_roundtrip_size_sweep() {
    let dir = TempDir::new().unwrap();
    let keys = generate_key_pair(
        &Identity::new("Sweep", "sweep@example.com"),
        &Passphrase::new(""),
    )
    .unwrap();

    for size in [0, 1, CHUNK - 1, CHUNK, CHUNK + 1, 3 * CHUNK + 17] {
        let content: Vec<u8> = (0..size).map(|i| (i * 31 % 256) as u8).collect();
        let source = write_source(&dir, &format!("in-{}", size), &content);
        let encrypted = dir.path().join(format!("enc-{}", size));
        let decrypted = dir.path().join(format!("dec-{}", size));

        encrypt_file(&keys.public_key, &source, &encrypted).unwrap();
        decrypt_file(&keys.private_key, &Passphrase::new(""), &encrypted, &decrypted).unwrap();

        assert_eq!(fs::read(&decrypted).unwrap(), content, "size {}", size);
    }
}

/// The reference scenario: generate for Alice, encrypt a 10 MB file,
/// decrypt with the right and the wrong passphrase
#[test]
fn test_alice_scenario() {
    let dir = TempDir::new().unwrap();
    let keys = generate_key_pair(
        &Identity::new("Alice", "alice@example.com"),
        &Passphrase::new("s3cr3t"),
    )
    .unwrap();

    let content: Vec<u8> = (0..10 * 1024 * 1024).map(|i| (i % 253) as u8).collect();
    let source = write_source(&dir, "big.bin", &content);
    let encrypted = dir.path().join("big.bin.chyp");
    let decrypted = dir.path().join("big.bin.out");

    encrypt_file(&keys.public_key, &source, &encrypted).unwrap();

    decrypt_file(
        &keys.private_key,
        &Passphrase::new("s3cr3t"),
        &encrypted,
        &decrypted,
    )
    .unwrap();
    assert_eq!(fs::read(&decrypted).unwrap(), content);

    let failed = dir.path().join("never-written.out");
    let result = decrypt_file(&keys.private_key, &Passphrase::new("wrong"), &encrypted, &failed);
    assert!(matches!(result, Err(CryptError::WrongPassphrase)));
    assert!(!failed.exists());
}

/// Armored key blocks survive the text round trip byte for byte
#[test]
fn test_armored_keys_roundtrip() {
    let keys = generate_key_pair(
        &Identity::new("Carol", "carol@example.com"),
        &Passphrase::new("pw"),
    )
    .unwrap();

    let public = decode(&keys.public_key).expect("Failed to decode public armor");
    assert_eq!(public.kind, ArmorKind::PublicKey);

    let private = decode(&keys.private_key).expect("Failed to decode private armor");
    assert_eq!(private.kind, ArmorKind::PrivateKey);

    // Decoding is strict, so re-encoding the payload reproduces it
    let re_encoded = cryptedhype::armor::encode(&public.data, ArmorKind::PublicKey);
    assert_eq!(decode(&re_encoded).unwrap().data, public.data);
}

/// Two generations with identical inputs never produce the same keys
#[test]
fn test_generation_independence() {
    let identity = Identity::new("Same", "same@example.com");
    let passphrase = Passphrase::new("same");

    let a = generate_key_pair(&identity, &passphrase).unwrap();
    let b = generate_key_pair(&identity, &passphrase).unwrap();

    assert_ne!(a.public_key, b.public_key);
    assert_ne!(a.private_key, b.private_key);
}

/// Decrypting with a key pair other than the recipient's fails
#[test]
fn test_wrong_recipient_key_fails() {
    let dir = TempDir::new().unwrap();
    let alice = generate_key_pair(&Identity::new("Alice", "a@example.com"), &Passphrase::new(""))
        .unwrap();
    let mallory =
        generate_key_pair(&Identity::new("Mallory", "m@example.com"), &Passphrase::new(""))
            .unwrap();

    let source = write_source(&dir, "secret.txt", b"for alice only");
    let encrypted = dir.path().join("secret.chyp");
    let out = dir.path().join("secret.out");

    encrypt_file(&alice.public_key, &source, &encrypted).unwrap();

    let result = decrypt_file(&mallory.private_key, &Passphrase::new(""), &encrypted, &out);
    assert!(matches!(result, Err(CryptError::Decryption(_))));
    assert!(!out.exists());
}

/// Missing source files surface as SourceNotFound
#[test]
fn test_missing_source_file() {
    let dir = TempDir::new().unwrap();
    let keys = generate_key_pair(&Identity::new("A", "a@example.com"), &Passphrase::new(""))
        .unwrap();

    let missing = dir.path().join("does-not-exist");
    let out = dir.path().join("out");

    let result = encrypt_file(&keys.public_key, &missing, &out);
    assert!(matches!(result, Err(CryptError::SourceNotFound(_))));

    let result = decrypt_file(&keys.private_key, &Passphrase::new(""), &missing, &out);
    assert!(matches!(result, Err(CryptError::SourceNotFound(_))));
}

/// Unwritable destinations surface as DestinationWrite and leave
/// nothing behind
#[test]
fn test_unwritable_destination() {
    let dir = TempDir::new().unwrap();
    let keys = generate_key_pair(&Identity::new("A", "a@example.com"), &Passphrase::new(""))
        .unwrap();

    let source = write_source(&dir, "in.txt", b"content");
    let bad_dest = dir.path().join("no-such-dir").join("out.chyp");

    let result = encrypt_file(&keys.public_key, &source, &bad_dest);
    assert!(matches!(result, Err(CryptError::DestinationWrite(_))));
    assert!(!bad_dest.exists());
}

/// Malformed armored key text is InvalidKey at the engine boundary
#[test]
fn test_malformed_key_text() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "in.txt", b"content");
    let out = dir.path().join("out");

    let result = encrypt_file("not an armored key", &source, &out);
    assert!(matches!(result, Err(CryptError::InvalidKey(_))));

    let keys = generate_key_pair(&Identity::new("A", "a@example.com"), &Passphrase::new(""))
        .unwrap();

    // A public key where a private key is expected is also InvalidKey
    let result = decrypt_file(&keys.public_key, &Passphrase::new(""), &source, &out);
    assert!(matches!(result, Err(CryptError::InvalidKey(_))));
}
