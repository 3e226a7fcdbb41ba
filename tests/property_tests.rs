//! Property-style tests for CryptedHype
//!
//! Randomized round trips and corruption sweeps: the engine must
//! either return the exact original plaintext or a typed error,
//! never silently wrong bytes.

use cryptedhype::{
    armor::{decode, encode, ArmorKind},
    decrypt_message, encrypt_message, generate_key_pair, Identity, Passphrase,
};
use rand::{rngs::OsRng, Rng, RngCore};

/// Property: encrypt then decrypt returns the original message for
/// arbitrary sizes and contents
#[test]
fn property_message_roundtrip() {
    let mut rng = OsRng;
    let keys = generate_key_pair(&Identity::new("P", "p@example.com"), &Passphrase::new(""))
        .unwrap();

    for _ in 0..25 {
        let size = rng.gen_range(0..4096);
        let mut message = vec![0u8; size];
        rng.fill_bytes(&mut message);

        let armored = encrypt_message(&keys.public_key, &message).unwrap();
        let decrypted = decrypt_message(&keys.private_key, &Passphrase::new(""), &armored)
            .expect("Valid ciphertext must decrypt");

        assert_eq!(message, decrypted, "Roundtrip property violated");
    }
}

/// Property: armor decode(encode(x)) == x for arbitrary payloads
#[test]
fn property_armor_roundtrip() {
    let mut rng = OsRng;

    for _ in 0..100 {
        let size = rng.gen_range(0..2048);
        let mut payload = vec![0u8; size];
        rng.fill_bytes(&mut payload);

        for kind in [ArmorKind::PublicKey, ArmorKind::PrivateKey, ArmorKind::Message] {
            let armored = encode(&payload, kind);
            let decoded = decode(&armored).unwrap();
            assert_eq!(decoded.kind, kind);
            assert_eq!(decoded.data, payload);
        }
    }
}

/// Property: corrupting one armored character never yields different
/// plaintext - it either decodes to the same bytes (corruption in
/// insignificant whitespace) or errors
#[test]
fn property_armor_corruption_never_silent() {
    let mut rng = OsRng;
    let keys = generate_key_pair(&Identity::new("P", "p@example.com"), &Passphrase::new(""))
        .unwrap();

    let message = b"single source of truth";
    let armored = encrypt_message(&keys.public_key, message).unwrap();
    let bytes = armored.as_bytes();

    for _ in 0..150 {
        let position = rng.gen_range(0..bytes.len());
        let replacement = rng.gen_range(0x20u8..0x7F);

        let mut corrupted = bytes.to_vec();
        corrupted[position] = replacement;
        let corrupted = String::from_utf8(corrupted).unwrap();

        match decrypt_message(&keys.private_key, &Passphrase::new(""), &corrupted) {
            Ok(decrypted) => {
                assert_eq!(
                    decrypted, message,
                    "corruption at {} returned wrong plaintext",
                    position
                );
            }
            Err(_) => {}
        }
    }
}

/// Property: random input is never parsed as a valid key
#[test]
fn property_random_input_rejected_as_key() {
    let mut rng = OsRng;

    for _ in 0..100 {
        let size = rng.gen_range(0..512);
        let mut garbage = vec![0u8; size];
        rng.fill_bytes(&mut garbage);

        // As raw text
        let text = String::from_utf8_lossy(&garbage).to_string();
        assert!(encrypt_message(&text, b"data").is_err());

        // As a correctly armored block of garbage bytes
        let armored = encode(&garbage, ArmorKind::PublicKey);
        assert!(encrypt_message(&armored, b"data").is_err());
    }
}

/// Property: every generation draws fresh randomness
#[test]
fn property_generation_never_repeats() {
    let identity = Identity::new("Q", "q@example.com");
    let mut seen = Vec::new();

    for _ in 0..5 {
        let keys = generate_key_pair(&identity, &Passphrase::new("")).unwrap();
        let key_info = cryptedhype::inspect_key(&keys.public_key).unwrap();
        assert!(
            !seen.contains(&key_info.fingerprint),
            "fingerprint repeated across generations"
        );
        seen.push(key_info.fingerprint);
    }
}

/// Property: ciphertexts of the same message under the same key are
/// never equal (fresh session secret and salt per encryption)
#[test]
fn property_encryption_is_randomized() {
    let keys = generate_key_pair(&Identity::new("R", "r@example.com"), &Passphrase::new(""))
        .unwrap();

    let message = b"deterministic input";
    let a = encrypt_message(&keys.public_key, message).unwrap();
    let b = encrypt_message(&keys.public_key, message).unwrap();
    assert_ne!(a, b);
}
