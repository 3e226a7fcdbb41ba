//! Basic CryptedHype usage example
//!
//! Generate a key pair, encrypt a file, decrypt it back.
//!
//! Run with: cargo run --example basic_usage

use cryptedhype::{decrypt_file, encrypt_file, generate_key_pair, Identity, Passphrase};
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("CryptedHype basic usage");
    println!("=======================");
    println!();

    // Generate an identity-bound key pair
    let identity = Identity::new("Alice", "alice@example.com");
    let passphrase = Passphrase::new("correct horse battery staple");
    let keys = generate_key_pair(&identity, &passphrase)?;

    println!("Public key (share this):");
    println!("{}", keys.public_key);

    // Encrypt a file for the public key
    let dir = tempfile::tempdir()?;
    let plain = dir.path().join("note.txt");
    let sealed = dir.path().join("note.txt.chyp");
    let opened = dir.path().join("note.out.txt");

    fs::write(&plain, b"Meet me at the old pier at midnight.")?;
    encrypt_file(&keys.public_key, &plain, &sealed)?;
    println!("Encrypted {} -> {}", plain.display(), sealed.display());

    // Decrypt with the private key and passphrase
    decrypt_file(&keys.private_key, &passphrase, &sealed, &opened)?;
    println!("Decrypted: {}", String::from_utf8_lossy(&fs::read(&opened)?));

    Ok(())
}
