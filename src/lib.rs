//! # CryptedHype - Hybrid Post-Quantum File Encryption
//!
//! A file encryption engine combining post-quantum key encapsulation
//! with chunked authenticated symmetric encryption, exchanging all key
//! material as PGP-style ASCII armored text.
//!
//! ## Features
//!
//! - **Hybrid Encryption**: ML-KEM-768 wraps a per-file session secret;
//!   AES-256-GCM encrypts the content in authenticated chunks
//! - **Identity-Bound Keys**: every key pair carries a user id,
//!   self-certified by an ML-DSA-65 primary key
//! - **Passphrase Protection**: private keys are sealed under an
//!   Argon2id-derived key; an empty passphrase is an explicit,
//!   documented weak mode
//! - **Streaming**: files of any size are processed chunk by chunk,
//!   with memory bounded by the chunk size
//!
//! ## Key Generation
//!
//! ```rust,no_run
//! use cryptedhype::{generate_key_pair, Identity, Passphrase};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let identity = Identity::new("Alice", "alice@example.com");
//! let keys = generate_key_pair(&identity, &Passphrase::new("s3cr3t"))?;
//! println!("{}", keys.public_key);
//! # Ok(())
//! # }
//! ```
//!
//! ## File Encryption and Decryption
//!
//! ```rust,no_run
//! use cryptedhype::{decrypt_file, encrypt_file, generate_key_pair, Identity, Passphrase};
//! use std::path::Path;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let keys = generate_key_pair(&Identity::new("Alice", "alice@example.com"),
//!                              &Passphrase::new("s3cr3t"))?;
//! encrypt_file(&keys.public_key, Path::new("report.pdf"), Path::new("report.pdf.chyp"))?;
//! decrypt_file(&keys.private_key, &Passphrase::new("s3cr3t"),
//!              Path::new("report.pdf.chyp"), Path::new("report.pdf"))?;
//! # Ok(())
//! # }
//! ```

pub mod armor;
pub mod cli;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod packet;
pub mod stream;
pub mod validation;

pub use crypto::{Identity, Passphrase};
pub use engine::{
    decrypt_file, decrypt_message, encrypt_file, encrypt_message, generate_key_pair, inspect_key,
    ArmoredKeyPair, KeyInfo,
};
pub use error::{CryptError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
