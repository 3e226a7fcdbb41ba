//! Cryptographic primitives for the CryptedHype engine.
//!
//! - **ML-KEM-768**: key encapsulation for hybrid file encryption
//! - **ML-DSA-65**: detached signatures for key self-certification
//! - **AES-256-GCM**: authenticated symmetric encryption
//! - **Argon2id**: passphrase-based key derivation
//! - **SHA3**: hashing, fingerprints, key ids

use crate::error::{CryptError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

pub mod encryption;
pub mod keys;
pub mod password;
pub mod signature;

pub use encryption::{decapsulate_session, derive_content_key, encapsulate_session, ContentKey};
pub use keys::{Identity, KeyPair, PrivateKey, PublicKey, PublicKeyBlock, SecretKeyBlock};
pub use password::{EncryptedPrivateKey, Passphrase};
pub use signature::{sign_bytes, verify_bytes, Signature};

/// Algorithm identifiers carried in serialized key material and
/// ciphertext headers (PGP experimental id range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// ML-KEM-768 for key encapsulation (NIST FIPS 203)
    Mlkem768 = 100,
    /// ML-DSA-65 for digital signatures (NIST FIPS 204)
    Mldsa65 = 101,
    /// AES-256-GCM for symmetric encryption
    Aes256Gcm = 102,
    /// SHA3-256 for hashing
    Sha3_256 = 103,
}

impl Algorithm {
    /// Returns the algorithm name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Mlkem768 => "ML-KEM-768",
            Algorithm::Mldsa65 => "ML-DSA-65",
            Algorithm::Aes256Gcm => "AES-256-GCM",
            Algorithm::Sha3_256 => "SHA3-256",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Key usage flags indicating how a key may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyUsage {
    /// Key may be used for encryption
    pub encrypt: bool,
    /// Key may be used for digital signatures
    pub sign: bool,
    /// Key may be used to certify other keys
    pub certify: bool,
}

impl KeyUsage {
    /// Usage for an encryption subkey.
    pub fn encrypt_only() -> Self {
        Self {
            encrypt: true,
            sign: false,
            certify: false,
        }
    }

    /// Usage for a primary certification key.
    pub fn certify_and_sign() -> Self {
        Self {
            encrypt: false,
            sign: true,
            certify: true,
        }
    }
}

/// Key metadata carried alongside raw key material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMetadata {
    /// Key creation time (Unix timestamp)
    pub created: u64,
    /// Key usage permissions
    pub usage: KeyUsage,
    /// Key algorithm
    pub algorithm: Algorithm,
    /// Unique key identifier derived from the key material
    pub key_id: u64,
}

impl KeyMetadata {
    /// Creates new key metadata with the specified parameters.
    pub fn new(algorithm: Algorithm, usage: KeyUsage, key_id: u64, created: u64) -> Self {
        Self {
            created,
            usage,
            algorithm,
            key_id,
        }
    }
}

/// Returns the current Unix timestamp in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Cryptographic hash using SHA3-256.
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Fill a buffer from the OS random source.
///
/// Entropy failure is fatal and surfaces as
/// [`CryptError::RandomSource`]; no partial randomness is ever used.
pub fn secure_random_bytes(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CryptError::random(format!("OS entropy source unavailable: {}", e)))
}

/// Derive a key id from key material and metadata.
///
/// Key ids are the last 8 bytes of a SHA3-256 hash over the algorithm
/// id, creation time, and key material, as PGP derives ids from the
/// key fingerprint rather than randomly.
pub fn generate_key_id(key_material: &[u8], algorithm: Algorithm, created: u64) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update((algorithm as u8).to_be_bytes());
    hasher.update(created.to_be_bytes());
    hasher.update(key_material);
    let hash = hasher.finalize();

    let mut key_id_bytes = [0u8; 8];
    key_id_bytes.copy_from_slice(&hash[24..32]);
    u64::from_be_bytes(key_id_bytes)
}

/// Constant-time comparison of key ids.
pub fn key_ids_equal(a: u64, b: u64) -> bool {
    a.to_be_bytes().ct_eq(&b.to_be_bytes()).into()
}
