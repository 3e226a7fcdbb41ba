//! Passphrase-based private key protection using Argon2id and AES-GCM.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::secure_random_bytes;
use crate::error::{CryptError, Result};

/// Salt size for Argon2 (128 bits)
const SALT_SIZE: usize = 16;

/// AES-GCM nonce size
const NONCE_SIZE: usize = 12;

/// Parameters for Argon2id passphrase hashing
const ARGON2_PARAMS: argon2::Params = match argon2::Params::new(
    19 * 1024, // 19 MiB memory cost
    2,         // 2 iterations
    1,         // 1 thread (single-threaded)
    Some(32),  // 32-byte output length
) {
    Ok(params) => params,
    Err(_) => panic!("Invalid Argon2 parameters"),
};

/// An ephemeral passphrase, zeroized on drop.
///
/// An empty passphrase is representable: key generation treats it as
/// the explicit weak mode in which the private key is stored without
/// at-rest protection.
#[derive(Clone)]
pub struct Passphrase(String);

impl Passphrase {
    /// Create a new passphrase from a string.
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self(passphrase.into())
    }

    /// Passphrase bytes for key derivation.
    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Whether the passphrase is empty (weak mode).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Constant-time equality check against another passphrase.
    pub fn matches(&self, other: &Passphrase) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Drop for Passphrase {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Passphrase(..)")
    }
}

/// Passphrase-encrypted private key material.
///
/// The Argon2id salt travels with the ciphertext, so the same
/// passphrase re-derives the same unwrap key on any machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedPrivateKey {
    /// Argon2 salt for passphrase derivation
    salt: [u8; SALT_SIZE],
    /// AES-GCM nonce
    nonce: [u8; NONCE_SIZE],
    /// Encrypted key material (includes the authentication tag)
    ciphertext: Vec<u8>,
}

impl EncryptedPrivateKey {
    /// Encrypt private key material with a passphrase.
    pub fn encrypt(private_key_data: &[u8], passphrase: &Passphrase) -> Result<Self> {
        if passphrase.is_empty() {
            return Err(CryptError::validation(
                "Refusing to passphrase-encrypt with an empty passphrase",
            ));
        }

        let mut salt = [0u8; SALT_SIZE];
        secure_random_bytes(&mut salt)?;

        let derived_key = derive_key_from_passphrase(passphrase, &salt)?;
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(derived_key.as_slice()));

        let mut nonce = [0u8; NONCE_SIZE];
        secure_random_bytes(&mut nonce)?;

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), private_key_data)
            .map_err(|_| CryptError::encoding("Failed to seal private key material"))?;

        Ok(Self {
            salt,
            nonce,
            ciphertext,
        })
    }

    /// Decrypt private key material with a passphrase.
    ///
    /// An authentication failure means the passphrase is wrong (or the
    /// blob was tampered with after armor checks passed) and maps to
    /// [`CryptError::WrongPassphrase`]. The AES-GCM tag check is
    /// constant-time in the underlying implementation.
    pub fn decrypt(&self, passphrase: &Passphrase) -> Result<Zeroizing<Vec<u8>>> {
        let derived_key = derive_key_from_passphrase(passphrase, &self.salt)?;
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(derived_key.as_slice()));

        let plaintext = cipher
            .decrypt(Nonce::from_slice(&self.nonce), self.ciphertext.as_ref())
            .map_err(|_| CryptError::WrongPassphrase)?;

        Ok(Zeroizing::new(plaintext))
    }

    /// Size of the encrypted material in bytes.
    pub fn encrypted_size(&self) -> usize {
        self.ciphertext.len()
    }
}

/// Derive a 256-bit unwrap key from a passphrase using Argon2id.
fn derive_key_from_passphrase(
    passphrase: &Passphrase,
    salt: &[u8; SALT_SIZE],
) -> Result<Zeroizing<[u8; 32]>> {
    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ARGON2_PARAMS,
    );

    let mut key = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, key.as_mut_slice())
        .map_err(|e| CryptError::encoding(format!("Passphrase derivation failed: {}", e)))?;

    Ok(key)
}
