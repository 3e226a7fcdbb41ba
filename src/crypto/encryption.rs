//! Hybrid session key handling.
//!
//! File content is encrypted under a per-message content key. The key
//! is established by ML-KEM-768 encapsulation against the recipient's
//! encryption subkey: the encapsulation ciphertext travels in the
//! file header, the derived shared secret never leaves memory. The
//! content key is HKDF-SHA3-512 output over the shared secret and a
//! random per-file salt.

use crate::crypto::keys::{PrivateKey, PublicKey};
use crate::crypto::Passphrase;
use crate::error::{CryptError, Result};
use crate::validation::Validator;
use hkdf::Hkdf;
use pqcrypto_mlkem::mlkem768;
use pqcrypto_traits::kem::{Ciphertext, SharedSecret};
use sha3::Sha3_512;
use zeroize::{Zeroize, Zeroizing};

/// HKDF context string for content key derivation
const CONTENT_KEY_INFO: &[u8] = b"cryptedhype-v1 content key";

/// Size of the per-file HKDF salt
pub const KDF_SALT_SIZE: usize = 32;

/// A derived 256-bit content key, zeroized on drop.
pub struct ContentKey([u8; 32]);

impl ContentKey {
    /// Key bytes for cipher construction.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Drop for ContentKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ContentKey(..)")
    }
}

/// Encapsulate a fresh session secret to a recipient's subkey.
///
/// Returns the shared secret and the encapsulation ciphertext that
/// goes into the file header.
pub fn encapsulate_session(recipient_subkey: &PublicKey) -> Result<(Zeroizing<Vec<u8>>, Vec<u8>)> {
    if !recipient_subkey.can_encrypt() {
        return Err(CryptError::invalid_key(
            "Public key cannot be used for encryption",
        ));
    }

    let public_key = recipient_subkey.as_mlkem768()?;
    let (shared_secret, ciphertext) = mlkem768::encapsulate(&public_key);

    Ok((
        Zeroizing::new(shared_secret.as_bytes().to_vec()),
        ciphertext.as_bytes().to_vec(),
    ))
}

/// Recover the session secret from an encapsulated key.
///
/// ML-KEM decapsulation never reports failure: a wrong key or a
/// tampered encapsulation yields a uniformly random secret (implicit
/// rejection), which the first chunk's authentication tag then
/// rejects. Only a structurally invalid encapsulation fails here.
pub fn decapsulate_session(
    subkey_secret: &PrivateKey,
    passphrase: Option<&Passphrase>,
    encapsulated_key: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    if !subkey_secret.can_decrypt() {
        return Err(CryptError::invalid_key(
            "Private key cannot be used for decryption",
        ));
    }

    Validator::validate_encapsulated_key_size(encapsulated_key)?;

    let secret_key = subkey_secret.as_mlkem768(passphrase)?;

    let ciphertext = mlkem768::Ciphertext::from_bytes(encapsulated_key).map_err(|_| {
        CryptError::decryption(format!(
            "Encapsulated key has invalid length: {} bytes",
            encapsulated_key.len()
        ))
    })?;

    let shared_secret = mlkem768::decapsulate(&ciphertext, &secret_key);
    Ok(Zeroizing::new(shared_secret.as_bytes().to_vec()))
}

/// Derive the 256-bit content key from a session secret and the
/// per-file salt stored in the ciphertext header.
pub fn derive_content_key(shared_secret: &[u8], salt: &[u8; KDF_SALT_SIZE]) -> Result<ContentKey> {
    let hk = Hkdf::<Sha3_512>::new(Some(salt), shared_secret);

    let mut key = [0u8; 32];
    hk.expand(CONTENT_KEY_INFO, &mut key)
        .map_err(|_| CryptError::encoding("Content key derivation failed"))?;

    Ok(ContentKey(key))
}
