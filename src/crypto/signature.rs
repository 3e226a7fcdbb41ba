//! ML-DSA-65 detached signatures.
//!
//! Signatures are used internally for key self-certification: the
//! primary key signs the binding between a user id and the key
//! material it vouches for. Messages are hashed with SHA3-256 before
//! signing.

use crate::crypto::keys::{PrivateKey, PublicKey};
use crate::crypto::{hash_data, unix_now, Algorithm, Passphrase};
use crate::error::{CryptError, Result};
use pqcrypto_mldsa::mldsa65;
use pqcrypto_traits::sign::DetachedSignature;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A detached digital signature.
#[derive(Clone, Serialize, Deserialize)]
pub struct Signature {
    /// The signature algorithm used
    pub algorithm: Algorithm,
    /// The key id that created this signature
    pub key_id: u64,
    /// The signature bytes
    pub signature_bytes: Vec<u8>,
    /// Creation time (Unix timestamp)
    pub created: u64,
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("algorithm", &self.algorithm)
            .field("key_id", &format!("{:016X}", self.key_id))
            .field("signature_size", &self.signature_bytes.len())
            .field("created", &self.created)
            .finish()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signature({}, Key: {:016X}, {} bytes)",
            self.algorithm,
            self.key_id,
            self.signature_bytes.len()
        )
    }
}

/// Sign a byte string with an ML-DSA-65 private key.
///
/// For passphrase-protected keys the passphrase unwraps the secret
/// material for the duration of this call only.
pub fn sign_bytes(
    private_key: &PrivateKey,
    message: &[u8],
    passphrase: Option<&Passphrase>,
) -> Result<Signature> {
    if !private_key.can_sign() {
        return Err(CryptError::invalid_key(
            "Private key cannot be used for signing",
        ));
    }

    let secret_key = private_key.as_mldsa65(passphrase)?;

    let message_hash = hash_data(message);
    let signature_bytes = mldsa65::detached_sign(&message_hash, &secret_key);

    Ok(Signature {
        algorithm: Algorithm::Mldsa65,
        key_id: private_key.key_id(),
        signature_bytes: signature_bytes.as_bytes().to_vec(),
        created: unix_now(),
    })
}

/// Verify a detached signature over a byte string.
pub fn verify_bytes(public_key: &PublicKey, message: &[u8], signature: &Signature) -> Result<()> {
    if !public_key.can_verify() {
        return Err(CryptError::invalid_key(
            "Public key cannot be used for verification",
        ));
    }

    if signature.algorithm != Algorithm::Mldsa65 {
        return Err(CryptError::invalid_key(
            "Only ML-DSA-65 signatures are supported",
        ));
    }

    if !crate::crypto::key_ids_equal(public_key.key_id(), signature.key_id) {
        return Err(CryptError::invalid_key(
            "Key id does not match signature key id",
        ));
    }

    let public_key = public_key.as_mldsa65()?;

    let detached_signature = mldsa65::DetachedSignature::from_bytes(&signature.signature_bytes)
        .map_err(|_| CryptError::invalid_key("Failed to reconstruct ML-DSA-65 signature"))?;

    let message_hash = hash_data(message);

    mldsa65::verify_detached_signature(&detached_signature, &message_hash, &public_key)
        .map_err(|_| CryptError::invalid_key("Signature verification failed"))
}
