//! Key generation and key material handling.
//!
//! A generated key pair is an OpenPGP-style bundle: a primary
//! ML-DSA-65 certification key, an ML-KEM-768 encryption subkey, and
//! a user id, bound together by a self-signature from the primary
//! key. The bundle is what travels inside armored key blocks; the
//! self-signature is re-verified every time a block is decoded.

use crate::crypto::password::{EncryptedPrivateKey, Passphrase};
use crate::crypto::signature::{sign_bytes, verify_bytes, Signature};
use crate::crypto::{
    generate_key_id, hash_data, key_ids_equal, unix_now, Algorithm, KeyMetadata, KeyUsage,
};
use crate::error::{CryptError, Result};
use crate::validation::Validator;
use pqcrypto_mldsa::mldsa65;
use pqcrypto_mlkem::mlkem768;
use pqcrypto_traits::kem::{PublicKey as KemPublicKey, SecretKey as KemSecretKey};
use pqcrypto_traits::sign::{PublicKey as SignPublicKey, SecretKey as SignSecretKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// Serialization version of armored key blocks
pub const KEY_BLOCK_VERSION: u8 = 1;

/// The identity a key pair is issued for.
///
/// Both fields are free-form and may be empty; they are only embedded
/// in the key's user id for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}

impl Identity {
    /// Creates a new identity.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Renders the OpenPGP-style user id, `Name <email>`.
    pub fn user_id(&self) -> String {
        match (self.name.is_empty(), self.email.is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.name.clone(),
            (true, false) => format!("<{}>", self.email),
            (false, false) => format!("{} <{}>", self.name, self.email),
        }
    }
}

/// A public key: raw algorithm-specific material plus metadata.
#[derive(Clone, Serialize, Deserialize)]
pub struct PublicKey {
    key_bytes: Vec<u8>,
    metadata: KeyMetadata,
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("algorithm", &self.metadata.algorithm)
            .field("key_id", &format!("{:016X}", self.metadata.key_id))
            .field("key_size", &self.key_bytes.len())
            .finish()
    }
}

/// Storage format for private key material.
#[derive(Clone, Serialize, Deserialize)]
pub enum PrivateKeyStorage {
    /// Cleartext key material (weak mode: empty passphrase at generation)
    Unencrypted(Vec<u8>),
    /// Passphrase-encrypted key material
    Encrypted(EncryptedPrivateKey),
}

/// A private key: encrypted-or-not material plus metadata.
#[derive(Clone, Serialize, Deserialize)]
pub struct PrivateKey {
    storage: PrivateKeyStorage,
    metadata: KeyMetadata,
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (is_encrypted, key_size) = match &self.storage {
            PrivateKeyStorage::Unencrypted(bytes) => (false, bytes.len()),
            PrivateKeyStorage::Encrypted(enc) => (true, enc.encrypted_size()),
        };
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.metadata.algorithm)
            .field("key_id", &format!("{:016X}", self.metadata.key_id))
            .field("is_encrypted", &is_encrypted)
            .field("key_size", &key_size)
            .finish()
    }
}

impl PublicKey {
    /// Wraps an ML-KEM-768 public key.
    pub fn new_mlkem768(key: &mlkem768::PublicKey, key_id: u64, created: u64) -> Self {
        Self {
            key_bytes: KemPublicKey::as_bytes(key).to_vec(),
            metadata: KeyMetadata::new(
                Algorithm::Mlkem768,
                KeyUsage::encrypt_only(),
                key_id,
                created,
            ),
        }
    }

    /// Wraps an ML-DSA-65 public key.
    pub fn new_mldsa65(key: &mldsa65::PublicKey, key_id: u64, created: u64) -> Self {
        Self {
            key_bytes: SignPublicKey::as_bytes(key).to_vec(),
            metadata: KeyMetadata::new(
                Algorithm::Mldsa65,
                KeyUsage::certify_and_sign(),
                key_id,
                created,
            ),
        }
    }

    /// Returns the key's metadata.
    pub fn metadata(&self) -> &KeyMetadata {
        &self.metadata
    }

    /// Returns the key's unique identifier.
    pub fn key_id(&self) -> u64 {
        self.metadata.key_id
    }

    /// Returns the algorithm used by this key.
    pub fn algorithm(&self) -> Algorithm {
        self.metadata.algorithm
    }

    /// Checks if this key is valid for encryption.
    pub fn can_encrypt(&self) -> bool {
        self.metadata.usage.encrypt && self.metadata.algorithm == Algorithm::Mlkem768
    }

    /// Checks if this key is valid for signature verification.
    pub fn can_verify(&self) -> bool {
        self.metadata.algorithm == Algorithm::Mldsa65
    }

    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key_bytes
    }

    /// Computes the SHA3-256 fingerprint of this key.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut data = Vec::with_capacity(self.key_bytes.len() + 1);
        data.push(self.metadata.algorithm as u8);
        data.extend_from_slice(&self.key_bytes);
        hash_data(&data)
    }

    /// Reconstructs the ML-KEM-768 public key.
    pub fn as_mlkem768(&self) -> Result<mlkem768::PublicKey> {
        if self.metadata.algorithm != Algorithm::Mlkem768 {
            return Err(CryptError::invalid_key("Key is not an ML-KEM-768 key"));
        }

        KemPublicKey::from_bytes(&self.key_bytes)
            .map_err(|_| CryptError::invalid_key("Failed to reconstruct ML-KEM-768 public key"))
    }

    /// Reconstructs the ML-DSA-65 public key.
    pub fn as_mldsa65(&self) -> Result<mldsa65::PublicKey> {
        if self.metadata.algorithm != Algorithm::Mldsa65 {
            return Err(CryptError::invalid_key("Key is not an ML-DSA-65 key"));
        }

        SignPublicKey::from_bytes(&self.key_bytes)
            .map_err(|_| CryptError::invalid_key("Failed to reconstruct ML-DSA-65 public key"))
    }
}

impl PrivateKey {
    /// Wraps an ML-KEM-768 secret key, initially unencrypted.
    pub fn new_mlkem768(key: &mlkem768::SecretKey, key_id: u64, created: u64) -> Self {
        Self {
            storage: PrivateKeyStorage::Unencrypted(KemSecretKey::as_bytes(key).to_vec()),
            metadata: KeyMetadata::new(
                Algorithm::Mlkem768,
                KeyUsage::encrypt_only(),
                key_id,
                created,
            ),
        }
    }

    /// Wraps an ML-DSA-65 secret key, initially unencrypted.
    pub fn new_mldsa65(key: &mldsa65::SecretKey, key_id: u64, created: u64) -> Self {
        Self {
            storage: PrivateKeyStorage::Unencrypted(SignSecretKey::as_bytes(key).to_vec()),
            metadata: KeyMetadata::new(
                Algorithm::Mldsa65,
                KeyUsage::certify_and_sign(),
                key_id,
                created,
            ),
        }
    }

    /// Encrypts the key material under a passphrase-derived key.
    pub fn protect_with(&mut self, passphrase: &Passphrase) -> Result<()> {
        let key_bytes = match &self.storage {
            PrivateKeyStorage::Unencrypted(bytes) => bytes.clone(),
            PrivateKeyStorage::Encrypted(_) => {
                return Err(CryptError::invalid_key("Private key is already encrypted"));
            }
        };

        let encrypted = EncryptedPrivateKey::encrypt(&key_bytes, passphrase)?;
        self.storage = PrivateKeyStorage::Encrypted(encrypted);
        Ok(())
    }

    /// Returns true if the key material is passphrase-encrypted.
    pub fn is_encrypted(&self) -> bool {
        matches!(self.storage, PrivateKeyStorage::Encrypted(_))
    }

    /// Returns the key's metadata.
    pub fn metadata(&self) -> &KeyMetadata {
        &self.metadata
    }

    /// Returns the key's unique identifier.
    pub fn key_id(&self) -> u64 {
        self.metadata.key_id
    }

    /// Returns the algorithm used by this key.
    pub fn algorithm(&self) -> Algorithm {
        self.metadata.algorithm
    }

    /// Checks if this key is valid for decryption.
    pub fn can_decrypt(&self) -> bool {
        self.metadata.usage.encrypt && self.metadata.algorithm == Algorithm::Mlkem768
    }

    /// Checks if this key is valid for signing.
    pub fn can_sign(&self) -> bool {
        self.metadata.usage.sign && self.metadata.algorithm == Algorithm::Mldsa65
    }

    /// Unwraps the raw secret material, zeroized when dropped.
    ///
    /// Unencrypted keys ignore the passphrase (weak mode). Encrypted
    /// keys treat a missing passphrase as an empty one, which fails
    /// the authenticated unwrap with [`CryptError::WrongPassphrase`].
    fn secret_bytes(&self, passphrase: Option<&Passphrase>) -> Result<Zeroizing<Vec<u8>>> {
        match &self.storage {
            PrivateKeyStorage::Unencrypted(bytes) => Ok(Zeroizing::new(bytes.clone())),
            PrivateKeyStorage::Encrypted(encrypted) => {
                let empty = Passphrase::new("");
                encrypted.decrypt(passphrase.unwrap_or(&empty))
            }
        }
    }

    /// Returns a copy with the key material unwrapped.
    ///
    /// Lets a single operation pay the Argon2id derivation once and
    /// reuse the key; the copy's cleartext material is zeroized when
    /// the copy is dropped.
    pub fn unprotect(&self, passphrase: Option<&Passphrase>) -> Result<PrivateKey> {
        let bytes = self.secret_bytes(passphrase)?;
        Ok(PrivateKey {
            storage: PrivateKeyStorage::Unencrypted(bytes.to_vec()),
            metadata: self.metadata.clone(),
        })
    }

    /// Reconstructs the ML-KEM-768 secret key.
    pub fn as_mlkem768(&self, passphrase: Option<&Passphrase>) -> Result<mlkem768::SecretKey> {
        if self.metadata.algorithm != Algorithm::Mlkem768 {
            return Err(CryptError::invalid_key("Key is not an ML-KEM-768 key"));
        }

        let key_bytes = self.secret_bytes(passphrase)?;
        KemSecretKey::from_bytes(&key_bytes)
            .map_err(|_| CryptError::invalid_key("Failed to reconstruct ML-KEM-768 secret key"))
    }

    /// Reconstructs the ML-DSA-65 secret key.
    pub fn as_mldsa65(&self, passphrase: Option<&Passphrase>) -> Result<mldsa65::SecretKey> {
        if self.metadata.algorithm != Algorithm::Mldsa65 {
            return Err(CryptError::invalid_key("Key is not an ML-DSA-65 key"));
        }

        let key_bytes = self.secret_bytes(passphrase)?;
        SignSecretKey::from_bytes(&key_bytes)
            .map_err(|_| CryptError::invalid_key("Failed to reconstruct ML-DSA-65 secret key"))
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        if let PrivateKeyStorage::Unencrypted(bytes) = &mut self.storage {
            bytes.zeroize();
        }
    }
}

/// The public half of a key pair as it travels inside armor:
/// primary key, encryption subkey, user id, and the self-signature
/// binding them together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyBlock {
    /// Serialization version
    pub version: u8,
    /// User id string, `Name <email>`
    pub user_id: String,
    /// Primary ML-DSA-65 certification key
    pub primary: PublicKey,
    /// ML-KEM-768 encryption subkey
    pub encryption_subkey: PublicKey,
    /// Self-signature by the primary key over the binding
    pub certification: Signature,
}

impl PublicKeyBlock {
    /// Deterministic byte string the self-signature covers.
    fn binding_bytes(
        version: u8,
        user_id: &str,
        primary: &PublicKey,
        subkey: &PublicKey,
    ) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.push(version);
        bytes.extend_from_slice(&(user_id.len() as u32).to_be_bytes());
        bytes.extend_from_slice(user_id.as_bytes());
        for key in [primary, subkey] {
            bytes.push(key.algorithm() as u8);
            bytes.extend_from_slice(&key.metadata().created.to_be_bytes());
            bytes.extend_from_slice(&(key.as_bytes().len() as u32).to_be_bytes());
            bytes.extend_from_slice(key.as_bytes());
        }
        bytes
    }

    /// Verifies structure and self-signature.
    ///
    /// Every decode path calls this before the block is used, so a
    /// forged or spliced block is rejected as `InvalidKey` up front.
    pub fn verify(&self) -> Result<()> {
        if self.version != KEY_BLOCK_VERSION {
            return Err(CryptError::invalid_key(format!(
                "Unsupported key block version: {}",
                self.version
            )));
        }
        Validator::validate_user_id(&self.user_id)?;

        if self.primary.algorithm() != Algorithm::Mldsa65 || !self.primary.metadata().usage.certify
        {
            return Err(CryptError::invalid_key(
                "Primary key is not a certification key",
            ));
        }
        if !self.encryption_subkey.can_encrypt() {
            return Err(CryptError::invalid_key(
                "Subkey is not an encryption key",
            ));
        }

        let binding = Self::binding_bytes(
            self.version,
            &self.user_id,
            &self.primary,
            &self.encryption_subkey,
        );
        verify_bytes(&self.primary, &binding, &self.certification)
            .map_err(|_| CryptError::invalid_key("Key self-signature does not verify"))
    }

    /// Fingerprint of the whole block (primary key fingerprint).
    pub fn fingerprint(&self) -> [u8; 32] {
        self.primary.fingerprint()
    }

    /// Serializes the block for armoring.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| CryptError::encoding(format!("Failed to serialize public key block: {}", e)))
    }

    /// Deserializes and verifies a block decoded from armor.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Validator::validate_key_block_size(data)?;
        let block: Self = bincode::deserialize(data)
            .map_err(|_| CryptError::invalid_key("Malformed public key block"))?;
        block.verify()?;
        Ok(block)
    }
}

/// The private half of a key pair: the public block plus both secret
/// keys (passphrase-encrypted unless generated in weak mode).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretKeyBlock {
    /// The corresponding public block, self-signature included
    pub public: PublicKeyBlock,
    /// Primary certification secret key
    pub primary_secret: PrivateKey,
    /// Encryption subkey secret key
    pub subkey_secret: PrivateKey,
}

impl SecretKeyBlock {
    /// Verifies structure, self-signature, and public/private linkage.
    pub fn verify(&self) -> Result<()> {
        self.public.verify()?;

        if !key_ids_equal(self.primary_secret.key_id(), self.public.primary.key_id())
            || !key_ids_equal(
                self.subkey_secret.key_id(),
                self.public.encryption_subkey.key_id(),
            )
        {
            return Err(CryptError::invalid_key(
                "Secret key ids do not match public block",
            ));
        }

        if !self.subkey_secret.can_decrypt() {
            return Err(CryptError::invalid_key(
                "Secret subkey is not a decryption key",
            ));
        }

        Ok(())
    }

    /// Returns true if the secret halves are passphrase-encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.primary_secret.is_encrypted() || self.subkey_secret.is_encrypted()
    }

    /// Serializes the block for armoring.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| CryptError::encoding(format!("Failed to serialize secret key block: {}", e)))
    }

    /// Deserializes and verifies a block decoded from armor.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Validator::validate_key_block_size(data)?;
        let block: Self = bincode::deserialize(data)
            .map_err(|_| CryptError::invalid_key("Malformed private key block"))?;
        block.verify()?;
        Ok(block)
    }
}

/// A freshly generated key pair: both halves, ready for armoring.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// The shareable public block
    pub public: PublicKeyBlock,
    /// The secret block, passphrase-protected unless in weak mode
    pub secret: SecretKeyBlock,
}

impl KeyPair {
    /// Generates a fresh key pair bound to `identity`.
    ///
    /// A non-empty passphrase encrypts both secret halves with an
    /// Argon2id-derived key. An empty passphrase selects the explicit
    /// weak mode: the secret halves are stored in cleartext inside
    /// the (still armored) private key block.
    pub fn generate(identity: &Identity, passphrase: &Passphrase) -> Result<Self> {
        let user_id = identity.user_id();
        Validator::validate_user_id(&user_id)?;

        let created = unix_now();

        // Key generation draws from the pqcrypto crates' internal CSPRNG
        let (dsa_public, dsa_secret) = mldsa65::keypair();
        let (kem_public, kem_secret) = mlkem768::keypair();

        let primary_id = generate_key_id(
            SignPublicKey::as_bytes(&dsa_public),
            Algorithm::Mldsa65,
            created,
        );
        let subkey_id = generate_key_id(
            KemPublicKey::as_bytes(&kem_public),
            Algorithm::Mlkem768,
            created,
        );

        let primary = PublicKey::new_mldsa65(&dsa_public, primary_id, created);
        let encryption_subkey = PublicKey::new_mlkem768(&kem_public, subkey_id, created);
        let mut primary_secret = PrivateKey::new_mldsa65(&dsa_secret, primary_id, created);
        let mut subkey_secret = PrivateKey::new_mlkem768(&kem_secret, subkey_id, created);

        // Self-certify before the secret halves are sealed
        let binding =
            PublicKeyBlock::binding_bytes(KEY_BLOCK_VERSION, &user_id, &primary, &encryption_subkey);
        let certification = sign_bytes(&primary_secret, &binding, None)?;

        if !passphrase.is_empty() {
            primary_secret.protect_with(passphrase)?;
            subkey_secret.protect_with(passphrase)?;
        }

        let public = PublicKeyBlock {
            version: KEY_BLOCK_VERSION,
            user_id,
            primary,
            encryption_subkey,
            certification,
        };

        let secret = SecretKeyBlock {
            public: public.clone(),
            primary_secret,
            subkey_secret,
        };

        Ok(Self { public, secret })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_user_id() {
        assert_eq!(
            Identity::new("Alice", "alice@example.com").user_id(),
            "Alice <alice@example.com>"
        );
        assert_eq!(Identity::new("Alice", "").user_id(), "Alice");
        assert_eq!(
            Identity::new("", "alice@example.com").user_id(),
            "<alice@example.com>"
        );
        assert_eq!(Identity::new("", "").user_id(), "");
    }

    #[test]
    fn test_generate_key_pair() {
        let identity = Identity::new("Alice", "alice@example.com");
        let passphrase = Passphrase::new("s3cr3t");

        let keypair = KeyPair::generate(&identity, &passphrase).unwrap();

        assert_eq!(keypair.public.user_id, "Alice <alice@example.com>");
        keypair.public.verify().unwrap();
        keypair.secret.verify().unwrap();
        assert!(keypair.secret.is_encrypted());
        assert!(keypair.public.encryption_subkey.can_encrypt());
    }

    #[test]
    fn test_generate_with_empty_passphrase_is_weak_mode() {
        let identity = Identity::new("Bob", "bob@example.com");
        let keypair = KeyPair::generate(&identity, &Passphrase::new("")).unwrap();

        assert!(!keypair.secret.is_encrypted());
        keypair.secret.verify().unwrap();

        // Weak-mode keys unwrap without any passphrase
        assert!(keypair.secret.subkey_secret.as_mlkem768(None).is_ok());
    }

    #[test]
    fn test_generation_is_randomized() {
        let identity = Identity::new("Alice", "alice@example.com");
        let passphrase = Passphrase::new("same");

        let a = KeyPair::generate(&identity, &passphrase).unwrap();
        let b = KeyPair::generate(&identity, &passphrase).unwrap();

        assert_ne!(a.public.fingerprint(), b.public.fingerprint());
        assert_ne!(
            a.public.encryption_subkey.key_id(),
            b.public.encryption_subkey.key_id()
        );
    }

    #[test]
    fn test_public_block_roundtrip() {
        let keypair =
            KeyPair::generate(&Identity::new("Alice", "a@example.com"), &Passphrase::new("pw"))
                .unwrap();

        let bytes = keypair.public.to_bytes().unwrap();
        let decoded = PublicKeyBlock::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.user_id, keypair.public.user_id);
        assert_eq!(decoded.fingerprint(), keypair.public.fingerprint());
    }

    #[test]
    fn test_secret_block_roundtrip() {
        let keypair =
            KeyPair::generate(&Identity::new("Alice", "a@example.com"), &Passphrase::new("pw"))
                .unwrap();

        let bytes = keypair.secret.to_bytes().unwrap();
        let decoded = SecretKeyBlock::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.public.user_id, "Alice <a@example.com>");
        assert!(decoded.is_encrypted());
    }

    #[test]
    fn test_tampered_user_id_fails_verification() {
        let keypair =
            KeyPair::generate(&Identity::new("Alice", "a@example.com"), &Passphrase::new("pw"))
                .unwrap();

        let mut block = keypair.public.clone();
        block.user_id = "Mallory <m@example.com>".to_string();

        assert!(matches!(block.verify(), Err(CryptError::InvalidKey(_))));
    }

    #[test]
    fn test_spliced_subkey_fails_verification() {
        let a = KeyPair::generate(&Identity::new("A", "a@example.com"), &Passphrase::new("pw"))
            .unwrap();
        let b = KeyPair::generate(&Identity::new("B", "b@example.com"), &Passphrase::new("pw"))
            .unwrap();

        let mut spliced = a.public.clone();
        spliced.encryption_subkey = b.public.encryption_subkey.clone();

        assert!(spliced.verify().is_err());
    }

    #[test]
    fn test_garbage_block_rejected() {
        assert!(matches!(
            PublicKeyBlock::from_bytes(b"not a key block"),
            Err(CryptError::InvalidKey(_))
        ));
        assert!(matches!(
            SecretKeyBlock::from_bytes(&[0u8; 64]),
            Err(CryptError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_encrypted_secret_requires_passphrase() {
        let keypair =
            KeyPair::generate(&Identity::new("Alice", "a@example.com"), &Passphrase::new("pw"))
                .unwrap();

        let subkey = &keypair.secret.subkey_secret;
        assert!(subkey.as_mlkem768(Some(&Passphrase::new("pw"))).is_ok());
        assert!(matches!(
            subkey.as_mlkem768(Some(&Passphrase::new("wrong"))),
            Err(CryptError::WrongPassphrase)
        ));
        assert!(matches!(
            subkey.as_mlkem768(None),
            Err(CryptError::WrongPassphrase)
        ));
    }

    #[test]
    fn test_wrong_algorithm_reconstruction_fails() {
        let keypair =
            KeyPair::generate(&Identity::new("Alice", "a@example.com"), &Passphrase::new(""))
                .unwrap();

        // The primary key is ML-DSA-65, not a KEM key
        assert!(keypair.public.primary.as_mlkem768().is_err());
        assert!(keypair.secret.primary_secret.as_mlkem768(None).is_err());
    }
}
