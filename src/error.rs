//! Error types for CryptedHype operations.

use thiserror::Error;

/// Result type alias for CryptedHype operations.
pub type Result<T> = std::result::Result<T, CryptError>;

/// Main error type for CryptedHype operations.
///
/// Variants map one-to-one onto the failure categories a caller needs
/// to distinguish: key material problems, passphrase problems, armor
/// problems, filesystem boundaries, and ciphertext tampering. Error
/// messages never contain passphrases, raw key bytes, or plaintext.
#[derive(Error, Debug)]
pub enum CryptError {
    /// The OS entropy source failed; no key material was produced
    #[error("Random source failure: {0}")]
    RandomSource(String),

    /// Malformed or wrong-type key material
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Authenticated unwrap of an encrypted private key failed
    #[error("Wrong passphrase")]
    WrongPassphrase,

    /// ASCII armor format or checksum violation
    #[error("Armor error: {0}")]
    Armor(String),

    /// The source file could not be opened for reading
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    /// The destination file could not be created or written
    #[error("Destination write failed: {0}")]
    DestinationWrite(String),

    /// Ciphertext header or chunk framing is invalid or truncated
    #[error("Malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// A chunk failed authentication; the stream was tampered with
    #[error("Integrity failure: {0}")]
    Integrity(String),

    /// Session key unwrap failed (wrong key or tampered wrapped key)
    #[error("Decryption failure: {0}")]
    Decryption(String),

    /// Internal serialization failure
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors outside the source/destination boundary
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CryptError {
    /// Creates a new random source error.
    pub fn random<T: ToString>(msg: T) -> Self {
        Self::RandomSource(msg.to_string())
    }

    /// Creates a new invalid key error.
    pub fn invalid_key<T: ToString>(msg: T) -> Self {
        Self::InvalidKey(msg.to_string())
    }

    /// Creates a new armor error.
    pub fn armor<T: ToString>(msg: T) -> Self {
        Self::Armor(msg.to_string())
    }

    /// Creates a new source-not-found error.
    pub fn source_not_found<T: ToString>(msg: T) -> Self {
        Self::SourceNotFound(msg.to_string())
    }

    /// Creates a new destination write error.
    pub fn destination_write<T: ToString>(msg: T) -> Self {
        Self::DestinationWrite(msg.to_string())
    }

    /// Creates a new malformed ciphertext error.
    pub fn malformed<T: ToString>(msg: T) -> Self {
        Self::MalformedCiphertext(msg.to_string())
    }

    /// Creates a new integrity failure.
    pub fn integrity<T: ToString>(msg: T) -> Self {
        Self::Integrity(msg.to_string())
    }

    /// Creates a new decryption failure.
    pub fn decryption<T: ToString>(msg: T) -> Self {
        Self::Decryption(msg.to_string())
    }

    /// Creates a new encoding error.
    pub fn encoding<T: ToString>(msg: T) -> Self {
        Self::Encoding(msg.to_string())
    }

    /// Creates a new validation error.
    pub fn validation<T: ToString>(msg: T) -> Self {
        Self::Validation(msg.to_string())
    }
}
