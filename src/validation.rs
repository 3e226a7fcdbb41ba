//! Input validation and size limits.
//!
//! Every length field read from untrusted input (armored blobs, key
//! blocks, ciphertext headers, chunk frames) goes through the checks
//! here before any allocation or cryptographic processing happens.

use crate::error::{CryptError, Result};

/// Maximum accepted armored text size (10 MB)
pub const MAX_ARMOR_SIZE: usize = 10 * 1024 * 1024;

/// Maximum serialized key block size (64 KB - generous for post-quantum keys)
pub const MAX_KEY_BLOCK_SIZE: usize = 64 * 1024;

/// Maximum encapsulated session key size (4 KB)
pub const MAX_ENCAPSULATED_KEY_SIZE: usize = 4 * 1024;

/// Maximum ciphertext file header size (16 KB)
pub const MAX_HEADER_SIZE: usize = 16 * 1024;

/// Default plaintext chunk size for streaming encryption (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Maximum plaintext chunk size a decryptor will accept (8 MiB)
pub const MAX_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Maximum allowed user id length (1 KB)
pub const MAX_USER_ID_LENGTH: usize = 1024;

/// Validation functions for untrusted input.
pub struct Validator;

impl Validator {
    /// Validate armored text size before parsing.
    pub fn validate_armor_size(text: &str) -> Result<()> {
        if text.len() > MAX_ARMOR_SIZE {
            return Err(CryptError::validation(format!(
                "Armored text too large: {} bytes exceeds maximum of {} bytes",
                text.len(),
                MAX_ARMOR_SIZE
            )));
        }
        Ok(())
    }

    /// Validate serialized key block size.
    pub fn validate_key_block_size(data: &[u8]) -> Result<()> {
        if data.len() > MAX_KEY_BLOCK_SIZE {
            return Err(CryptError::validation(format!(
                "Key block too large: {} bytes exceeds maximum of {} bytes",
                data.len(),
                MAX_KEY_BLOCK_SIZE
            )));
        }
        Ok(())
    }

    /// Validate encapsulated session key size.
    pub fn validate_encapsulated_key_size(data: &[u8]) -> Result<()> {
        if data.is_empty() || data.len() > MAX_ENCAPSULATED_KEY_SIZE {
            return Err(CryptError::validation(format!(
                "Encapsulated key has unreasonable size: {} bytes",
                data.len()
            )));
        }
        Ok(())
    }

    /// Validate a chunk size declared in a ciphertext header.
    pub fn validate_chunk_size(chunk_size: usize) -> Result<()> {
        if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
            return Err(CryptError::validation(format!(
                "Chunk size out of range: {} bytes (maximum {})",
                chunk_size, MAX_CHUNK_SIZE
            )));
        }
        Ok(())
    }

    /// Validate a user id string.
    ///
    /// Identity fields are free-form and may be empty; the only hard
    /// constraints are a length cap and no embedded control bytes.
    pub fn validate_user_id(user_id: &str) -> Result<()> {
        if user_id.len() > MAX_USER_ID_LENGTH {
            return Err(CryptError::validation(format!(
                "User id too long: {} bytes exceeds maximum of {} bytes",
                user_id.len(),
                MAX_USER_ID_LENGTH
            )));
        }

        if user_id.contains('\0') {
            return Err(CryptError::validation("User id contains null bytes"));
        }

        if user_id.chars().any(|c| c.is_control()) {
            return Err(CryptError::validation(
                "User id contains control characters",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_validation() {
        // Free-form ids, including empty ones, are allowed
        assert!(Validator::validate_user_id("Alice <alice@example.com>").is_ok());
        assert!(Validator::validate_user_id("").is_ok());

        // Null bytes and control characters are not
        assert!(Validator::validate_user_id("Alice\0<alice@example.com>").is_err());
        assert!(Validator::validate_user_id("Alice\x01").is_err());

        let long_user_id = "A".repeat(MAX_USER_ID_LENGTH + 1);
        assert!(Validator::validate_user_id(&long_user_id).is_err());
    }

    #[test]
    fn test_chunk_size_validation() {
        assert!(Validator::validate_chunk_size(DEFAULT_CHUNK_SIZE).is_ok());
        assert!(Validator::validate_chunk_size(1).is_ok());
        assert!(Validator::validate_chunk_size(0).is_err());
        assert!(Validator::validate_chunk_size(MAX_CHUNK_SIZE + 1).is_err());
    }

    #[test]
    fn test_encapsulated_key_size() {
        assert!(Validator::validate_encapsulated_key_size(&[0u8; 1088]).is_ok());
        assert!(Validator::validate_encapsulated_key_size(&[]).is_err());
        assert!(
            Validator::validate_encapsulated_key_size(&vec![0u8; MAX_ENCAPSULATED_KEY_SIZE + 1])
                .is_err()
        );
    }
}
