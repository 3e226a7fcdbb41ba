//! Ciphertext file wire format.
//!
//! An encrypted file is self-describing: a magic tag, a
//! length-prefixed header carrying every parameter decryption needs
//! (algorithm ids, recipient key id, KDF salt, encapsulated session
//! key, chunk size), then a sequence of length-prefixed AEAD chunks.
//!
//! ```text
//! "CHYP" | u32 header_len | header | frame*
//! frame: u32 prefix (bit 31 = final-chunk flag, bits 0..31 = length) | ciphertext
//! ```
//!
//! All integers are big-endian. Every length field is validated
//! before allocation; framing violations are `MalformedCiphertext`.

use crate::crypto::encryption::KDF_SALT_SIZE;
use crate::crypto::{hash_data, Algorithm};
use crate::error::{CryptError, Result};
use crate::validation::{Validator, MAX_HEADER_SIZE};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Magic tag at the start of every encrypted file
pub const MAGIC: [u8; 4] = *b"CHYP";

/// Ciphertext format version
pub const FORMAT_VERSION: u8 = 1;

/// AES-GCM authentication tag size in bytes
pub const TAG_SIZE: usize = 16;

/// Bit 31 of a frame prefix marks the final chunk
const FINAL_CHUNK_FLAG: u32 = 0x8000_0000;

/// The decryption parameters embedded in an encrypted file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHeader {
    /// Ciphertext format version
    pub version: u8,
    /// Key encapsulation algorithm
    pub kem_algorithm: Algorithm,
    /// Content encryption algorithm
    pub aead_algorithm: Algorithm,
    /// Key id of the recipient's encryption subkey
    pub recipient_key_id: u64,
    /// Per-file HKDF salt for content key derivation
    pub kdf_salt: [u8; KDF_SALT_SIZE],
    /// ML-KEM-768 encapsulation of the session secret
    pub encapsulated_key: Vec<u8>,
    /// Plaintext bytes per chunk
    pub chunk_size: u32,
}

impl FileHeader {
    /// Creates a header for a fresh encryption.
    pub fn new(
        recipient_key_id: u64,
        kdf_salt: [u8; KDF_SALT_SIZE],
        encapsulated_key: Vec<u8>,
        chunk_size: u32,
    ) -> Self {
        Self {
            version: FORMAT_VERSION,
            kem_algorithm: Algorithm::Mlkem768,
            aead_algorithm: Algorithm::Aes256Gcm,
            recipient_key_id,
            kdf_salt,
            encapsulated_key,
            chunk_size,
        }
    }

    /// Validates header fields after deserialization.
    pub fn validate(&self) -> Result<()> {
        if self.version != FORMAT_VERSION {
            return Err(CryptError::malformed(format!(
                "Unsupported ciphertext version: {}",
                self.version
            )));
        }
        if self.kem_algorithm != Algorithm::Mlkem768 {
            return Err(CryptError::malformed(format!(
                "Unsupported key encapsulation algorithm: {}",
                self.kem_algorithm
            )));
        }
        if self.aead_algorithm != Algorithm::Aes256Gcm {
            return Err(CryptError::malformed(format!(
                "Unsupported content encryption algorithm: {}",
                self.aead_algorithm
            )));
        }
        Validator::validate_encapsulated_key_size(&self.encapsulated_key)
            .map_err(|_| CryptError::malformed("Encapsulated key has unreasonable size"))?;
        Validator::validate_chunk_size(self.chunk_size as usize)
            .map_err(|_| CryptError::malformed("Chunk size out of range"))?;
        Ok(())
    }

    /// Serializes the header: magic, length prefix, body.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let body = bincode::serialize(self)
            .map_err(|e| CryptError::encoding(format!("Failed to serialize file header: {}", e)))?;
        if body.len() > MAX_HEADER_SIZE {
            return Err(CryptError::encoding("File header too large"));
        }

        let mut bytes = Vec::with_capacity(8 + body.len());
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Digest over the serialized header, used as AAD for every
    /// chunk so a tampered header fails chunk authentication.
    pub fn aad(&self) -> Result<[u8; 32]> {
        Ok(hash_data(&self.to_bytes()?))
    }

    /// Reads and validates a header from the start of a ciphertext
    /// stream.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        read_exact_framed(reader, &mut magic, "magic tag")?;
        if magic != MAGIC {
            return Err(CryptError::malformed("Not a CryptedHype encrypted file"));
        }

        let mut len_bytes = [0u8; 4];
        read_exact_framed(reader, &mut len_bytes, "header length")?;
        let header_len = u32::from_be_bytes(len_bytes) as usize;
        if header_len == 0 || header_len > MAX_HEADER_SIZE {
            return Err(CryptError::malformed(format!(
                "Header length out of range: {} bytes",
                header_len
            )));
        }

        let mut body = vec![0u8; header_len];
        read_exact_framed(reader, &mut body, "header body")?;

        let header: Self = bincode::deserialize(&body)
            .map_err(|_| CryptError::malformed("Corrupt file header"))?;
        header.validate()?;

        // Round-trip check: the AAD is computed over our own
        // serialization, so it must match the bytes just read
        let reserialized = header.to_bytes()?;
        if reserialized.len() != 8 + header_len || reserialized[8..] != body[..] {
            return Err(CryptError::malformed("File header is not canonical"));
        }

        Ok(header)
    }
}

/// The four-byte prefix in front of every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPrefix {
    /// Ciphertext length (plaintext + tag)
    pub len: u32,
    /// Whether this is the last chunk of the stream
    pub is_final: bool,
}

impl ChunkPrefix {
    /// Creates a prefix for a chunk of `len` ciphertext bytes.
    pub fn new(len: u32, is_final: bool) -> Self {
        Self { len, is_final }
    }

    /// Encodes the prefix.
    pub fn encode(&self) -> [u8; 4] {
        let mut value = self.len;
        if self.is_final {
            value |= FINAL_CHUNK_FLAG;
        }
        value.to_be_bytes()
    }

    /// Decodes a prefix and validates the length against the chunk
    /// size declared in the header.
    pub fn decode(bytes: [u8; 4], chunk_size: u32) -> Result<Self> {
        let value = u32::from_be_bytes(bytes);
        let is_final = value & FINAL_CHUNK_FLAG != 0;
        let len = value & !FINAL_CHUNK_FLAG;

        let full = chunk_size + TAG_SIZE as u32;
        if len < TAG_SIZE as u32 || len > full {
            return Err(CryptError::malformed(format!(
                "Chunk frame length out of range: {} bytes",
                len
            )));
        }
        if !is_final && len != full {
            return Err(CryptError::malformed(
                "Non-final chunk is not a full chunk",
            ));
        }

        Ok(Self { len, is_final })
    }
}

/// `read_exact` with framing-aware error mapping: a clean EOF in the
/// middle of a frame is a truncated ciphertext, not an I/O error.
pub fn read_exact_framed<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            CryptError::malformed(format!("Truncated ciphertext while reading {}", what))
        } else {
            CryptError::Io(e)
        }
    })
}
