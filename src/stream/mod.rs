//! Chunked authenticated streaming encryption.
//!
//! File content is processed in fixed-size chunks so memory use stays
//! a small constant multiple of the chunk size no matter how large
//! the file is. Each chunk is sealed with AES-256-GCM under the
//! per-file content key:
//!
//! - nonce: 24 zero bits ‖ 64-bit big-endian chunk counter ‖ one
//!   final-flag byte (0x01 on the last chunk). Reordered chunks fail
//!   authentication because the counter is part of the nonce; a
//!   stream cut at a chunk boundary fails because the last chunk
//!   present was not sealed as final.
//! - AAD: the SHA3-256 digest of the file header, so header
//!   tampering voids every chunk.
//!
//! Decryption verifies each tag before emitting a single plaintext
//! byte of that chunk; the first failing chunk aborts the operation.

use crate::crypto::encryption::ContentKey;
use crate::error::{CryptError, Result};
use crate::packet::{read_exact_framed, ChunkPrefix, TAG_SIZE};
use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce,
};
use std::io::{Read, Write};

/// Builds the 12-byte nonce for chunk `counter`.
fn chunk_nonce(counter: u64, is_final: bool) -> [u8; 12] {
    let mut nonce = [0u8; 12];
    nonce[3..11].copy_from_slice(&counter.to_be_bytes());
    nonce[11] = is_final as u8;
    nonce
}

/// Reads until `buf` is full or the stream ends; returns bytes read.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CryptError::Io(e)),
        }
    }
    Ok(filled)
}

/// Encrypts `reader` into `writer` as a chunked AEAD stream.
///
/// Always emits at least one chunk, so an empty plaintext still
/// produces an authenticated (empty, final) chunk. Returns the number
/// of plaintext bytes consumed.
pub fn encrypt_stream<R: Read, W: Write>(
    key: &ContentKey,
    aad: &[u8; 32],
    mut reader: R,
    mut writer: W,
    chunk_size: usize,
) -> Result<u64> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    let mut current = vec![0u8; chunk_size];
    let mut next = vec![0u8; chunk_size];
    let mut current_len = read_up_to(&mut reader, &mut current)?;
    let mut counter: u64 = 0;
    let mut total: u64 = 0;

    loop {
        // One-chunk lookahead: the final chunk is the one after which
        // the source is exhausted
        let next_len = if current_len == chunk_size {
            read_up_to(&mut reader, &mut next)?
        } else {
            0
        };
        let is_final = next_len == 0;

        let nonce = chunk_nonce(counter, is_final);
        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &current[..current_len],
                    aad: aad.as_slice(),
                },
            )
            .map_err(|_| CryptError::encoding("Failed to seal content chunk"))?;

        let prefix = ChunkPrefix::new(ciphertext.len() as u32, is_final);
        writer
            .write_all(&prefix.encode())
            .and_then(|_| writer.write_all(&ciphertext))
            .map_err(|e| CryptError::destination_write(e.to_string()))?;

        total += current_len as u64;
        counter += 1;

        if is_final {
            break;
        }

        std::mem::swap(&mut current, &mut next);
        current_len = next_len;
    }

    writer
        .flush()
        .map_err(|e| CryptError::destination_write(e.to_string()))?;

    Ok(total)
}

/// Decrypts a chunked AEAD stream from `reader` into `writer`.
///
/// Returns the number of plaintext bytes recovered. The error
/// category tells the caller what went wrong: `MalformedCiphertext`
/// for framing violations (truncation, trailing data, bad lengths),
/// `Integrity` for a chunk that fails authentication.
pub fn decrypt_stream<R: Read, W: Write>(
    key: &ContentKey,
    aad: &[u8; 32],
    mut reader: R,
    mut writer: W,
    chunk_size: usize,
) -> Result<u64> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    let mut counter: u64 = 0;
    let mut total: u64 = 0;
    let mut ciphertext = vec![0u8; chunk_size + TAG_SIZE];

    loop {
        let mut prefix_bytes = [0u8; 4];
        read_exact_framed(&mut reader, &mut prefix_bytes, "chunk prefix")?;
        let prefix = ChunkPrefix::decode(prefix_bytes, chunk_size as u32)?;

        let chunk = &mut ciphertext[..prefix.len as usize];
        read_exact_framed(&mut reader, chunk, "chunk body")?;

        let nonce = chunk_nonce(counter, prefix.is_final);
        let plaintext = cipher
            .decrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &chunk[..],
                    aad: aad.as_slice(),
                },
            )
            .map_err(|_| {
                CryptError::integrity(format!("Chunk {} failed authentication", counter))
            })?;

        writer
            .write_all(&plaintext)
            .map_err(|e| CryptError::destination_write(e.to_string()))?;

        total += plaintext.len() as u64;
        counter += 1;

        if prefix.is_final {
            break;
        }
    }

    // Nothing may follow the final chunk
    let mut trailing = [0u8; 1];
    match reader.read(&mut trailing) {
        Ok(0) => {}
        Ok(_) => {
            return Err(CryptError::malformed("Data after final chunk"));
        }
        Err(e) => return Err(CryptError::Io(e)),
    }

    writer
        .flush()
        .map_err(|e| CryptError::destination_write(e.to_string()))?;

    Ok(total)
}
