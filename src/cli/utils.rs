//! Utility functions for CLI operations.

use crate::crypto::Passphrase;
use crate::error::CryptError;
use crate::Result;
use rpassword::prompt_password;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Read an armored key file as text.
pub fn read_key_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        CryptError::invalid_key(format!("Cannot read key file {}: {}", path.display(), e))
    })
}

/// Write file contents.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = fs::File::create(path)
        .map_err(|e| CryptError::destination_write(format!("{}: {}", path.display(), e)))?;
    file.write_all(contents)
        .map_err(|e| CryptError::destination_write(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

/// Prompt for a passphrase without echo.
pub fn prompt_for_passphrase(prompt: &str) -> Result<Passphrase> {
    let passphrase = prompt_password(format!("{}: ", prompt))
        .map_err(|e| CryptError::validation(format!("Failed to read passphrase: {}", e)))?;
    Ok(Passphrase::new(passphrase))
}

/// Prompt twice for a new passphrase and require both entries to match.
///
/// An empty entry is accepted (weak mode) but only confirmed once.
pub fn prompt_for_new_passphrase() -> Result<Passphrase> {
    let first = prompt_for_passphrase("Enter passphrase to protect private key (empty for none)")?;
    if first.is_empty() {
        return Ok(first);
    }

    let second = prompt_for_passphrase("Repeat passphrase")?;
    if !first.matches(&second) {
        return Err(CryptError::validation("Passphrases do not match"));
    }

    Ok(first)
}
