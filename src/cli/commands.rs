//! Command implementations for the CryptedHype CLI.

use crate::cli::utils::{prompt_for_new_passphrase, prompt_for_passphrase, read_key_file, write_file};
use crate::crypto::Identity;
use crate::engine;
use crate::Result;
use std::path::Path;
use tracing::{info, warn};

/// Execute generate-key command.
pub fn generate_key(
    name: &str,
    email: &str,
    public_out: &Path,
    private_out: &Path,
) -> Result<()> {
    let identity = Identity::new(name, email);

    info!(user_id = %identity.user_id(), "Generating key pair");

    let passphrase = prompt_for_new_passphrase()?;
    if passphrase.is_empty() {
        warn!("Empty passphrase: the private key will be stored without protection");
    }

    let keys = engine::generate_key_pair(&identity, &passphrase)?;

    write_file(public_out, keys.public_key.as_bytes())?;
    write_file(private_out, keys.private_key.as_bytes())?;

    info!(
        public_key = %public_out.display(),
        private_key = %private_out.display(),
        "Key pair generated"
    );

    Ok(())
}

/// Execute encrypt command.
pub fn encrypt(public_key_file: &Path, input_file: &Path, output_file: &Path) -> Result<()> {
    let public_key = read_key_file(public_key_file)?;

    info!(file = %input_file.display(), "Encrypting file");

    engine::encrypt_file(&public_key, input_file, output_file)?;

    info!(output_file = %output_file.display(), "File encrypted");

    Ok(())
}

/// Execute decrypt command.
pub fn decrypt(private_key_file: &Path, input_file: &Path, output_file: &Path) -> Result<()> {
    let private_key = read_key_file(private_key_file)?;

    info!(file = %input_file.display(), "Decrypting file");

    let passphrase = prompt_for_passphrase("Enter passphrase for private key")?;
    engine::decrypt_file(&private_key, &passphrase, input_file, output_file)?;

    info!(output_file = %output_file.display(), "File decrypted");

    Ok(())
}

/// Execute inspect command.
pub fn inspect(key_file: &Path) -> Result<()> {
    let armored = read_key_file(key_file)?;
    let key_info = engine::inspect_key(&armored)?;

    info!(
        user_id = %key_info.user_id,
        fingerprint = %key_info.fingerprint,
        primary = %key_info.primary_algorithm,
        primary_key_id = format!("{:016X}", key_info.primary_key_id),
        subkey = %key_info.subkey_algorithm,
        subkey_key_id = format!("{:016X}", key_info.subkey_key_id),
        created = key_info.created,
        private = key_info.is_private,
        protected = key_info.is_protected,
        "Key details"
    );

    Ok(())
}
