//! Command-line interface for CryptedHype.
//!
//! A thin front end over the engine: key generation, file encryption,
//! file decryption, and key inspection. Passphrases are prompted
//! interactively and never passed on the command line.

pub mod args;
pub mod commands;
pub mod utils;

use crate::Result;
use std::process;

pub use args::Command;

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let command = match args::parse_args() {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error parsing arguments: {}", e);
            process::exit(1);
        }
    };

    let result = match command {
        Command::GenerateKey {
            name,
            email,
            public_out,
            private_out,
        } => commands::generate_key(&name, &email, &public_out, &private_out),
        Command::Encrypt {
            public_key_file,
            input_file,
            output_file,
        } => commands::encrypt(&public_key_file, &input_file, &output_file),
        Command::Decrypt {
            private_key_file,
            input_file,
            output_file,
        } => commands::decrypt(&private_key_file, &input_file, &output_file),
        Command::Inspect { key_file } => commands::inspect(&key_file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    Ok(())
}
