//! CryptedHype command line interface.
//!
//! Hybrid post-quantum file encryption with PGP-style ASCII armor.

use cryptedhype::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "cryptedhype=info".into()),
        )
        .init();

    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
