//! Command-line argument parsing.

use std::env;
use std::path::PathBuf;
use std::process;

use crate::Result;

/// Command-line interface commands
#[derive(Debug)]
pub enum Command {
    GenerateKey {
        name: String,
        email: String,
        public_out: PathBuf,
        private_out: PathBuf,
    },
    Encrypt {
        public_key_file: PathBuf,
        input_file: PathBuf,
        output_file: PathBuf,
    },
    Decrypt {
        private_key_file: PathBuf,
        input_file: PathBuf,
        output_file: PathBuf,
    },
    Inspect {
        key_file: PathBuf,
    },
}

/// Parse command line arguments into a Command.
pub fn parse_args() -> Result<Command> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "generate-key" => {
            if args.len() < 6 {
                eprintln!("Error: generate-key requires name, email, and two output paths");
                eprintln!("Usage: cryptedhype generate-key <name> <email> <public_out> <private_out>");
                process::exit(1);
            }

            Ok(Command::GenerateKey {
                name: args[2].clone(),
                email: args[3].clone(),
                public_out: PathBuf::from(&args[4]),
                private_out: PathBuf::from(&args[5]),
            })
        }

        "encrypt" => {
            if args.len() < 5 {
                eprintln!("Error: encrypt requires public key file, input file, and output file");
                process::exit(1);
            }
            Ok(Command::Encrypt {
                public_key_file: PathBuf::from(&args[2]),
                input_file: PathBuf::from(&args[3]),
                output_file: PathBuf::from(&args[4]),
            })
        }

        "decrypt" => {
            if args.len() < 5 {
                eprintln!("Error: decrypt requires private key file, input file, and output file");
                process::exit(1);
            }
            Ok(Command::Decrypt {
                private_key_file: PathBuf::from(&args[2]),
                input_file: PathBuf::from(&args[3]),
                output_file: PathBuf::from(&args[4]),
            })
        }

        "inspect" => {
            if args.len() < 3 {
                eprintln!("Error: inspect requires a key file");
                process::exit(1);
            }
            Ok(Command::Inspect {
                key_file: PathBuf::from(&args[2]),
            })
        }

        _ => {
            eprintln!("Error: Unknown command '{}'", args[1]);
            print_usage();
            process::exit(1);
        }
    }
}

/// Print usage information.
pub fn print_usage() {
    println!("CryptedHype - Hybrid post-quantum file encryption");
    println!("=================================================");
    println!();
    println!("Usage: cryptedhype <command> [args...]");
    println!();
    println!("Commands:");
    println!("  generate-key <name> <email> <public_out> <private_out>");
    println!("                                       Generate an armored key pair");
    println!("  encrypt <public_key> <input> <output>   Encrypt a file for a recipient");
    println!("  decrypt <private_key> <input> <output>  Decrypt a file");
    println!("  inspect <key_file>                      Show key details");
    println!();
    println!("The passphrase is prompted interactively. An empty passphrase");
    println!("at key generation stores the private key without protection.");
    println!();
    println!("Examples:");
    println!("  cryptedhype generate-key Alice alice@example.com alice.pub.asc alice.key.asc");
    println!("  cryptedhype encrypt alice.pub.asc report.pdf report.pdf.chyp");
    println!("  cryptedhype decrypt alice.key.asc report.pdf.chyp report.pdf");
}
