//! VeriBlock PoP toolkit CLI
//!
//! A command-line interface for keys, addresses, wire entities and
//! transaction signing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vbk_pop::cli;
use vbk_pop::config::Network;
use vbk_pop::entities::EntityKind;

#[derive(Parser)]
#[command(name = "vbkpop")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "VeriBlock proof-of-proof wire codec and signing toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a key pair
    Keygen {
        /// Hex seed of at least 32 bytes for a reproducible key
        #[arg(short, long)]
        seed: Option<String>,

        /// Write the key file here instead of printing the private key
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate an address, or derive one from a public key
    Address {
        /// Address to validate
        #[arg(required_unless_present = "public_key", conflicts_with = "public_key")]
        address: Option<String>,

        /// Public key (hex) to derive the address from
        #[arg(short, long)]
        public_key: Option<String>,
    },

    /// Build a multisig address from signer addresses
    Multisig {
        /// Signatures required
        #[arg(short, long)]
        m: usize,

        /// Signer addresses
        #[arg(required = true, num_args = 2..)]
        addresses: Vec<String>,
    },

    /// Decode a hex buffer as an entity
    Decode {
        /// Entity kind
        #[arg(value_enum)]
        kind: EntityKind,

        /// Hex buffer
        hex: String,

        /// Headers without their length prefix, merkle paths without the outer length
        #[arg(short, long)]
        raw: bool,

        /// Subject hash for Bitcoin merkle paths
        #[arg(short, long)]
        subject: Option<String>,
    },

    /// Extract ATV, VTBs and context headers from a Bitcoin script sig
    Publications {
        /// Hex script sig
        hex: String,
    },

    /// Sign a transaction
    Sign {
        /// Key file
        #[arg(short, long)]
        key: PathBuf,

        /// Transaction JSON, inline or a file path
        #[arg(short, long)]
        tx: String,

        /// Signature index of the source address
        #[arg(short, long)]
        index: i64,

        /// mainnet, testnet, or a network byte
        #[arg(short, long)]
        network: Option<Network>,
    },

    /// Verify a signed transaction
    Verify {
        /// Signed transaction JSON, inline or a file path
        #[arg(short, long)]
        tx: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Process commands
    match cli.command {
        Commands::Keygen { seed, output } => {
            cli::cmd_keygen(seed.as_deref(), output.as_deref())?;
        }

        Commands::Address {
            address,
            public_key,
        } => {
            cli::cmd_address(address.as_deref(), public_key.as_deref())?;
        }

        Commands::Multisig { m, addresses } => {
            cli::cmd_multisig(m, &addresses)?;
        }

        Commands::Decode {
            kind,
            hex,
            raw,
            subject,
        } => {
            cli::cmd_decode(kind, &hex, raw, subject.as_deref())?;
        }

        Commands::Publications { hex } => {
            cli::cmd_publications(&hex)?;
        }

        Commands::Sign {
            key,
            tx,
            index,
            network,
        } => {
            cli::cmd_sign(&key, &tx, index, network)?;
        }

        Commands::Verify { tx } => {
            cli::cmd_verify(&tx)?;
        }
    }

    Ok(())
}
