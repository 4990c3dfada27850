//! Pinkit CLI - SSL pin generation and test certificate material
//!
//! This CLI provides two commands: `pin` computes an HPKP / TrustKit SPKI
//! pin from an X.509 certificate, and `gen-certs` generates a throwaway
//! test certificate authority plus a leaf certificate signed by it.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod gen_certs;
mod pin;

use gen_certs::GenCertsCommand;
use pin::PinCommand;

#[derive(Parser)]
#[command(name = "pinkit")]
#[command(about = "Generate HPKP / TrustKit SSL pins and throwaway test certificates")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the SPKI pin of a certificate
    #[command(name = "pin")]
    Pin {
        /// Certificate file to read; if empty, stdin is used
        #[arg(value_name = "FILE")]
        certificate: Option<PathBuf>,

        /// Certificate file type; "PEM" (default) or "DER"
        #[arg(long, default_value = "PEM")]
        format: String,
    },
    /// Generate a test CA and a leaf certificate signed by it
    #[command(name = "gen-certs")]
    GenCerts {
        /// Hostname of the leaf certificate
        #[arg(long, default_value = "www.good.com")]
        hostname: String,

        /// Leaf key type: rsa2048, rsa4096, p256 or p384
        #[arg(long, default_value = "rsa2048")]
        key_type: String,

        /// Directory the PEM files are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Common name of the generated CA
        #[arg(long, default_value = "Good Root CA")]
        ca_name: String,

        /// Leaf certificate validity in days
        #[arg(long, default_value_t = 365)]
        validity_days: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; --verbose raises the default filter
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "warn" }),
    )
    .init();

    match cli.command {
        Commands::Pin {
            certificate,
            format,
        } => {
            let pin_cmd = PinCommand::new(certificate, format);
            pin_cmd.run()?;
        }
        Commands::GenCerts {
            hostname,
            key_type,
            out_dir,
            ca_name,
            validity_days,
        } => {
            let gen_certs_cmd =
                GenCertsCommand::new(hostname, key_type, out_dir, ca_name, validity_days);
            gen_certs_cmd.run()?;
        }
    }

    Ok(())
}
