//! Pin command
//!
//! Reads a certificate from a file or standard input, prints a certificate
//! summary and a TrustKit configuration snippet with the SPKI pin.

use anyhow::{Context, Result};
use log::debug;
use pinkit_keys::{pin_from_certificate, CertificateEncoding, PinError, X509Certificate};
use std::io::Read;
use std::path::PathBuf;

pub struct PinCommand {
    certificate: Option<PathBuf>,
    format: String,
}

impl PinCommand {
    pub fn new(certificate: Option<PathBuf>, format: String) -> Self {
        Self {
            certificate,
            format,
        }
    }

    pub fn run(&self) -> Result<()> {
        let encoding: CertificateEncoding = self.format.parse()?;
        let certificate_bytes = self.read_input()?;
        debug!(
            "read {} bytes of {encoding} certificate input",
            certificate_bytes.len()
        );

        let certificate = X509Certificate::from_bytes(&certificate_bytes, encoding)?;
        let spki_pin = pin_from_certificate(&certificate)?;

        println!();
        println!("CERTIFICATE INFO");
        println!("----------------");
        println!("subject={}", certificate.subject());
        println!("issuer={}", certificate.issuer());
        println!("SHA1 Fingerprint={}", certificate.sha1_fingerprint());
        println!();
        println!("TRUSTKIT CONFIGURATION");
        println!("----------------------");
        println!(
            "kTSKPublicKeyHashes: @[@\"{}\"] // You will also need to configure a backup pin",
            spki_pin.pin
        );
        println!(
            "kTSKPublicKeyAlgorithms: @[{}]",
            spki_pin.algorithm.trustkit_constant()
        );

        Ok(())
    }

    fn read_input(&self) -> Result<Vec<u8>> {
        match &self.certificate {
            Some(path) => {
                if !path.is_file() {
                    return Err(PinError::InputNotFound(path.display().to_string()).into());
                }
                std::fs::read(path)
                    .with_context(|| format!("Failed to read certificate file {path:?}"))
            }
            None => {
                let mut buffer = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut buffer)
                    .context("Failed to read certificate from stdin")?;
                Ok(buffer)
            }
        }
    }
}
