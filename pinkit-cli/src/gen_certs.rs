//! Gen-certs command
//!
//! Creates a throwaway test CA and a leaf certificate signed by it, then
//! writes the CA certificate and the leaf key-and-chain bundle as PEM
//! files, ready to feed back into `pinkit pin`.

use anyhow::{Context, Result};
use pinkit_keys::{CertificateAuthority, KeyAlgorithm};
use std::path::PathBuf;

pub struct GenCertsCommand {
    hostname: String,
    key_type: String,
    out_dir: PathBuf,
    ca_name: String,
    validity_days: u32,
}

impl GenCertsCommand {
    pub fn new(
        hostname: String,
        key_type: String,
        out_dir: PathBuf,
        ca_name: String,
        validity_days: u32,
    ) -> Self {
        Self {
            hostname,
            key_type,
            out_dir,
            ca_name,
            validity_days,
        }
    }

    pub fn run(&self) -> Result<()> {
        let key_type: KeyAlgorithm = self.key_type.parse()?;

        let ca = CertificateAuthority::new(&self.ca_name)?;
        let issued = ca.issue_certificate(&self.hostname, key_type, self.validity_days)?;

        std::fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("Failed to create output directory {:?}", self.out_dir))?;

        let ca_path = self.out_dir.join("GoodRootCA.pem");
        std::fs::write(&ca_path, ca.ca_certificate().to_pem()?)
            .with_context(|| format!("Failed to write CA certificate to {ca_path:?}"))?;

        let leaf_path = self.out_dir.join(format!("{}.pem", self.hostname));
        let bundle = issued.private_key_and_cert_chain_pem(ca.ca_certificate())?;
        std::fs::write(&leaf_path, bundle)
            .with_context(|| format!("Failed to write leaf bundle to {leaf_path:?}"))?;

        println!("Wrote CA certificate to {}", ca_path.display());
        println!(
            "Wrote {} private key and certificate chain to {}",
            self.hostname,
            leaf_path.display()
        );

        Ok(())
    }
}
