//! X.509 certificate decoding.
//!
//! This module is the in-process certificate decoder the rest of the crate
//! builds on: it turns PEM or DER bytes into a DER-backed wrapper exposing
//! the fields a pinning configuration needs (subject, issuer, SHA-1
//! fingerprint) and the raw `SubjectPublicKeyInfo` structure.

use log::debug;
use sha1::{Digest, Sha1};
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::*;

use crate::error::{PinError, Result};
use crate::types::CertificateEncoding;

/// Standard X.509 certificate wrapper
#[derive(Debug, Clone)]
pub struct X509Certificate {
    /// DER-encoded certificate bytes
    der_bytes: Vec<u8>,
    /// Certificate subject
    subject: String,
    /// Certificate issuer
    issuer: String,
}

impl X509Certificate {
    /// Create from DER-encoded bytes
    pub fn from_der(der_bytes: Vec<u8>) -> Result<Self> {
        let (_, parsed_cert) = x509_parser::certificate::X509Certificate::from_der(&der_bytes)
            .map_err(|e| PinError::DecodeError(format!("Failed to parse certificate: {e}")))?;

        let subject = parsed_cert.subject().to_string();
        let issuer = parsed_cert.issuer().to_string();

        Ok(Self {
            der_bytes,
            subject,
            issuer,
        })
    }

    /// Create from PEM-encoded bytes.
    ///
    /// The first `CERTIFICATE` block is used; other blocks (a leading
    /// private key in a combined key-and-chain file) are skipped.
    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self> {
        let mut input = pem_bytes;
        loop {
            let (rem, pem) = parse_x509_pem(input)
                .map_err(|e| PinError::DecodeError(format!("Failed to parse PEM block: {e}")))?;
            if pem.label == "CERTIFICATE" {
                return Self::from_der(pem.contents);
            }
            if rem.is_empty() {
                return Err(PinError::DecodeError(
                    "No CERTIFICATE PEM block found".to_string(),
                ));
            }
            input = rem;
        }
    }

    /// Create from raw bytes with an explicit encoding tag
    pub fn from_bytes(bytes: &[u8], encoding: CertificateEncoding) -> Result<Self> {
        debug!("decoding certificate input as {encoding}");
        match encoding {
            CertificateEncoding::Pem => Self::from_pem(bytes),
            CertificateEncoding::Der => Self::from_der(bytes.to_vec()),
        }
    }

    /// Get DER-encoded bytes
    pub fn der_bytes(&self) -> &[u8] {
        &self.der_bytes
    }

    /// Get certificate subject
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Get certificate issuer
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Parse the certificate for field access
    pub fn parsed(&self) -> Result<x509_parser::certificate::X509Certificate> {
        let (_, cert) = x509_parser::certificate::X509Certificate::from_der(&self.der_bytes)
            .map_err(|e| PinError::DecodeError(format!("Failed to parse certificate: {e}")))?;
        Ok(cert)
    }

    /// The DER-encoded `SubjectPublicKeyInfo` structure of the certificate's
    /// public key, exactly as it appears inside the certificate.
    pub fn spki_der(&self) -> Result<Vec<u8>> {
        let parsed = self.parsed()?;
        Ok(parsed.public_key().raw.to_vec())
    }

    /// SHA-1 fingerprint of the DER bytes, rendered the way OpenSSL prints
    /// it: uppercase hex pairs separated by colons.
    pub fn sha1_fingerprint(&self) -> String {
        let digest = Sha1::digest(&self.der_bytes);
        digest
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Re-encode the certificate as PEM
    pub fn to_pem(&self) -> Result<String> {
        let cert = openssl::x509::X509::from_der(&self.der_bytes)
            .map_err(|e| PinError::CertificateError(format!("Failed to re-load DER: {e}")))?;
        let pem = cert
            .to_pem()
            .map_err(|e| PinError::CertificateError(format!("Failed to encode PEM: {e}")))?;
        String::from_utf8(pem)
            .map_err(|e| PinError::CertificateError(format!("PEM is not valid UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 20 digest bytes, two hex chars each, 19 separators
    #[test]
    fn fingerprint_has_openssl_shape() {
        let ca = crate::authority::CertificateAuthority::new("Fingerprint Test CA").unwrap();
        let fingerprint = ca.ca_certificate().sha1_fingerprint();
        assert_eq!(fingerprint.len(), 20 * 2 + 19);
        assert!(fingerprint
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase() || c == ':'));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = X509Certificate::from_der(vec![0x00, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, PinError::DecodeError(_)));

        let err = X509Certificate::from_pem(b"not pem at all").unwrap_err();
        assert!(matches!(err, PinError::DecodeError(_)));
    }
}
