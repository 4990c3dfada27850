//! Throwaway certificate authority for test material.
//!
//! This module generates a self-signed CA and leaf certificates signed by
//! it, producing PEM output for use in tests. The CA key is ECDSA P-256;
//! leaf keys can be any member of the recognized [`KeyAlgorithm`] set so
//! that every classification outcome is reproducible from generated
//! material.

use log::{debug, info};
use std::time::{Duration, SystemTime};

// Certificate generation and parsing
use rcgen::{Certificate as RcgenCertificate, CertificateParams, KeyPair};

// OpenSSL for proper CA operations
use openssl::bn::{BigNum, MsbOption};
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::extension::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAlternativeName,
};
use openssl::x509::{X509Builder, X509NameBuilder, X509};

// Cryptographic support
use p256::ecdsa::SigningKey;
use pkcs8::EncodePrivateKey;

use crate::certificate::X509Certificate;
use crate::error::{PinError, Result};
use crate::types::KeyAlgorithm;

/// ECDSA P-256 key pair backing the certificate authority
#[derive(Debug, Clone)]
pub struct EcdsaKeyPair {
    signing_key: SigningKey,
}

impl EcdsaKeyPair {
    /// Generate a new ECDSA P-256 key pair
    pub fn new() -> Result<Self> {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Ok(Self { signing_key })
    }

    /// Get private key in PKCS#8 DER format
    pub fn private_key_der(&self) -> Result<Vec<u8>> {
        self.signing_key
            .to_pkcs8_der()
            .map(|der| der.as_bytes().to_vec())
            .map_err(|e| PinError::InvalidKeyFormat(format!("PKCS#8 encoding error: {e}")))
    }

    /// Convert to rcgen KeyPair for certificate generation
    pub fn to_rcgen_key_pair(&self) -> Result<KeyPair> {
        let private_key_der = self.private_key_der()?;
        KeyPair::from_der(&private_key_der)
            .map_err(|e| PinError::InvalidKeyFormat(format!("rcgen KeyPair conversion error: {e}")))
    }

    /// Convert to OpenSSL PKey for signing operations
    pub fn to_openssl_pkey(&self) -> Result<PKey<Private>> {
        let private_key_der = self.private_key_der()?;
        PKey::private_key_from_der(&private_key_der).map_err(|e| {
            PinError::InvalidKeyFormat(format!("Failed to convert key to OpenSSL format: {e}"))
        })
    }
}

/// A leaf certificate together with its freshly generated private key
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    /// The signed leaf certificate
    pub certificate: X509Certificate,
    /// Leaf private key, PKCS#8 PEM
    pub private_key_pem: String,
}

impl IssuedCertificate {
    /// Concatenated private key, leaf certificate and CA certificate, the
    /// bundle a test server loads as a single file.
    pub fn private_key_and_cert_chain_pem(
        &self,
        ca_certificate: &X509Certificate,
    ) -> Result<String> {
        Ok(format!(
            "{}{}{}",
            self.private_key_pem,
            self.certificate.to_pem()?,
            ca_certificate.to_pem()?
        ))
    }
}

/// Certificate authority issuing throwaway X.509 certificates
#[derive(Debug, Clone)]
pub struct CertificateAuthority {
    ca_key_pair: EcdsaKeyPair,
    ca_certificate: X509Certificate,
}

impl CertificateAuthority {
    /// Create a new CA with a self-signed certificate
    pub fn new(common_name: &str) -> Result<Self> {
        let ca_key_pair = EcdsaKeyPair::new()?;
        let ca_certificate = Self::create_self_signed_certificate(&ca_key_pair, common_name)?;
        info!("created test CA '{common_name}'");

        Ok(Self {
            ca_key_pair,
            ca_certificate,
        })
    }

    /// Get the CA certificate
    pub fn ca_certificate(&self) -> &X509Certificate {
        &self.ca_certificate
    }

    /// Issue a leaf certificate for a hostname, signed by this CA.
    ///
    /// A fresh private key of the requested algorithm is generated for the
    /// leaf; the certificate carries the hostname as both subject CN and
    /// DNS subject alternative name.
    pub fn issue_certificate(
        &self,
        hostname: &str,
        key_type: KeyAlgorithm,
        validity_days: u32,
    ) -> Result<IssuedCertificate> {
        let leaf_key = generate_leaf_key(key_type)?;
        debug!("generated {key_type} leaf key for {hostname}");

        // The leaf issuer name is lifted from the CA certificate itself
        let ca_x509 = X509::from_der(self.ca_certificate.der_bytes())
            .map_err(|e| PinError::CertificateError(format!("Failed to load CA cert: {e}")))?;
        let ca_private_key = self.ca_key_pair.to_openssl_pkey()?;

        let mut cert_builder = X509Builder::new().map_err(|e| {
            PinError::CertificateError(format!("Failed to create certificate builder: {e}"))
        })?;

        cert_builder
            .set_version(2)
            .map_err(|e| PinError::CertificateError(format!("Failed to set version: {e}")))?;

        cert_builder
            .set_pubkey(&leaf_key)
            .map_err(|e| PinError::CertificateError(format!("Failed to set public key: {e}")))?;

        let mut name_builder = X509NameBuilder::new().map_err(|e| {
            PinError::CertificateError(format!("Failed to create name builder: {e}"))
        })?;
        name_builder
            .append_entry_by_nid(Nid::COMMONNAME, hostname)
            .map_err(|e| PinError::CertificateError(format!("Failed to set common name: {e}")))?;
        let subject_name = name_builder.build();

        cert_builder
            .set_subject_name(&subject_name)
            .map_err(|e| PinError::CertificateError(format!("Failed to set subject name: {e}")))?;
        cert_builder
            .set_issuer_name(ca_x509.subject_name())
            .map_err(|e| PinError::CertificateError(format!("Failed to set issuer name: {e}")))?;

        let not_before = openssl::asn1::Asn1Time::days_from_now(0).map_err(|e| {
            PinError::CertificateError(format!("Failed to create not_before time: {e}"))
        })?;
        let not_after = openssl::asn1::Asn1Time::days_from_now(validity_days).map_err(|e| {
            PinError::CertificateError(format!("Failed to create not_after time: {e}"))
        })?;
        cert_builder
            .set_not_before(&not_before)
            .map_err(|e| PinError::CertificateError(format!("Failed to set not_before: {e}")))?;
        cert_builder
            .set_not_after(&not_after)
            .map_err(|e| PinError::CertificateError(format!("Failed to set not_after: {e}")))?;

        let serial_number = {
            let mut bn = BigNum::new()
                .map_err(|e| PinError::CertificateError(format!("Failed to create BigNum: {e}")))?;
            bn.rand(64, MsbOption::MAYBE_ZERO, false).map_err(|e| {
                PinError::CertificateError(format!("Failed to generate random serial: {e}"))
            })?;
            bn.to_asn1_integer().map_err(|e| {
                PinError::CertificateError(format!("Failed to convert serial to ASN1: {e}"))
            })?
        };
        cert_builder
            .set_serial_number(&serial_number)
            .map_err(|e| PinError::CertificateError(format!("Failed to set serial number: {e}")))?;

        // Standard X.509v3 extensions for a TLS server certificate
        cert_builder
            .append_extension(BasicConstraints::new().build().map_err(|e| {
                PinError::CertificateError(format!("Failed to build basic constraints: {e}"))
            })?)
            .map_err(|e| {
                PinError::CertificateError(format!("Failed to add basic constraints: {e}"))
            })?;
        cert_builder
            .append_extension(
                KeyUsage::new()
                    .digital_signature()
                    .key_encipherment()
                    .build()
                    .map_err(|e| {
                        PinError::CertificateError(format!("Failed to build key usage: {e}"))
                    })?,
            )
            .map_err(|e| PinError::CertificateError(format!("Failed to add key usage: {e}")))?;
        cert_builder
            .append_extension(
                ExtendedKeyUsage::new()
                    .server_auth()
                    .client_auth()
                    .build()
                    .map_err(|e| {
                        PinError::CertificateError(format!(
                            "Failed to build extended key usage: {e}"
                        ))
                    })?,
            )
            .map_err(|e| {
                PinError::CertificateError(format!("Failed to add extended key usage: {e}"))
            })?;

        let subject_alt_name = SubjectAlternativeName::new()
            .dns(hostname)
            .build(&cert_builder.x509v3_context(None, None))
            .map_err(|e| PinError::CertificateError(format!("Failed to build SAN: {e}")))?;
        cert_builder
            .append_extension(subject_alt_name)
            .map_err(|e| PinError::CertificateError(format!("Failed to add SAN: {e}")))?;

        cert_builder
            .sign(&ca_private_key, MessageDigest::sha256())
            .map_err(|e| PinError::CertificateError(format!("Failed to sign certificate: {e}")))?;

        let openssl_cert = cert_builder.build();
        let cert_der = openssl_cert.to_der().map_err(|e| {
            PinError::CertificateError(format!("Failed to convert certificate to DER: {e}"))
        })?;

        let private_key_pem = leaf_key
            .private_key_to_pem_pkcs8()
            .map_err(|e| PinError::InvalidKeyFormat(format!("Failed to encode leaf key: {e}")))
            .and_then(|pem| {
                String::from_utf8(pem).map_err(|e| {
                    PinError::InvalidKeyFormat(format!("Leaf key PEM is not valid UTF-8: {e}"))
                })
            })?;

        info!("issued {key_type} certificate for {hostname}");

        Ok(IssuedCertificate {
            certificate: X509Certificate::from_der(cert_der)?,
            private_key_pem,
        })
    }

    /// Create the self-signed CA certificate
    fn create_self_signed_certificate(
        key_pair: &EcdsaKeyPair,
        common_name: &str,
    ) -> Result<X509Certificate> {
        let mut params = CertificateParams::new(vec![]);

        params.distinguished_name = rcgen::DistinguishedName::new();
        params
            .distinguished_name
            .push(rcgen::DnType::CommonName, common_name);
        params
            .distinguished_name
            .push(rcgen::DnType::OrganizationName, "Pinkit Test");
        params
            .distinguished_name
            .push(rcgen::DnType::CountryName, "US");

        params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
        params.key_usages = vec![
            rcgen::KeyUsagePurpose::KeyCertSign,
            rcgen::KeyUsagePurpose::CrlSign,
        ];

        let not_before = SystemTime::now();
        let not_after = not_before + Duration::from_secs(365 * 10 * 24 * 60 * 60);
        params.not_before = not_before.into();
        params.not_after = not_after.into();

        let rcgen_key_pair = key_pair.to_rcgen_key_pair()?;
        params.key_pair = Some(rcgen_key_pair);

        let cert = RcgenCertificate::from_params(params).map_err(|e| {
            PinError::CertificateError(format!("Failed to build CA certificate: {e}"))
        })?;
        let cert_der = cert.serialize_der().map_err(|e| {
            PinError::CertificateError(format!("Failed to serialize CA certificate: {e}"))
        })?;

        X509Certificate::from_der(cert_der)
    }
}

/// Generate a fresh leaf private key of the requested algorithm
fn generate_leaf_key(key_type: KeyAlgorithm) -> Result<PKey<Private>> {
    let pkey = match key_type {
        KeyAlgorithm::Rsa2048 | KeyAlgorithm::Rsa4096 => {
            let bits = match key_type {
                KeyAlgorithm::Rsa2048 => 2048,
                _ => 4096,
            };
            let rsa = Rsa::generate(bits).map_err(|e| {
                PinError::CertificateError(format!("Failed to generate RSA key: {e}"))
            })?;
            PKey::from_rsa(rsa)
                .map_err(|e| PinError::InvalidKeyFormat(format!("RSA key wrap error: {e}")))?
        }
        KeyAlgorithm::EcdsaP256 | KeyAlgorithm::EcdsaP384 => {
            let nid = match key_type {
                KeyAlgorithm::EcdsaP256 => Nid::X9_62_PRIME256V1,
                _ => Nid::SECP384R1,
            };
            let group = EcGroup::from_curve_name(nid).map_err(|e| {
                PinError::CertificateError(format!("Failed to load EC group: {e}"))
            })?;
            let ec_key = EcKey::generate(&group).map_err(|e| {
                PinError::CertificateError(format!("Failed to generate EC key: {e}"))
            })?;
            PKey::from_ec_key(ec_key)
                .map_err(|e| PinError::InvalidKeyFormat(format!("EC key wrap error: {e}")))?
        }
    };
    Ok(pkey)
}
