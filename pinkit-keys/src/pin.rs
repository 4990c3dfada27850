//! SPKI pin derivation.
//!
//! A pin is the standard base64 encoding of SHA-256 over the certificate's
//! DER `SubjectPublicKeyInfo`. The key algorithm is classified first, from
//! structured fields (algorithm OID, RSA modulus length, named-curve OID);
//! if classification fails no pin is computed.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use log::debug;
use sha2::{Digest, Sha256};
use x509_parser::oid_registry::{OID_KEY_TYPE_EC_PUBLIC_KEY, OID_PKCS1_RSAENCRYPTION};
use x509_parser::public_key::PublicKey;
use x509_parser::x509::SubjectPublicKeyInfo;

use crate::certificate::X509Certificate;
use crate::error::{PinError, Result};
use crate::types::{CertificateEncoding, KeyAlgorithm};

// Named-curve OIDs carried in the EC AlgorithmIdentifier parameters
const OID_CURVE_PRIME256V1: &str = "1.2.840.10045.3.1.7";
const OID_CURVE_SECP384R1: &str = "1.3.132.0.34";

/// A derived pin together with the classified key algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpkiPin {
    /// Classified public-key algorithm of the certificate
    pub algorithm: KeyAlgorithm,
    /// Standard base64 of SHA-256 over the SPKI DER, 44 characters
    pub pin: String,
}

/// Derive the SPKI pin from raw certificate bytes with an explicit encoding
/// tag.
pub fn compute_pin(certificate_bytes: &[u8], encoding: CertificateEncoding) -> Result<SpkiPin> {
    let certificate = X509Certificate::from_bytes(certificate_bytes, encoding)?;
    pin_from_certificate(&certificate)
}

/// Derive the SPKI pin from an already-decoded certificate.
pub fn pin_from_certificate(certificate: &X509Certificate) -> Result<SpkiPin> {
    let parsed = certificate.parsed()?;
    let spki = parsed.public_key();

    let algorithm = classify_public_key(spki)?;
    debug!("classified certificate public key as {algorithm}");

    let digest = Sha256::digest(spki.raw);
    let pin = BASE64_STANDARD.encode(digest);

    Ok(SpkiPin { algorithm, pin })
}

/// Classify the public key from the SPKI algorithm identifier.
fn classify_public_key(spki: &SubjectPublicKeyInfo) -> Result<KeyAlgorithm> {
    let alg_oid = &spki.algorithm.algorithm;

    if *alg_oid == OID_PKCS1_RSAENCRYPTION {
        let public_key = spki.parsed().map_err(|e| {
            PinError::DecodeError(format!("Failed to parse RSA public key: {e}"))
        })?;
        let modulus = match public_key {
            PublicKey::RSA(rsa) => rsa.modulus,
            _ => {
                return Err(PinError::DecodeError(
                    "rsaEncryption SPKI does not contain an RSA key".to_string(),
                ))
            }
        };
        match rsa_modulus_bits(modulus) {
            2048 => Ok(KeyAlgorithm::Rsa2048),
            4096 => Ok(KeyAlgorithm::Rsa4096),
            other => Err(PinError::UnsupportedAlgorithm(format!(
                "rsaEncryption with {other} bit key"
            ))),
        }
    } else if *alg_oid == OID_KEY_TYPE_EC_PUBLIC_KEY {
        let params = spki.algorithm.parameters.as_ref().ok_or_else(|| {
            PinError::UnsupportedAlgorithm("id-ecPublicKey without curve parameters".to_string())
        })?;
        let curve_oid = params.as_oid().map_err(|_| {
            PinError::UnsupportedAlgorithm(
                "id-ecPublicKey parameters are not a named curve".to_string(),
            )
        })?;
        match curve_oid.to_id_string().as_str() {
            OID_CURVE_PRIME256V1 => Ok(KeyAlgorithm::EcdsaP256),
            OID_CURVE_SECP384R1 => Ok(KeyAlgorithm::EcdsaP384),
            other => Err(PinError::UnsupportedAlgorithm(format!(
                "id-ecPublicKey on curve {other}"
            ))),
        }
    } else {
        Err(PinError::UnsupportedAlgorithm(alg_oid.to_id_string()))
    }
}

/// Bit length of an RSA modulus as encoded in a DER INTEGER, which may carry
/// leading zero bytes.
fn rsa_modulus_bits(modulus: &[u8]) -> usize {
    let significant = match modulus.iter().position(|&b| b != 0) {
        Some(index) => &modulus[index..],
        None => &[],
    };
    significant.len() * 8
}
