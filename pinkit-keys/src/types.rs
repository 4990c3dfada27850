//! Core types for certificate pin derivation.
//!
//! Intention: keep the encoding tag and the recognized key-algorithm set as
//! closed enumerations so every other module can match exhaustively.

use crate::error::PinError;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/* --------------------------- Certificate encoding ------------------------ */

/// Encoding of raw certificate bytes. The tag is always supplied by the
/// caller; nothing in this crate auto-detects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateEncoding {
    Pem,
    Der,
}

impl FromStr for CertificateEncoding {
    type Err = PinError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("pem") {
            Ok(CertificateEncoding::Pem)
        } else if s.eq_ignore_ascii_case("der") {
            Ok(CertificateEncoding::Der)
        } else {
            Err(PinError::UnsupportedEncoding(s.to_string()))
        }
    }
}

impl Display for CertificateEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CertificateEncoding::Pem => write!(f, "PEM"),
            CertificateEncoding::Der => write!(f, "DER"),
        }
    }
}

/* ----------------------------- Key algorithms ---------------------------- */

/// The closed set of public-key algorithms a pin can be derived for.
///
/// Anything outside this set fails classification; no pin is ever computed
/// for an unrecognized algorithm, size or curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa2048,
    Rsa4096,
    EcdsaP256,
    EcdsaP384,
}

impl KeyAlgorithm {
    /// Human-readable label, e.g. `RSA-2048`.
    pub fn label(&self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa2048 => "RSA-2048",
            KeyAlgorithm::Rsa4096 => "RSA-4096",
            KeyAlgorithm::EcdsaP256 => "ECDSA-P256",
            KeyAlgorithm::EcdsaP384 => "ECDSA-P384",
        }
    }

    /// TrustKit constant name for pinning configuration blocks.
    pub fn trustkit_constant(&self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa2048 => "kTSKAlgorithmRsa2048",
            KeyAlgorithm::Rsa4096 => "kTSKAlgorithmRsa4096",
            KeyAlgorithm::EcdsaP256 => "kTSKAlgorithmEcDsaSecp256r1",
            KeyAlgorithm::EcdsaP384 => "kTSKAlgorithmEcDsaSecp384r1",
        }
    }
}

impl Display for KeyAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = PinError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rsa2048" | "rsa-2048" => Ok(KeyAlgorithm::Rsa2048),
            "rsa4096" | "rsa-4096" => Ok(KeyAlgorithm::Rsa4096),
            "p256" | "ecdsa-p256" | "prime256v1" | "secp256r1" => Ok(KeyAlgorithm::EcdsaP256),
            "p384" | "ecdsa-p384" | "secp384r1" => Ok(KeyAlgorithm::EcdsaP384),
            other => Err(PinError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_tags_parse_case_insensitively() {
        assert_eq!(
            "PEM".parse::<CertificateEncoding>().unwrap(),
            CertificateEncoding::Pem
        );
        assert_eq!(
            "der".parse::<CertificateEncoding>().unwrap(),
            CertificateEncoding::Der
        );
    }

    #[test]
    fn unknown_encoding_tag_is_rejected() {
        let err = "PKCS12".parse::<CertificateEncoding>().unwrap_err();
        assert!(matches!(err, PinError::UnsupportedEncoding(_)));
    }

    #[test]
    fn algorithm_labels_and_constants() {
        assert_eq!(KeyAlgorithm::Rsa2048.label(), "RSA-2048");
        assert_eq!(
            KeyAlgorithm::Rsa2048.trustkit_constant(),
            "kTSKAlgorithmRsa2048"
        );
        assert_eq!(KeyAlgorithm::EcdsaP384.label(), "ECDSA-P384");
        assert_eq!(
            KeyAlgorithm::EcdsaP256.trustkit_constant(),
            "kTSKAlgorithmEcDsaSecp256r1"
        );
    }

    #[test]
    fn key_type_flags_parse() {
        assert_eq!(
            "rsa2048".parse::<KeyAlgorithm>().unwrap(),
            KeyAlgorithm::Rsa2048
        );
        assert_eq!(
            "p384".parse::<KeyAlgorithm>().unwrap(),
            KeyAlgorithm::EcdsaP384
        );
        assert!("ed25519".parse::<KeyAlgorithm>().is_err());
    }
}
