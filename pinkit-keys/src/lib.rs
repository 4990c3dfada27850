//! Pinkit Keys – public API facade
//!
//! Certificate decoding, HPKP/TrustKit SPKI pin derivation and throwaway
//! test certificate authority emulation.

pub mod authority;
pub mod certificate;
pub mod error;
pub mod pin;
pub mod types;

pub use error::{PinError, Result};

pub use types::{CertificateEncoding, KeyAlgorithm};

pub use certificate::X509Certificate;

pub use pin::{compute_pin, pin_from_certificate, SpkiPin};

pub use authority::{CertificateAuthority, IssuedCertificate};
