use thiserror::Error;

/// Error types for the pinkit-keys crate
#[derive(Error, Debug)]
pub enum PinError {
    #[error("Could not open certificate input: {0}")]
    InputNotFound(String),

    #[error("Invalid certificate encoding {0}; expected DER or PEM")]
    UnsupportedEncoding(String),

    #[error("Certificate decode error: {0}")]
    DecodeError(String),

    #[error("Certificate key algorithm not supported: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Certificate error: {0}")]
    CertificateError(String),

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for pinkit-keys operations
pub type Result<T> = std::result::Result<T, PinError>;
