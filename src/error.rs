//! use certforge::error::CertForgeError;

use thiserror::Error;

use crate::key::DigestAlgorithm;

/// Represents errors that can occur while building, signing or encoding certificates.
///
/// Every failure is terminal for the issuance run that produced it: callers restart
/// the builder sequence from scratch.
#[derive(Debug, Error, Clone)]
pub enum CertForgeError {
    /// A required builder field was not set before signing.
    #[error("Incomplete certificate request: missing {0}")]
    IncompleteRequest(&'static str),

    /// Unsupported key size or algorithm, or a key that does not match the algorithm.
    #[error("Invalid key specification: {0}")]
    InvalidKeySpec(String),

    /// The requested digest cannot be used for signing.
    #[error("Unsupported digest algorithm: {0}")]
    UnsupportedDigest(DigestAlgorithm),

    /// Error during DER or PEM encoding.
    #[error("Failed to serialize data: {0}")]
    SerializationError(String),

    /// Error during DER or PEM decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Signing failed, or a signature did not verify.
    #[error("Signature error: {0}")]
    SignatureError(String),
}

pub type Result<T> = std::result::Result<T, CertForgeError>;

impl From<der::Error> for CertForgeError {
    /// Converts a `der::Error` into a `CertForgeError`.
    fn from(err: der::Error) -> Self {
        CertForgeError::DecodingError(err.to_string())
    }
}

impl From<rsa::Error> for CertForgeError {
    fn from(err: rsa::Error) -> Self {
        CertForgeError::InvalidKeySpec(err.to_string())
    }
}

impl From<rsa::pkcs1::Error> for CertForgeError {
    fn from(err: rsa::pkcs1::Error) -> Self {
        CertForgeError::DecodingError(err.to_string())
    }
}

impl From<pkcs8::Error> for CertForgeError {
    fn from(err: pkcs8::Error) -> Self {
        CertForgeError::DecodingError(err.to_string())
    }
}

impl From<pkcs8::spki::Error> for CertForgeError {
    fn from(err: pkcs8::spki::Error) -> Self {
        CertForgeError::DecodingError(err.to_string())
    }
}

impl From<p256::elliptic_curve::Error> for CertForgeError {
    fn from(err: p256::elliptic_curve::Error) -> Self {
        CertForgeError::DecodingError(err.to_string())
    }
}

impl From<pem::PemError> for CertForgeError {
    fn from(err: pem::PemError) -> Self {
        CertForgeError::DecodingError(err.to_string())
    }
}
