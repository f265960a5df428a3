//! Error types for certificate-store signing operations.
//!
//! Each failure class is a distinct variant so callers can tell conditions
//! apart by kind rather than by message text. Every error aborts the
//! current signing call; there is no retry at this layer.

use thiserror::Error;

use crate::domain::crypto::SignatureFormatError;

/// Result type for signing operations
pub type SignResult<T> = Result<T, SignError>;

/// Error taxonomy for the signing pipeline
#[derive(Error, Debug, miette::Diagnostic)]
pub enum SignError {
    /// The named certificate store could not be opened.
    #[error("certificate store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store opened, but no certificate matched the subject filter.
    #[error("certificate not found: {0}")]
    CertificateNotFound(String),

    /// The certificate has no accessible modern-provider private key.
    #[error("private key unavailable: {0}")]
    PrivateKeyUnavailable(String),

    /// Hash computation failed.
    #[error("digest computation failed: {0}")]
    DigestFailed(String),

    /// The signing primitive failed or reported an invalid length.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// The raw-to-DER signature conversion failed.
    #[error("signature encoding failed: {0}")]
    EncodingFailed(String),

    /// The caller-provided output buffer cannot hold the signature.
    #[error("output buffer too small (required {required}, provided {provided})")]
    OutputBufferTooSmall { required: usize, provided: usize },

    /// Rejected input: empty names, unparsable certificates, unknown handles.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration file loading or validation failed.
    #[error("configuration error: {0}")]
    ConfigurationError(String),
}

impl From<SignatureFormatError> for SignError {
    fn from(error: SignatureFormatError) -> Self {
        SignError::EncodingFailed(error.to_string())
    }
}

impl From<der::Error> for SignError {
    fn from(error: der::Error) -> Self {
        SignError::EncodingFailed(error.to_string())
    }
}
