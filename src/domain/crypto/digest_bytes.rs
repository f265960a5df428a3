use std::fmt;

use crate::domain::constants::SHA256_DIGEST_LEN;

/// Strongly typed SHA-256 digest bytes.
///
/// Invariant: `bytes.len() == SHA256_DIGEST_LEN`.
#[derive(Clone, Eq, PartialEq)]
pub struct DigestBytes {
    bytes: Box<[u8]>,
}

impl DigestBytes {
    pub fn new(bytes: Vec<u8>) -> Result<Self, DigestBytesError> {
        if bytes.len() != SHA256_DIGEST_LEN {
            return Err(DigestBytesError::LengthMismatch {
                expected: SHA256_DIGEST_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes.into()
    }
}

impl fmt::Debug for DigestBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DigestBytes(len={})", self.bytes.len())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DigestBytesError {
    #[error("digest length mismatch (expected {expected}, actual {actual})")]
    LengthMismatch { expected: usize, actual: usize },
}
