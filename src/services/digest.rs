//! SHA-256 digest computation for to-be-signed buffers.

use sha2::{Digest, Sha256};

use crate::domain::crypto::DigestBytes;
use crate::infra::error::{SignError, SignResult};

/// Fixed-algorithm digest engine.
///
/// The output length is queried from the hash implementation at runtime
/// and the destination buffer allocated to that size before finalization,
/// so the engine never assumes a digest width the implementation does not
/// report.
pub struct DigestEngine;

impl DigestEngine {
    /// Digest output length in bytes.
    #[must_use]
    pub fn output_len() -> usize {
        <Sha256 as Digest>::output_size()
    }

    /// Hash the entire buffer in one pass.
    pub fn compute(to_be_signed: &[u8]) -> SignResult<DigestBytes> {
        let expected = Self::output_len();
        let mut out = vec![0u8; expected];

        let mut hasher = Sha256::new();
        hasher.update(to_be_signed);
        let digest = hasher.finalize();

        if digest.len() != expected {
            return Err(SignError::DigestFailed(format!(
                "hash produced {} bytes, expected {expected}",
                digest.len()
            )));
        }
        out.copy_from_slice(&digest);

        DigestBytes::new(out).map_err(|e| SignError::DigestFailed(e.to_string()))
    }
}
