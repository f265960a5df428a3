//! Foundational cryptographic domain types.
//!
//! Provides strongly-typed wrappers for cryptographic artifacts:
//! - Digest values with size validation
//! - Raw fixed-width and DER-encoded ECDSA signature values, with the
//!   conversion between the two representations

mod digest_bytes;
mod signature;

pub use digest_bytes::{DigestBytes, DigestBytesError};
pub use signature::{DerEcdsaSignature, RawEcdsaSignature, SignatureFormatError};
