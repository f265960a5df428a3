//! Core domain layer.
//!
//! Pure types with no provider dependencies: validated identifiers for
//! store lookup, digest and signature value wrappers, and the conversion
//! between raw and DER ECDSA signature representations.

pub mod constants;
pub mod crypto;
pub mod types;
