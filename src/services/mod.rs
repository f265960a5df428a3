//! Service layer orchestrating the signing pipeline.
//!
//! - [`digest::DigestEngine`] computes the SHA-256 digest of the
//!   to-be-signed buffer
//! - [`pipeline`] runs the locate, acquire, digest and sign phases
//! - [`session::SigningIdentity`] is the caller-facing session type

pub mod digest;
pub mod pipeline;
pub mod session;

pub use digest::DigestEngine;
pub use session::{IdentityConfig, SigningIdentity};
