//! Certificate-store backed signing.
//!
//! Signs byte buffers with a private key that lives in a protected
//! certificate store, without ever exporting the key material. A signing
//! identity names a store, a subject substring and a key type; each sign
//! call locates the certificate, acquires a handle to its private key,
//! hashes the input with SHA-256 and invokes the store's signing
//! primitive. RSA identities sign with PSS padding (32-byte salt);
//! elliptic-curve identities sign raw ECDSA, and the fixed-width `r‖s`
//! result is re-encoded into the DER `Ecdsa-Sig-Value` form expected by
//! TLS and X.509 consumers.
//!
//! Store access goes through the [`CertStoreProvider`] seam;
//! [`SoftwareKeyStore`] is the in-process backend.

pub mod adapters;
pub mod domain;
pub mod infra;
pub mod services;

use std::sync::Arc;

pub use adapters::store::{
    load_pem_directory, AcquiredKey, CertStoreProvider, Handle, KeyAccess, PrivateKeyMaterial,
    ScopedHandle, SignaturePadding, SoftwareKeyStore,
};
pub use domain::crypto::{
    DerEcdsaSignature, DigestBytes, DigestBytesError, RawEcdsaSignature, SignatureFormatError,
};
pub use domain::types::{KeyKind, KeySpec, StoreName, StoreScope, SubjectFilter};
pub use infra::config::IdentityConfigFile;
pub use infra::error::{SignError, SignResult};
pub use services::{DigestEngine, IdentityConfig, SigningIdentity};

/// One-shot convenience: build a session for `config` and sign a single
/// buffer with it.
pub fn sign_buffer(
    provider: Arc<dyn CertStoreProvider>,
    config: IdentityConfig,
    to_be_signed: &[u8],
) -> SignResult<Vec<u8>> {
    SigningIdentity::new(provider, config).sign(to_be_signed)
}
