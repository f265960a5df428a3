//! Caller-facing signing session.
//!
//! A [`SigningIdentity`] pairs an identity configuration with a store
//! provider. Construction never touches the store; errors surface on the
//! first sign call. Every sign call re-opens the store, re-locates the
//! certificate and re-acquires the key, so each call re-validates that
//! the key is still available.

use std::sync::Arc;

use crate::adapters::store::CertStoreProvider;
use crate::domain::types::{KeyKind, StoreName, StoreScope, SubjectFilter};
use crate::infra::error::{SignError, SignResult};
use crate::services::pipeline::SignPipeline;

/// Identity settings for one signing session.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Certificate store to open.
    pub store_name: StoreName,
    /// Store scope: per-user or machine-wide.
    pub scope: StoreScope,
    /// Subject substring locating the signer certificate.
    pub subject: SubjectFilter,
    /// Expected key type; selects padding and signature encoding.
    pub key_kind: KeyKind,
    /// Emit step-by-step pipeline tracing at debug level.
    pub trace: bool,
}

impl IdentityConfig {
    #[must_use]
    pub fn new(
        store_name: StoreName,
        scope: StoreScope,
        subject: SubjectFilter,
        key_kind: KeyKind,
    ) -> Self {
        Self {
            store_name,
            scope,
            subject,
            key_kind,
            trace: false,
        }
    }

    #[must_use]
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

/// A signing session bound to one certificate-store identity.
///
/// Owns no provider handles between calls; everything acquired during a
/// sign call is released before the call returns, on success and on
/// failure alike.
pub struct SigningIdentity {
    provider: Arc<dyn CertStoreProvider>,
    config: IdentityConfig,
}

impl SigningIdentity {
    /// Create a session. Never fails; store access is deferred to the
    /// first sign call.
    #[must_use]
    pub fn new(provider: Arc<dyn CertStoreProvider>, config: IdentityConfig) -> Self {
        Self { provider, config }
    }

    #[must_use]
    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// Sign a buffer, returning the wire-format signature.
    ///
    /// RSA identities produce a PSS signature whose length equals the key
    /// modulus length; ECDSA identities produce a DER `Ecdsa-Sig-Value`
    /// whose length varies with the curve and the scalar values.
    pub fn sign(&self, to_be_signed: &[u8]) -> SignResult<Vec<u8>> {
        SignPipeline::new(&self.provider, &self.config).run(to_be_signed)
    }

    /// Sign a buffer into a caller-owned output buffer, returning the
    /// signature length.
    ///
    /// The buffer must be large enough for the largest signature the
    /// identity can produce; this call never grows it.
    pub fn sign_into(&self, to_be_signed: &[u8], out: &mut [u8]) -> SignResult<usize> {
        let signature = self.sign(to_be_signed)?;
        if out.len() < signature.len() {
            return Err(SignError::OutputBufferTooSmall {
                required: signature.len(),
                provided: out.len(),
            });
        }
        out[..signature.len()].copy_from_slice(&signature);
        Ok(signature.len())
    }
}
