//! The four-phase signing pipeline.
//!
//! Each call runs locate, acquire-key, digest and sign-and-encode in
//! strict sequence on the calling thread. Provider handles are wrapped in
//! scope guards immediately on acquisition, so every exit path releases
//! exactly what it acquired. There is no retry: the first failing phase
//! aborts the call.

use std::sync::Arc;

use crate::adapters::store::{
    CertStoreProvider, KeyAccess, ScopedHandle, SignaturePadding,
};
use crate::domain::crypto::{DerEcdsaSignature, DigestBytes, RawEcdsaSignature};
use crate::domain::types::{KeyKind, KeySpec};
use crate::infra::error::{SignError, SignResult};
use crate::services::digest::DigestEngine;
use crate::services::session::IdentityConfig;

pub(crate) struct SignPipeline<'a> {
    provider: &'a Arc<dyn CertStoreProvider>,
    config: &'a IdentityConfig,
}

impl<'a> SignPipeline<'a> {
    pub(crate) fn new(provider: &'a Arc<dyn CertStoreProvider>, config: &'a IdentityConfig) -> Self {
        Self { provider, config }
    }

    /// Run the full pipeline and return the wire-format signature.
    pub(crate) fn run(&self, to_be_signed: &[u8]) -> SignResult<Vec<u8>> {
        self.trace(format_args!(
            "signing {} bytes with {} key from {} store '{}', subject '{}'",
            to_be_signed.len(),
            self.config.key_kind,
            self.config.scope,
            self.config.store_name,
            self.config.subject,
        ));

        let store = self.open_store()?;
        let cert = self.locate_certificate(&store)?;
        let key = self.acquire_key(&cert)?;
        let digest = self.compute_digest(to_be_signed)?;
        self.sign_and_encode(&key, &digest)
    }

    fn open_store(&self) -> SignResult<ScopedHandle> {
        let handle = self
            .provider
            .open_store(&self.config.store_name, self.config.scope)?;
        self.trace(format_args!("opened store {handle}"));
        Ok(ScopedHandle::new(self.provider.clone(), handle))
    }

    fn locate_certificate(&self, store: &ScopedHandle) -> SignResult<ScopedHandle> {
        let handle = self
            .provider
            .find_certificate(store.handle(), &self.config.subject)?;
        self.trace(format_args!("located signer certificate {handle}"));
        Ok(ScopedHandle::new(self.provider.clone(), handle))
    }

    fn acquire_key(&self, cert: &ScopedHandle) -> SignResult<ScopedHandle> {
        let acquired = self
            .provider
            .acquire_key(cert.handle(), KeyAccess::ModernOnly)?;
        self.trace(format_args!(
            "acquired private key {} ({})",
            acquired.handle, acquired.spec
        ));
        if acquired.spec == KeySpec::LegacyProvider {
            log::warn!("acquired a legacy-provider key despite modern-only access");
        }
        Ok(ScopedHandle::new(self.provider.clone(), acquired.handle))
    }

    fn compute_digest(&self, to_be_signed: &[u8]) -> SignResult<DigestBytes> {
        let digest = DigestEngine::compute(to_be_signed)?;
        self.trace(format_args!("computed {}-byte digest", digest.len()));
        Ok(digest)
    }

    /// Sign the digest with the two-phase sizing protocol, then shape the
    /// result for the wire.
    ///
    /// Padding selection and signature encoding both depend on the key
    /// kind, but deliberately at two separate decision points: the first
    /// chooses how the provider signs, the second chooses how the result
    /// is re-encoded.
    fn sign_and_encode(&self, key: &ScopedHandle, digest: &DigestBytes) -> SignResult<Vec<u8>> {
        let padding = match self.config.key_kind {
            KeyKind::Rsa => SignaturePadding::Pss {
                salt_len: digest.len(),
            },
            KeyKind::Ecdsa => SignaturePadding::None,
        };

        let required =
            self.provider
                .sign_digest(key.handle(), padding, digest.as_slice(), None)?;
        if required == 0 {
            return Err(SignError::SigningFailed(
                "signing primitive reported a zero-length signature".to_string(),
            ));
        }
        self.trace(format_args!("provider requires {required}-byte signature"));

        let mut signature = vec![0u8; required];
        let written = self.provider.sign_digest(
            key.handle(),
            padding,
            digest.as_slice(),
            Some(&mut signature),
        )?;
        if written == 0 || written > signature.len() {
            return Err(SignError::SigningFailed(format!(
                "signing primitive wrote {written} bytes into a {required}-byte buffer"
            )));
        }
        signature.truncate(written);

        match self.config.key_kind {
            KeyKind::Rsa => {
                self.trace(format_args!("RSA signature, {written} bytes"));
                Ok(signature)
            }
            KeyKind::Ecdsa => {
                let raw = RawEcdsaSignature::new(signature)?;
                let encoded = DerEcdsaSignature::from_raw(&raw)?;
                self.trace(format_args!(
                    "converted {}-byte raw ECDSA signature to {}-byte DER",
                    raw.as_slice().len(),
                    encoded.len()
                ));
                Ok(encoded.into_vec())
            }
        }
    }

    fn trace(&self, args: std::fmt::Arguments<'_>) {
        if self.config.trace {
            log::debug!(target: "certstore_signer", "{args}");
        }
    }
}
