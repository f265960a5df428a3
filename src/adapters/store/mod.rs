//! Certificate-store provider interface.
//!
//! Providers hand out opaque handles for open stores, located certificates
//! and acquired private keys. Every handle must be released exactly once;
//! [`ScopedHandle`] ties release to scope exit so all pipeline paths,
//! including early failures, release what they acquired. Private key
//! material never crosses this interface in either direction.

use std::fmt;
use std::sync::Arc;

use crate::domain::types::{KeySpec, StoreName, StoreScope, SubjectFilter};
use crate::infra::error::SignResult;

mod memory;
mod pem;

pub use memory::{PrivateKeyMaterial, SoftwareKeyStore};
pub use pem::load_pem_directory;

/// Opaque provider handle. Meaningful only to the provider that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u64);

impl Handle {
    #[must_use]
    pub fn from_raw(raw: u64) -> Self {
        Handle(raw)
    }

    #[must_use]
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which private-key provider classes an acquisition will accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAccess {
    /// Accept only modern-provider keys; the signing pipeline always uses
    /// this.
    ModernOnly,
    /// Accept any provider class. Diagnostic use; such keys still cannot
    /// sign unless they are modern-provider keys.
    AnyProvider,
}

/// Result of a private-key acquisition.
#[derive(Debug, Clone, Copy)]
pub struct AcquiredKey {
    pub handle: Handle,
    pub spec: KeySpec,
}

/// Padding selection passed to the signing primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignaturePadding {
    /// RSA probabilistic signature scheme over SHA-256.
    Pss { salt_len: usize },
    /// No padding parameter; raw ECDSA over the digest.
    None,
}

/// A certificate store backend.
///
/// `sign_digest` follows the query-size-then-fill shape: called with no
/// output buffer it returns the required signature length without signing;
/// called with a buffer it signs and returns the written length. EC
/// signatures come back in fixed-width `r‖s` form; encoding to DER is the
/// pipeline's job, not the provider's.
pub trait CertStoreProvider: Send + Sync {
    /// Open a named store within a scope.
    fn open_store(&self, name: &StoreName, scope: StoreScope) -> SignResult<Handle>;

    /// Find the first certificate in an open store whose subject matches
    /// the filter.
    fn find_certificate(&self, store: Handle, subject: &SubjectFilter) -> SignResult<Handle>;

    /// DER bytes of a located certificate.
    fn certificate_der(&self, cert: Handle) -> SignResult<Vec<u8>>;

    /// Acquire the private key associated with a located certificate.
    fn acquire_key(&self, cert: Handle, access: KeyAccess) -> SignResult<AcquiredKey>;

    /// Sign a digest, or report the required signature length when `out`
    /// is `None`.
    fn sign_digest(
        &self,
        key: Handle,
        padding: SignaturePadding,
        digest: &[u8],
        out: Option<&mut [u8]>,
    ) -> SignResult<usize>;

    /// Release a handle. Each handle may be released at most once.
    fn release(&self, handle: Handle) -> SignResult<()>;

    /// Number of currently open handles, for leak diagnostics.
    fn open_handle_count(&self) -> usize;
}

/// Releases a provider handle when it goes out of scope.
pub struct ScopedHandle {
    provider: Arc<dyn CertStoreProvider>,
    handle: Handle,
}

impl ScopedHandle {
    #[must_use]
    pub fn new(provider: Arc<dyn CertStoreProvider>, handle: Handle) -> Self {
        Self { provider, handle }
    }

    #[must_use]
    pub fn handle(&self) -> Handle {
        self.handle
    }
}

impl Drop for ScopedHandle {
    fn drop(&mut self) {
        if let Err(e) = self.provider.release(self.handle) {
            log::warn!("failed to release handle {}: {e}", self.handle);
        }
    }
}

impl fmt::Debug for ScopedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopedHandle({})", self.handle)
    }
}
