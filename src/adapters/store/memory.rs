//! In-process software certificate store.
//!
//! Backs the [`CertStoreProvider`] interface with keys held in process
//! memory. Installed private keys are reachable only through opaque
//! handles and the `sign_digest` operation; nothing returns key material.
//! All open handles live in one table so leak checks can count them.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use der::Decode;
use rsa::traits::PublicKeyParts;
use rsa::Pss;
use sha2::Sha256;
use signature::hazmat::PrehashSigner;

use crate::domain::constants::{P256_ORDER_LEN, P384_ORDER_LEN};
use crate::domain::types::{KeySpec, StoreName, StoreScope, SubjectFilter};
use crate::infra::error::{SignError, SignResult};

use super::{AcquiredKey, CertStoreProvider, Handle, KeyAccess, SignaturePadding};

/// Private key material accepted at installation time.
///
/// Consumed by [`SoftwareKeyStore::install_certificate`]; there is no
/// accessor that returns it.
pub enum PrivateKeyMaterial {
    Rsa(rsa::RsaPrivateKey),
    EcP256(p256::ecdsa::SigningKey),
    EcP384(p384::ecdsa::SigningKey),
}

struct CertRecord {
    subject: String,
    der: Arc<[u8]>,
    key: Option<Arc<PrivateKeyMaterial>>,
    spec: KeySpec,
}

#[derive(Default)]
struct StoreRecord {
    entries: Vec<Arc<CertRecord>>,
}

enum HandleEntry {
    /// Snapshot of the store contents at open time.
    Store { entries: Vec<Arc<CertRecord>> },
    Cert(Arc<CertRecord>),
    Key {
        key: Arc<PrivateKeyMaterial>,
        spec: KeySpec,
    },
}

#[derive(Default)]
struct HandleTable {
    next_id: u64,
    entries: HashMap<u64, HandleEntry>,
}

impl HandleTable {
    fn insert(&mut self, entry: HandleEntry) -> Handle {
        self.next_id += 1;
        self.entries.insert(self.next_id, entry);
        Handle::from_raw(self.next_id)
    }

    fn get(&self, handle: Handle) -> Option<&HandleEntry> {
        self.entries.get(&handle.as_raw())
    }

    fn remove(&mut self, handle: Handle) -> Option<HandleEntry> {
        self.entries.remove(&handle.as_raw())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Default)]
struct Inner {
    stores: BTreeMap<(StoreScope, String), StoreRecord>,
    handles: HandleTable,
}

/// Software-backed certificate store provider.
#[derive(Default)]
pub struct SoftwareKeyStore {
    inner: Mutex<Inner>,
}

impl SoftwareKeyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty named store. Idempotent.
    pub fn create_store(&self, scope: StoreScope, name: &StoreName) {
        self.inner()
            .stores
            .entry((scope, name.normalized()))
            .or_default();
    }

    /// Install a certificate with an optional modern-provider private key.
    ///
    /// The subject is extracted from the certificate DER. Creates the
    /// store if it does not exist yet.
    pub fn install_certificate(
        &self,
        scope: StoreScope,
        store: &StoreName,
        cert_der: &[u8],
        key: Option<PrivateKeyMaterial>,
    ) -> SignResult<()> {
        self.install(scope, store, cert_der, key, KeySpec::ModernProvider)
    }

    /// Install a certificate whose private key is only reachable through a
    /// legacy provider. Such keys are rejected by modern-only acquisition.
    pub fn install_legacy_certificate(
        &self,
        scope: StoreScope,
        store: &StoreName,
        cert_der: &[u8],
        key: PrivateKeyMaterial,
    ) -> SignResult<()> {
        self.install(scope, store, cert_der, Some(key), KeySpec::LegacyProvider)
    }

    fn install(
        &self,
        scope: StoreScope,
        store: &StoreName,
        cert_der: &[u8],
        key: Option<PrivateKeyMaterial>,
        spec: KeySpec,
    ) -> SignResult<()> {
        let cert = x509_cert::Certificate::from_der(cert_der).map_err(|e| {
            SignError::InvalidInput(format!("certificate DER does not parse: {e}"))
        })?;
        let subject = cert.tbs_certificate.subject.to_string();

        let record = Arc::new(CertRecord {
            subject,
            der: cert_der.to_vec().into(),
            key: key.map(Arc::new),
            spec,
        });

        self.inner()
            .stores
            .entry((scope, store.normalized()))
            .or_default()
            .entries
            .push(record);
        Ok(())
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn required_signature_len(key: &PrivateKeyMaterial) -> usize {
    match key {
        PrivateKeyMaterial::Rsa(k) => k.size(),
        PrivateKeyMaterial::EcP256(_) => P256_ORDER_LEN * 2,
        PrivateKeyMaterial::EcP384(_) => P384_ORDER_LEN * 2,
    }
}

fn produce_signature(
    key: &PrivateKeyMaterial,
    padding: SignaturePadding,
    digest: &[u8],
) -> SignResult<Vec<u8>> {
    match (key, padding) {
        (PrivateKeyMaterial::Rsa(k), SignaturePadding::Pss { salt_len }) => k
            .sign_with_rng(
                &mut rand::thread_rng(),
                Pss::new_with_salt::<Sha256>(salt_len),
                digest,
            )
            .map_err(|e| SignError::SigningFailed(format!("RSA-PSS signing failed: {e}"))),
        (PrivateKeyMaterial::EcP256(k), SignaturePadding::None) => {
            let sig: p256::ecdsa::Signature = k
                .sign_prehash(digest)
                .map_err(|e| SignError::SigningFailed(format!("ECDSA signing failed: {e}")))?;
            Ok(sig.to_bytes().to_vec())
        }
        (PrivateKeyMaterial::EcP384(k), SignaturePadding::None) => {
            let sig: p384::ecdsa::Signature = k
                .sign_prehash(digest)
                .map_err(|e| SignError::SigningFailed(format!("ECDSA signing failed: {e}")))?;
            Ok(sig.to_bytes().to_vec())
        }
        (PrivateKeyMaterial::Rsa(_), SignaturePadding::None) => Err(SignError::SigningFailed(
            "RSA key requires PSS padding".to_string(),
        )),
        (_, SignaturePadding::Pss { .. }) => Err(SignError::SigningFailed(
            "PSS padding is only valid for RSA keys".to_string(),
        )),
    }
}

impl CertStoreProvider for SoftwareKeyStore {
    fn open_store(&self, name: &StoreName, scope: StoreScope) -> SignResult<Handle> {
        let mut inner = self.inner();
        let entries = match inner.stores.get(&(scope, name.normalized())) {
            Some(record) => record.entries.clone(),
            None => {
                return Err(SignError::StoreUnavailable(format!(
                    "no {scope} store named '{name}'"
                )))
            }
        };
        Ok(inner.handles.insert(HandleEntry::Store { entries }))
    }

    fn find_certificate(&self, store: Handle, subject: &SubjectFilter) -> SignResult<Handle> {
        let mut inner = self.inner();
        let found = match inner.handles.get(store) {
            Some(HandleEntry::Store { entries }) => entries
                .iter()
                .find(|record| subject.matches(&record.subject))
                .cloned(),
            _ => {
                return Err(SignError::InvalidInput(format!(
                    "handle {store} is not an open store"
                )))
            }
        };
        match found {
            Some(record) => Ok(inner.handles.insert(HandleEntry::Cert(record))),
            None => Err(SignError::CertificateNotFound(format!(
                "no certificate matching subject '{subject}'"
            ))),
        }
    }

    fn certificate_der(&self, cert: Handle) -> SignResult<Vec<u8>> {
        let inner = self.inner();
        match inner.handles.get(cert) {
            Some(HandleEntry::Cert(record)) => Ok(record.der.to_vec()),
            _ => Err(SignError::InvalidInput(format!(
                "handle {cert} is not a certificate"
            ))),
        }
    }

    fn acquire_key(&self, cert: Handle, access: KeyAccess) -> SignResult<AcquiredKey> {
        let mut inner = self.inner();
        let (key, spec) = match inner.handles.get(cert) {
            Some(HandleEntry::Cert(record)) => match &record.key {
                Some(key) => (key.clone(), record.spec),
                None => {
                    return Err(SignError::PrivateKeyUnavailable(format!(
                        "certificate '{}' has no associated private key",
                        record.subject
                    )))
                }
            },
            _ => {
                return Err(SignError::InvalidInput(format!(
                    "handle {cert} is not a certificate"
                )))
            }
        };

        if access == KeyAccess::ModernOnly && spec == KeySpec::LegacyProvider {
            return Err(SignError::PrivateKeyUnavailable(
                "private key is held by a legacy provider".to_string(),
            ));
        }

        let handle = inner.handles.insert(HandleEntry::Key { key, spec });
        Ok(AcquiredKey { handle, spec })
    }

    fn sign_digest(
        &self,
        key: Handle,
        padding: SignaturePadding,
        digest: &[u8],
        out: Option<&mut [u8]>,
    ) -> SignResult<usize> {
        // Clone the key reference out of the table so signing runs without
        // the table lock held.
        let (key, spec) = {
            let inner = self.inner();
            match inner.handles.get(key) {
                Some(HandleEntry::Key { key, spec }) => (key.clone(), *spec),
                _ => {
                    return Err(SignError::InvalidInput(format!(
                        "handle {key} is not an acquired key"
                    )))
                }
            }
        };

        if spec == KeySpec::LegacyProvider {
            return Err(SignError::SigningFailed(
                "legacy-provider keys cannot sign".to_string(),
            ));
        }

        let out = match out {
            None => return Ok(required_signature_len(&key)),
            Some(out) => out,
        };

        let signature = produce_signature(&key, padding, digest)?;
        if out.len() < signature.len() {
            return Err(SignError::SigningFailed(format!(
                "signature buffer too small ({} < {})",
                out.len(),
                signature.len()
            )));
        }
        out[..signature.len()].copy_from_slice(&signature);
        Ok(signature.len())
    }

    fn release(&self, handle: Handle) -> SignResult<()> {
        match self.inner().handles.remove(handle) {
            Some(_) => Ok(()),
            None => Err(SignError::InvalidInput(format!(
                "handle {handle} is unknown or already released"
            ))),
        }
    }

    fn open_handle_count(&self) -> usize {
        self.inner().handles.len()
    }
}
