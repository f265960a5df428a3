//! PEM-directory provisioning for the software store.
//!
//! Loads `<name>.pem` certificates (with optional `<name>.key` PKCS#8
//! private keys) from a directory into a named store. Entries without a
//! key file are installed certificate-only.

use std::fs;
use std::path::Path;

use der::{DecodePem, Encode};
use pkcs8::DecodePrivateKey;

use crate::domain::types::{StoreName, StoreScope};
use crate::infra::error::{SignError, SignResult};

use super::{PrivateKeyMaterial, SoftwareKeyStore};

/// Load every certificate in `dir` into the named store.
///
/// Returns the number of certificates installed. A missing or unreadable
/// directory maps to `StoreUnavailable`; an unparsable certificate or key
/// file aborts the load.
pub fn load_pem_directory(
    store: &SoftwareKeyStore,
    scope: StoreScope,
    name: &StoreName,
    dir: &Path,
) -> SignResult<usize> {
    let entries = fs::read_dir(dir).map_err(|e| {
        SignError::StoreUnavailable(format!(
            "cannot read store directory {}: {e}",
            dir.display()
        ))
    })?;

    // The directory exists, so the store does too, even if it stays empty.
    store.create_store(scope, name);

    let mut installed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| {
            SignError::StoreUnavailable(format!(
                "cannot read store directory {}: {e}",
                dir.display()
            ))
        })?;
        let path = entry.path();
        let is_cert = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pem") || ext.eq_ignore_ascii_case("crt"));
        if !is_cert {
            continue;
        }

        let cert_text = fs::read_to_string(&path).map_err(|e| {
            SignError::InvalidInput(format!("cannot read certificate {}: {e}", path.display()))
        })?;
        let cert = x509_cert::Certificate::from_pem(&cert_text).map_err(|e| {
            SignError::InvalidInput(format!(
                "certificate {} does not parse: {e}",
                path.display()
            ))
        })?;
        let cert_der = cert.to_der().map_err(|e| {
            SignError::InvalidInput(format!(
                "certificate {} does not re-encode: {e}",
                path.display()
            ))
        })?;

        let key_path = path.with_extension("key");
        let key = if key_path.exists() {
            let key_text = fs::read_to_string(&key_path).map_err(|e| {
                SignError::InvalidInput(format!(
                    "cannot read private key {}: {e}",
                    key_path.display()
                ))
            })?;
            Some(parse_private_key_pem(&key_text)?)
        } else {
            None
        };

        store.install_certificate(scope, name, &cert_der, key)?;
        installed += 1;
    }

    Ok(installed)
}

/// Parse a PKCS#8 PEM private key, trying each supported key type in turn.
pub fn parse_private_key_pem(text: &str) -> SignResult<PrivateKeyMaterial> {
    if let Ok(key) = rsa::RsaPrivateKey::from_pkcs8_pem(text) {
        return Ok(PrivateKeyMaterial::Rsa(key));
    }
    if let Ok(key) = p256::ecdsa::SigningKey::from_pkcs8_pem(text) {
        return Ok(PrivateKeyMaterial::EcP256(key));
    }
    if let Ok(key) = p384::ecdsa::SigningKey::from_pkcs8_pem(text) {
        return Ok(PrivateKeyMaterial::EcP384(key));
    }
    Err(SignError::InvalidInput(
        "private key is not a PKCS#8 RSA, P-256 or P-384 key".to_string(),
    ))
}
