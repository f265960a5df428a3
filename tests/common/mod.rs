//! Shared fixtures for integration tests.
//!
//! Provisions software stores with freshly generated self-signed
//! certificates and hands back the matching public keys so tests can
//! verify signatures independently of the library under test.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};

use certstore_signer::domain::constants::DEFAULT_STORE_NAME;
use certstore_signer::{
    IdentityConfig, KeyKind, PrivateKeyMaterial, SoftwareKeyStore, StoreName, StoreScope,
    SubjectFilter,
};

/// The personal store every fixture provisions into.
pub fn my_store() -> StoreName {
    StoreName::new(DEFAULT_STORE_NAME).expect("store name")
}

/// RSA key generation is the slow part of the suite; share one key per
/// test binary.
static RSA_KEY: OnceLock<rsa::RsaPrivateKey> = OnceLock::new();

pub fn test_rsa_key() -> &'static rsa::RsaPrivateKey {
    RSA_KEY.get_or_init(|| {
        rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("generate RSA test key")
    })
}

/// Public key to verify signatures produced by a provisioned identity.
pub enum Verifier {
    Rsa(rsa::RsaPublicKey),
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
}

pub struct ProvisionedIdentity {
    pub provider: Arc<SoftwareKeyStore>,
    pub config: IdentityConfig,
    pub verifier: Verifier,
}

impl ProvisionedIdentity {
    pub fn session(&self) -> certstore_signer::SigningIdentity {
        certstore_signer::SigningIdentity::new(self.provider.clone(), self.config.clone())
    }
}

pub fn self_signed_der(common_name: &str, key_pair: &KeyPair) -> Vec<u8> {
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;
    params
        .self_signed(key_pair)
        .expect("self-sign test certificate")
        .der()
        .to_vec()
}

pub fn identity_config(subject: &str, key_kind: KeyKind) -> IdentityConfig {
    IdentityConfig::new(
        my_store(),
        StoreScope::CurrentUser,
        SubjectFilter::new(subject).expect("subject filter"),
        key_kind,
    )
}

/// Store "MY", current-user scope, holding one RSA certificate.
pub fn rsa_identity(subject: &str) -> ProvisionedIdentity {
    let key = test_rsa_key().clone();
    let pem = key
        .to_pkcs8_pem(LineEnding::LF)
        .expect("encode RSA key to PKCS#8");
    let key_pair = KeyPair::from_pem(&pem).expect("import RSA key into rcgen");
    let cert_der = self_signed_der(subject, &key_pair);

    let provider = Arc::new(SoftwareKeyStore::new());
    provider
        .install_certificate(
            StoreScope::CurrentUser,
            &my_store(),
            &cert_der,
            Some(PrivateKeyMaterial::Rsa(key.clone())),
        )
        .expect("install RSA certificate");

    ProvisionedIdentity {
        provider,
        config: identity_config(subject, KeyKind::Rsa),
        verifier: Verifier::Rsa(rsa::RsaPublicKey::from(&key)),
    }
}

/// Store "MY", current-user scope, holding one P-256 certificate.
pub fn p256_identity(subject: &str) -> ProvisionedIdentity {
    let key_pair = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).expect("generate P-256");
    let signing_key = p256::ecdsa::SigningKey::from_pkcs8_der(&key_pair.serialize_der())
        .expect("parse P-256 key");
    let cert_der = self_signed_der(subject, &key_pair);

    let provider = Arc::new(SoftwareKeyStore::new());
    provider
        .install_certificate(
            StoreScope::CurrentUser,
            &my_store(),
            &cert_der,
            Some(PrivateKeyMaterial::EcP256(signing_key.clone())),
        )
        .expect("install P-256 certificate");

    ProvisionedIdentity {
        provider,
        config: identity_config(subject, KeyKind::Ecdsa),
        verifier: Verifier::P256(*signing_key.verifying_key()),
    }
}

/// Store "MY", current-user scope, holding one P-384 certificate.
pub fn p384_identity(subject: &str) -> ProvisionedIdentity {
    let key_pair = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P384_SHA384).expect("generate P-384");
    let signing_key = p384::ecdsa::SigningKey::from_pkcs8_der(&key_pair.serialize_der())
        .expect("parse P-384 key");
    let cert_der = self_signed_der(subject, &key_pair);

    let provider = Arc::new(SoftwareKeyStore::new());
    provider
        .install_certificate(
            StoreScope::CurrentUser,
            &my_store(),
            &cert_der,
            Some(PrivateKeyMaterial::EcP384(signing_key.clone())),
        )
        .expect("install P-384 certificate");

    ProvisionedIdentity {
        provider,
        config: identity_config(subject, KeyKind::Ecdsa),
        verifier: Verifier::P384(*signing_key.verifying_key()),
    }
}
