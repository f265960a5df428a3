//! End-to-end signing pipeline tests against the software store.
//!
//! Verification, not byte equality, is the correctness oracle throughout:
//! PSS and ECDSA signatures are allowed to differ between calls as long
//! as each one verifies.

mod common;

use sha2::{Digest, Sha256};
use signature::hazmat::PrehashVerifier;

use certstore_signer::{
    sign_buffer, CertStoreProvider, DerEcdsaSignature, KeyKind, SignError, SoftwareKeyStore,
    StoreName, StoreScope, SubjectFilter,
};

use common::{p256_identity, p384_identity, rsa_identity, Verifier};

fn sha256(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

fn verify_rsa(identity: &common::ProvisionedIdentity, tbs: &[u8], sig: &[u8]) {
    let Verifier::Rsa(key) = &identity.verifier else {
        panic!("expected an RSA verifier");
    };
    key.verify(rsa::Pss::new_with_salt::<Sha256>(32), &sha256(tbs), sig)
        .expect("RSA-PSS signature must verify");
}

fn verify_ec(identity: &common::ProvisionedIdentity, tbs: &[u8], sig: &[u8]) {
    let der = DerEcdsaSignature::from_der_bytes(sig.to_vec())
        .expect("signature must be a well-formed two-integer sequence");
    let digest = sha256(tbs);
    match &identity.verifier {
        Verifier::P256(key) => {
            let raw = der.to_raw(32).expect("decode back to r||s");
            let sig = p256::ecdsa::Signature::from_slice(raw.as_slice()).unwrap();
            key.verify_prehash(&digest, &sig)
                .expect("P-256 signature must verify");
        }
        Verifier::P384(key) => {
            let raw = der.to_raw(48).expect("decode back to r||s");
            let sig = p384::ecdsa::Signature::from_slice(raw.as_slice()).unwrap();
            key.verify_prehash(&digest, &sig)
                .expect("P-384 signature must verify");
        }
        Verifier::Rsa(_) => panic!("expected an EC verifier"),
    }
}

#[test]
fn rsa_signature_has_modulus_length_and_verifies() {
    let identity = rsa_identity("test-signer");
    let tbs = [0u8; 32];

    let sig = identity.session().sign(&tbs).unwrap();
    assert_eq!(sig.len(), 256);
    verify_rsa(&identity, &tbs, &sig);
}

#[test]
fn p256_signature_is_der_encoded_and_verifies() {
    let identity = p256_identity("ec-signer");
    let tbs: Vec<u8> = (0..64u8).collect();

    let sig = identity.session().sign(&tbs).unwrap();
    assert!(sig.len() >= 8 && sig.len() <= 72, "len = {}", sig.len());
    assert_eq!(sig[0], 0x30);
    verify_ec(&identity, &tbs, &sig);

    // The DER form must also parse with an independent decoder.
    p256::ecdsa::Signature::from_der(&sig).expect("independent DER parse");
}

#[test]
fn p384_signature_verifies_with_derived_order_length() {
    let identity = p384_identity("ec-signer-384");
    let tbs = b"to-be-signed payload for the larger curve";

    let sig = identity.session().sign(tbs).unwrap();
    assert!(sig.len() <= DerEcdsaSignature::max_encoded_len(48));
    verify_ec(&identity, tbs, &sig);
}

#[test]
fn repeated_signatures_each_verify() {
    let identity = rsa_identity("test-signer");
    let tbs = b"same payload twice";

    let first = identity.session().sign(tbs).unwrap();
    let second = identity.session().sign(tbs).unwrap();
    verify_rsa(&identity, tbs, &first);
    verify_rsa(&identity, tbs, &second);

    let identity = p256_identity("ec-signer");
    let first = identity.session().sign(tbs).unwrap();
    let second = identity.session().sign(tbs).unwrap();
    verify_ec(&identity, tbs, &first);
    verify_ec(&identity, tbs, &second);
}

#[test]
fn sign_into_reports_length_and_rejects_small_buffers() {
    let identity = rsa_identity("test-signer");
    let session = identity.session();

    let mut exact = vec![0u8; 256];
    let written = session.sign_into(b"payload", &mut exact).unwrap();
    assert_eq!(written, 256);
    verify_rsa(&identity, b"payload", &exact[..written]);

    let mut small = vec![0u8; 16];
    let err = session.sign_into(b"payload", &mut small).unwrap_err();
    match err {
        SignError::OutputBufferTooSmall { required, provided } => {
            assert_eq!(required, 256);
            assert_eq!(provided, 16);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_store_and_missing_subject_are_distinct_kinds() {
    let identity = p256_identity("ec-signer");

    // Same provider, store that was never created.
    let mut config = identity.config.clone();
    config.store_name = StoreName::new("ROOT").unwrap();
    let err = sign_buffer(identity.provider.clone(), config, b"x").unwrap_err();
    assert!(matches!(err, SignError::StoreUnavailable(_)));

    // Store exists, subject does not.
    let mut config = identity.config.clone();
    config.subject = SubjectFilter::new("nobody-here").unwrap();
    let err = sign_buffer(identity.provider.clone(), config, b"x").unwrap_err();
    assert!(matches!(err, SignError::CertificateNotFound(_)));

    // Wrong scope behaves like a missing store.
    let mut config = identity.config.clone();
    config.scope = StoreScope::LocalMachine;
    let err = sign_buffer(identity.provider.clone(), config, b"x").unwrap_err();
    assert!(matches!(err, SignError::StoreUnavailable(_)));
}

#[test]
fn certificate_without_key_fails_with_private_key_unavailable() {
    let identity = p256_identity("ec-signer");

    // Install a second, key-less certificate into the same store.
    let key_pair = rcgen::KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap();
    let der = common::self_signed_der("keyless-cert", &key_pair);
    identity
        .provider
        .install_certificate(
            StoreScope::CurrentUser,
            &common::my_store(),
            &der,
            None,
        )
        .unwrap();

    let mut config = identity.config.clone();
    config.subject = SubjectFilter::new("keyless-cert").unwrap();
    let err = sign_buffer(identity.provider.clone(), config, b"x").unwrap_err();
    assert!(matches!(err, SignError::PrivateKeyUnavailable(_)));
}

#[test]
fn key_type_hint_mismatch_fails_without_fallback() {
    // EC certificate, but the identity claims RSA. The provider must
    // refuse the PSS request rather than silently signing raw ECDSA.
    let identity = p256_identity("ec-signer");
    let mut config = identity.config.clone();
    config.key_kind = KeyKind::Rsa;

    let err = sign_buffer(identity.provider.clone(), config, b"x").unwrap_err();
    assert!(matches!(err, SignError::SigningFailed(_)));
}

#[test]
fn sequential_sign_calls_leak_no_handles() {
    let identity = p256_identity("ec-signer");
    let session = identity.session();

    for i in 0..16u8 {
        session.sign(&[i; 24]).unwrap();
    }
    assert_eq!(identity.provider.open_handle_count(), 0);
}

#[test]
fn failed_sign_calls_leak_no_handles() {
    let identity = p256_identity("ec-signer");

    // Failure after the store opened: located no certificate.
    let mut config = identity.config.clone();
    config.subject = SubjectFilter::new("nobody").unwrap();
    sign_buffer(identity.provider.clone(), config, b"x").unwrap_err();

    // Failure after the key was acquired: wrong padding for the key.
    let mut config = identity.config.clone();
    config.key_kind = KeyKind::Rsa;
    sign_buffer(identity.provider.clone(), config, b"x").unwrap_err();

    assert_eq!(identity.provider.open_handle_count(), 0);
}

#[test]
fn empty_input_still_signs() {
    let identity = p256_identity("ec-signer");
    let sig = identity.session().sign(&[]).unwrap();
    verify_ec(&identity, &[], &sig);
}

#[test]
fn unprovisioned_provider_signs_nothing() {
    let provider = std::sync::Arc::new(SoftwareKeyStore::new());
    let config = common::identity_config("test-signer", KeyKind::Rsa);
    let err = sign_buffer(provider.clone(), config, b"x").unwrap_err();
    assert!(matches!(err, SignError::StoreUnavailable(_)));
    assert_eq!(provider.open_handle_count(), 0);
}
