//! End-to-end pin derivation over generated certificate material.
//!
//! Certificates are produced by this crate's own test authority, then the
//! derived pins are cross-checked against OpenSSL's independent public-key
//! re-encoding.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::{X509Builder, X509NameBuilder};
use pinkit_keys::{
    compute_pin, CertificateAuthority, CertificateEncoding, KeyAlgorithm, PinError,
};
use sha2::{Digest, Sha256};

fn test_ca() -> CertificateAuthority {
    CertificateAuthority::new("Good Root CA").expect("CA creation failed")
}

/// Self-sign a certificate for an arbitrary key, bypassing the authority's
/// closed key-type set. Used to produce unsupported-algorithm inputs.
fn self_signed_der(pkey: &PKey<Private>) -> Vec<u8> {
    let mut name_builder = X509NameBuilder::new().unwrap();
    name_builder
        .append_entry_by_nid(Nid::COMMONNAME, "unsupported.test")
        .unwrap();
    let name = name_builder.build();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(pkey).unwrap();

    let not_before = Asn1Time::days_from_now(0).unwrap();
    let not_after = Asn1Time::days_from_now(30).unwrap();
    builder.set_not_before(&not_before).unwrap();
    builder.set_not_after(&not_after).unwrap();

    let serial = {
        let mut bn = BigNum::new().unwrap();
        bn.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();
        bn.to_asn1_integer().unwrap()
    };
    builder.set_serial_number(&serial).unwrap();

    builder.sign(pkey, MessageDigest::sha256()).unwrap();
    builder.build().to_der().unwrap()
}

#[test]
fn rsa_2048_leaf_produces_expected_pin() {
    let ca = test_ca();
    let issued = ca
        .issue_certificate("www.good.com", KeyAlgorithm::Rsa2048, 365)
        .unwrap();

    let der = issued.certificate.der_bytes().to_vec();
    let spki_pin = compute_pin(&der, CertificateEncoding::Der).unwrap();

    assert_eq!(spki_pin.algorithm, KeyAlgorithm::Rsa2048);
    assert_eq!(spki_pin.algorithm.label(), "RSA-2048");
    // standard base64 of a 32-byte digest
    assert_eq!(spki_pin.pin.len(), 44);

    // Independent recomputation: OpenSSL re-encodes the certificate's
    // public key as a DER SubjectPublicKeyInfo, the same structure the pin
    // is defined over
    let x509 = openssl::x509::X509::from_der(&der).unwrap();
    let spki_der = x509.public_key().unwrap().public_key_to_der().unwrap();
    assert_eq!(issued.certificate.spki_der().unwrap(), spki_der);

    let expected = BASE64_STANDARD.encode(Sha256::digest(&spki_der));
    assert_eq!(spki_pin.pin, expected);
}

#[test]
fn rsa_4096_leaf_classifies() {
    let ca = test_ca();
    let issued = ca
        .issue_certificate("www.good.com", KeyAlgorithm::Rsa4096, 365)
        .unwrap();

    let spki_pin = compute_pin(issued.certificate.der_bytes(), CertificateEncoding::Der).unwrap();
    assert_eq!(spki_pin.algorithm, KeyAlgorithm::Rsa4096);
    assert_eq!(
        spki_pin.algorithm.trustkit_constant(),
        "kTSKAlgorithmRsa4096"
    );
}

#[test]
fn ec_leaves_classify_by_curve() {
    let ca = test_ca();

    let p256 = ca
        .issue_certificate("p256.good.com", KeyAlgorithm::EcdsaP256, 365)
        .unwrap();
    let pin_p256 = compute_pin(p256.certificate.der_bytes(), CertificateEncoding::Der).unwrap();
    assert_eq!(pin_p256.algorithm, KeyAlgorithm::EcdsaP256);
    assert_eq!(pin_p256.algorithm.label(), "ECDSA-P256");
    assert_eq!(pin_p256.pin.len(), 44);

    let p384 = ca
        .issue_certificate("p384.good.com", KeyAlgorithm::EcdsaP384, 365)
        .unwrap();
    let pin_p384 = compute_pin(p384.certificate.der_bytes(), CertificateEncoding::Der).unwrap();
    assert_eq!(pin_p384.algorithm, KeyAlgorithm::EcdsaP384);
    assert_eq!(
        pin_p384.algorithm.trustkit_constant(),
        "kTSKAlgorithmEcDsaSecp384r1"
    );
}

#[test]
fn ca_certificate_itself_classifies_p256() {
    // The CA certificate comes from the rcgen path rather than the OpenSSL
    // builder, so it exercises the second certificate producer
    let ca = test_ca();
    let spki_pin = compute_pin(
        ca.ca_certificate().der_bytes(),
        CertificateEncoding::Der,
    )
    .unwrap();
    assert_eq!(spki_pin.algorithm, KeyAlgorithm::EcdsaP256);
}

#[test]
fn pem_and_der_yield_identical_pins() {
    let ca = test_ca();
    let issued = ca
        .issue_certificate("www.good.com", KeyAlgorithm::Rsa2048, 365)
        .unwrap();

    let pem = issued.certificate.to_pem().unwrap();
    let from_pem = compute_pin(pem.as_bytes(), CertificateEncoding::Pem).unwrap();
    let from_der = compute_pin(issued.certificate.der_bytes(), CertificateEncoding::Der).unwrap();

    assert_eq!(from_pem.pin, from_der.pin);
    assert_eq!(from_pem.algorithm, from_der.algorithm);
}

#[test]
fn pin_derivation_is_idempotent() {
    let ca = test_ca();
    let issued = ca
        .issue_certificate("www.good.com", KeyAlgorithm::EcdsaP256, 365)
        .unwrap();

    let first = compute_pin(issued.certificate.der_bytes(), CertificateEncoding::Der).unwrap();
    let second = compute_pin(issued.certificate.der_bytes(), CertificateEncoding::Der).unwrap();
    assert_eq!(first, second);
}

#[test]
fn mismatched_encoding_tags_fail_to_decode() {
    let ca = test_ca();
    let issued = ca
        .issue_certificate("www.good.com", KeyAlgorithm::Rsa2048, 365)
        .unwrap();

    // DER bytes declared as PEM
    let err = compute_pin(issued.certificate.der_bytes(), CertificateEncoding::Pem).unwrap_err();
    assert!(matches!(err, PinError::DecodeError(_)));

    // PEM bytes declared as DER
    let pem = issued.certificate.to_pem().unwrap();
    let err = compute_pin(pem.as_bytes(), CertificateEncoding::Der).unwrap_err();
    assert!(matches!(err, PinError::DecodeError(_)));
}

#[test]
fn garbage_input_fails_to_decode() {
    let err = compute_pin(b"certainly not a certificate", CertificateEncoding::Der).unwrap_err();
    assert!(matches!(err, PinError::DecodeError(_)));
}

#[test]
fn ed25519_certificate_is_rejected() {
    let key_pair = rcgen::KeyPair::generate(&rcgen::PKCS_ED25519).unwrap();
    let mut params = rcgen::CertificateParams::new(vec!["ed25519.test".to_string()]);
    params.alg = &rcgen::PKCS_ED25519;
    params.key_pair = Some(key_pair);
    let cert = rcgen::Certificate::from_params(params).unwrap();
    let der = cert.serialize_der().unwrap();

    let err = compute_pin(&der, CertificateEncoding::Der).unwrap_err();
    assert!(matches!(err, PinError::UnsupportedAlgorithm(_)));
}

#[test]
fn rsa_1024_certificate_is_rejected() {
    let rsa = openssl::rsa::Rsa::generate(1024).unwrap();
    let pkey = PKey::from_rsa(rsa).unwrap();
    let der = self_signed_der(&pkey);

    let err = compute_pin(&der, CertificateEncoding::Der).unwrap_err();
    match err {
        PinError::UnsupportedAlgorithm(detail) => assert!(detail.contains("1024")),
        other => panic!("expected UnsupportedAlgorithm, got {other:?}"),
    }
}

#[test]
fn unrecognized_curve_is_rejected() {
    let group = openssl::ec::EcGroup::from_curve_name(Nid::SECP521R1).unwrap();
    let ec_key = openssl::ec::EcKey::generate(&group).unwrap();
    let pkey = PKey::from_ec_key(ec_key).unwrap();
    let der = self_signed_der(&pkey);

    let err = compute_pin(&der, CertificateEncoding::Der).unwrap_err();
    assert!(matches!(err, PinError::UnsupportedAlgorithm(_)));
}
