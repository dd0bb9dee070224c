//! Request signatures checked against known answers and the public key

mod common;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{TimeZone, Utc};
use common::test_certificate;
use paye_sync::core::signing::{
    canonical_string, RequestDescriptor, RequestSigner, SignatureAlgorithm, SigningProfile,
};
use paye_sync::domain::SigningError;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use sha2::{Sha256, Sha512};
use test_case::test_case;

const RPN_PATH: &str = "/paye-employers/v1/rest/rpn/8000242TH/2024?dateLastUpdated=2024-03-01";

fn prepared(mut request: RequestDescriptor, algorithm: SignatureAlgorithm) -> RequestDescriptor {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    request.prepare("softwaretest.ros.ie", now, algorithm);
    request
}

fn verify(request: &RequestDescriptor, algorithm: SignatureAlgorithm, signature_b64: &str) {
    let certificate = test_certificate();
    let public = certificate.private_key().unwrap().to_public_key();
    let canonical = canonical_string(request, &SigningProfile::default()).unwrap();
    let bytes = STANDARD.decode(signature_b64).unwrap();
    let signature = Signature::try_from(bytes.as_slice()).unwrap();

    match algorithm {
        SignatureAlgorithm::RsaSha256 => VerifyingKey::<Sha256>::new(public)
            .verify(canonical.text.as_bytes(), &signature)
            .unwrap(),
        SignatureAlgorithm::RsaSha512 => VerifyingKey::<Sha512>::new(public)
            .verify(canonical.text.as_bytes(), &signature)
            .unwrap(),
    }
}

#[test_case(
    SignatureAlgorithm::RsaSha512,
    "VtJxjHbY+jdDkKQS60TPQZq1W3MIGLj2Kt/Q0wH2DOPKv1WvrTg5HzpOwyjGnKwrFb6CPe+jMdxJRnjYNyC7eYW75AIPZ3Ha/lqw+VX9CnACepvArwJ6IEpNWn+AUTcoSdQVLSTY0w7GtZhtpkJm4WAKH+QGndgwomGxkJAm23A=" ;
    "rsa-sha512"
)]
#[test_case(
    SignatureAlgorithm::RsaSha256,
    "AnDV0r/dI59hL2QGc6/t/eJ0OyDKPkffReP/RQ7E/73RJQt3Y7muf9CpGQ4yhnN6LtPAOG6DT50UJC/Msc70DEA1Aym5bwdGbgz2Z/+WaNxx5l+HINrGUXMZZMn18IinzOptoQJaGQdF7zaMQHoxcu6T5ILPJ62ACQvebbfTK6A=" ;
    "rsa-sha256"
)]
fn test_get_signature_known_answer(algorithm: SignatureAlgorithm, expected: &str) {
    let request = prepared(RequestDescriptor::get(RPN_PATH), algorithm);
    let value = RequestSigner::new(algorithm)
        .sign(&request, &test_certificate())
        .unwrap();

    assert_eq!(value.signature, expected);
    assert_eq!(
        value.to_string(),
        format!(
            r#"keyId="999963",algorithm="{}",headers="(request-target) host date",signature="{}""#,
            algorithm, expected
        )
    );
    verify(&request, algorithm, &value.signature);
}

#[test_case(SignatureAlgorithm::RsaSha256, "SHA-256=" ; "sha256 digest")]
#[test_case(SignatureAlgorithm::RsaSha512, "SHA-512=" ; "sha512 digest")]
fn test_post_signs_body_digest(algorithm: SignatureAlgorithm, digest_prefix: &str) {
    let body = br#"{"payslips":[]}"#.to_vec();
    let request = prepared(
        RequestDescriptor::post(
            "/paye-employers/v1/rest/payroll/8000242TH/2024/RUN-1/SUB-1",
            body,
        ),
        algorithm,
    );
    let value = RequestSigner::new(algorithm)
        .sign(&request, &test_certificate())
        .unwrap();

    assert_eq!(
        value.headers,
        vec!["(request-target)", "host", "date", "digest"]
    );
    assert!(request
        .headers()
        .get("digest")
        .unwrap()
        .starts_with(digest_prefix));
    assert_eq!(request.headers().get("content-type"), Some("application/json"));
    verify(&request, algorithm, &value.signature);
}

#[test]
fn test_signature_is_deterministic() {
    let request = prepared(RequestDescriptor::get(RPN_PATH), SignatureAlgorithm::RsaSha512);
    let signer = RequestSigner::default();

    let first = signer.sign(&request, &test_certificate()).unwrap();
    let second = signer.sign(&request.clone(), &test_certificate()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_changed_path_changes_signature() {
    let signer = RequestSigner::default();
    let a = prepared(RequestDescriptor::get(RPN_PATH), SignatureAlgorithm::RsaSha512);
    let b = prepared(
        RequestDescriptor::get("/paye-employers/v1/rest/rpn/8000242TH/2023"),
        SignatureAlgorithm::RsaSha512,
    );

    assert_ne!(
        signer.sign(&a, &test_certificate()).unwrap().signature,
        signer.sign(&b, &test_certificate()).unwrap().signature
    );
}

#[test]
fn test_custom_profile_requires_its_headers() {
    let request = prepared(RequestDescriptor::get(RPN_PATH), SignatureAlgorithm::RsaSha512);
    let signer = RequestSigner::default()
        .with_profile(SigningProfile::new(["(request-target)", "host", "x-request-id"]));

    assert_eq!(
        signer.sign(&request, &test_certificate()),
        Err(SigningError::MissingHeader("x-request-id".to_string()))
    );
}
