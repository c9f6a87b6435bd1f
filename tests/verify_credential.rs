mod common;

use chrono::prelude::*;
use serde_json::json;

use common::*;
use vc_verifier::{
    issue, verify_credential, ConfigError, ContextLoader, Credential, Error, IssueOptions,
    OneOrMany, VerifyCredentialOptions,
};

async fn issued(credential: Credential, now: Option<DateTime<Utc>>) -> Credential {
    issue(IssueOptions {
        credential: Some(credential),
        suite: Some(&Ed25519JcsSuite::issuer()),
        loader: Some(&loader()),
        now,
        ..Default::default()
    })
    .await
    .unwrap()
}

fn with_status(mut credential: Credential, id: &str) -> Credential {
    credential.credential_status = Some(
        serde_json::from_value(json!({
            "id": id,
            "type": "StatusList2021Entry",
            "statusPurpose": "revocation",
            "statusListIndex": "94567",
            "statusListCredential": "https://example.org/status/3"
        }))
        .unwrap(),
    );
    credential
}

#[async_std::test]
async fn missing_credential_is_reported() {
    let result = verify_credential(VerifyCredentialOptions::default())
        .await
        .unwrap();
    assert!(!result.verified);
    assert!(matches!(
        result.error,
        Some(Error::Config(ConfigError::MissingCredential))
    ));
}

#[async_std::test]
async fn verification_is_idempotent() {
    let loader = loader();
    let suite = Ed25519JcsSuite::verifier();
    let vc = issued(credential_v2(), None).await;
    let options = VerifyCredentialOptions {
        credential: Some(&vc),
        suites: &[&suite],
        loader: Some(&loader),
        ..Default::default()
    };
    let first = verify_credential(options).await.unwrap();
    let second = verify_credential(options).await.unwrap();
    assert!(first.verified);
    assert_eq!(first.verified, second.verified);

    let mut vc = vc.clone();
    vc.credential_subject = Some(
        serde_json::from_value(json!({"id": HOLDER, "alumniOf": "Other University"})).unwrap(),
    );
    let options = VerifyCredentialOptions {
        credential: Some(&vc),
        ..options
    };
    let first = verify_credential(options).await.unwrap();
    let second = verify_credential(options).await.unwrap();
    assert!(!first.verified);
    assert_eq!(first.verified, second.verified);
    assert_eq!(
        first.error.map(|err| err.to_string()),
        second.error.map(|err| err.to_string())
    );
    assert!(matches!(
        first.proof_result.unwrap().results[0].error,
        Some(Error::InvalidSignature)
    ));
}

#[async_std::test]
async fn validity_bounds_are_inclusive() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let mut credential = credential_v2();
    credential.valid_from = Some("2024-06-01T12:00:00Z".to_string());
    credential.valid_until = Some("2024-06-01T12:00:00Z".to_string());
    let vc = issued(credential, Some(now)).await;
    let loader = loader();
    let suite = Ed25519JcsSuite::verifier();
    let options = VerifyCredentialOptions {
        credential: Some(&vc),
        suites: &[&suite],
        loader: Some(&loader),
        now: Some(now),
        ..Default::default()
    };

    let result = verify_credential(options).await.unwrap();
    assert!(result.verified, "{:?}", result.error);

    let later = now + chrono::Duration::milliseconds(1);
    let result = verify_credential(VerifyCredentialOptions {
        now: Some(later),
        ..options
    })
    .await
    .unwrap();
    assert!(!result.verified);
    let message = result.error.unwrap().to_string();
    assert!(message.contains("validUntil"), "{}", message);
    assert!(message.contains("2024-06-01T12:00:00.001Z"), "{}", message);
    assert!(message.contains("2024-06-01T12:00:00.000Z"), "{}", message);

    let earlier = now - chrono::Duration::milliseconds(1);
    let result = verify_credential(VerifyCredentialOptions {
        now: Some(earlier),
        ..options
    })
    .await
    .unwrap();
    assert!(matches!(result.error, Some(Error::NotYetValid { .. })));
}

#[async_std::test]
async fn expired_v1_credential() {
    let mut credential = credential_v1();
    credential.expiration_date = Some("2021-01-01T00:00:00Z".to_string());
    let vc = issued(credential, None).await;
    let result = verify_credential(VerifyCredentialOptions {
        credential: Some(&vc),
        suites: &[&Ed25519JcsSuite::verifier()],
        loader: Some(&loader()),
        ..Default::default()
    })
    .await
    .unwrap();
    assert!(!result.verified);
    assert!(matches!(result.error, Some(Error::Expired { .. })));
}

#[async_std::test]
async fn status_requires_checker() {
    let vc = issued(with_status(credential_v2(), "https://example.org/status/3#94567"), None).await;
    let suite = Ed25519JcsSuite::verifier();
    let err = verify_credential(VerifyCredentialOptions {
        credential: Some(&vc),
        suites: &[&suite],
        loader: Some(&loader()),
        ..Default::default()
    })
    .await
    .unwrap_err();
    assert_eq!(err, ConfigError::MissingCheckStatus);
    assert_eq!(suite.verified_count(), 0);
}

#[async_std::test]
async fn revoked_credential() {
    let loader = loader();
    let suite = Ed25519JcsSuite::verifier();
    let checker = ListStatusChecker::new(&["https://example.org/status/3#1"]);

    let vc = issued(with_status(credential_v2(), "https://example.org/status/3#0"), None).await;
    let result = verify_credential(VerifyCredentialOptions {
        credential: Some(&vc),
        suites: &[&suite],
        loader: Some(&loader),
        check_status: Some(&checker),
        ..Default::default()
    })
    .await
    .unwrap();
    assert!(result.verified, "{:?}", result.error);
    assert!(result.status_result.unwrap().verified);

    let vc = issued(with_status(credential_v2(), "https://example.org/status/3#1"), None).await;
    let result = verify_credential(VerifyCredentialOptions {
        credential: Some(&vc),
        suites: &[&suite],
        loader: Some(&loader),
        check_status: Some(&checker),
        ..Default::default()
    })
    .await
    .unwrap();
    assert!(!result.verified);
    assert!(result.proof_result.unwrap().verified);
    assert!(!result.status_result.unwrap().verified);
    assert!(matches!(result.error, Some(Error::Status(_))));
    assert_eq!(checker.checked_count(), 2);
}

#[async_std::test]
async fn status_not_checked_after_failed_proof() {
    let checker = ListStatusChecker::new(&[]);
    let mut vc = issued(with_status(credential_v2(), "https://example.org/status/3#0"), None).await;
    vc.id = Some("urn:uuid:00000000-0000-0000-0000-000000000000".to_string());
    let result = verify_credential(VerifyCredentialOptions {
        credential: Some(&vc),
        suites: &[&Ed25519JcsSuite::verifier()],
        loader: Some(&loader()),
        check_status: Some(&checker),
        ..Default::default()
    })
    .await
    .unwrap();
    assert!(!result.verified);
    assert!(result.status_result.is_none());
    assert_eq!(checker.checked_count(), 0);
}

#[async_std::test]
async fn unresolvable_context_fails_verification() {
    let extra_context = "https://example.org/contexts/alumni/v1";
    let issuer_loader = loader().with_document(extra_context, json!({"@context": {}}));
    let mut credential = credential_v2();
    credential.context.push(extra_context.into());
    let vc = issue(IssueOptions {
        credential: Some(credential),
        suite: Some(&Ed25519JcsSuite::issuer()),
        loader: Some(&issuer_loader),
        ..Default::default()
    })
    .await
    .unwrap();

    let result = verify_credential(VerifyCredentialOptions {
        credential: Some(&vc),
        suites: &[&Ed25519JcsSuite::verifier()],
        loader: Some(&loader()),
        ..Default::default()
    })
    .await
    .unwrap();
    assert!(!result.verified);
    assert!(matches!(result.error, Some(Error::DocumentNotFound(ref url)) if url == extra_context));

    let result = verify_credential(VerifyCredentialOptions {
        credential: Some(&vc),
        suites: &[&Ed25519JcsSuite::verifier()],
        loader: Some(&issuer_loader),
        ..Default::default()
    })
    .await
    .unwrap();
    assert!(result.verified, "{:?}", result.error);
}

#[async_std::test]
async fn unknown_verification_method() {
    let vc = issued(credential_v2(), None).await;
    let loader = ContextLoader::default();
    let result = verify_credential(VerifyCredentialOptions {
        credential: Some(&vc),
        suites: &[&Ed25519JcsSuite::verifier()],
        loader: Some(&loader),
        ..Default::default()
    })
    .await
    .unwrap();
    assert!(!result.verified);
    assert!(matches!(
        result.error.unwrap().errors(),
        [Error::DocumentNotFound(_)]
    ));
}

#[async_std::test]
async fn any_matching_proof_verifies() {
    let loader = loader();
    let mut vc = issued(credential_v2(), None).await;
    let mut bad_proof = vc.proof.as_ref().unwrap().first().unwrap().clone();
    bad_proof.proof_value = Some("zInvalid".to_string());
    vc.proof = Some(OneOrMany::Many(vec![
        bad_proof,
        vc.proof.as_ref().unwrap().first().unwrap().clone(),
    ]));
    let result = verify_credential(VerifyCredentialOptions {
        credential: Some(&vc),
        suites: &[&Ed25519JcsSuite::verifier()],
        loader: Some(&loader),
        ..Default::default()
    })
    .await
    .unwrap();
    assert!(result.verified, "{:?}", result.error);
    let results = result.proof_result.unwrap().results;
    assert_eq!(results.len(), 2);
    assert!(!results[0].verified);
    assert!(results[1].verified);
}
