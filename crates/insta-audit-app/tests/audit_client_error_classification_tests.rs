//! Integration tests for audit client failure classification.

mod common;

use std::sync::Arc;

use insta_audit_client::{AuditClient, AuditError, GenerationResponse};
use insta_audit_core::{AnalysisRequest, Language, Platform};

fn client(transport: Arc<common::FakeTransport>) -> AuditClient {
    AuditClient::new(
        "https://api.example.test/v1beta/models/test:generateContent",
        transport,
    )
    .expect("client should build")
}

fn request() -> AnalysisRequest {
    AnalysisRequest::new(
        "jane_doe",
        "sustainable fashion reselling",
        Platform::Instagram,
        Language::En,
    )
    .expect("request should be valid")
}

#[test]
fn audit_client_error_classification_tests_empty_payload() {
    let transport = common::FakeTransport::with(|| Ok(GenerationResponse::default()));
    let error = client(transport.clone())
        .analyze(&request())
        .expect_err("no candidates should fail");
    assert!(matches!(error, AuditError::EmptyResponse));
    assert_eq!(transport.calls(), 1);
}

#[test]
fn audit_client_error_classification_tests_invalid_json() {
    for raw in ["not json", "{\"score\": 72", "[]"] {
        let transport = common::FakeTransport::with(move || Ok(GenerationResponse::from_text(raw)));
        let error = client(transport)
            .analyze(&request())
            .expect_err("invalid payload should fail");
        assert!(matches!(error, AuditError::MalformedResponse(_)), "payload {raw}");
    }
}

#[test]
fn audit_client_error_classification_tests_missing_fields() {
    let full: serde_json::Value =
        serde_json::from_str(common::SCENARIO_PAYLOAD).expect("fixture should parse");
    for field in ["score", "summary", "profile_audit", "problems", "solutions", "hashtags"] {
        let mut payload = full.clone();
        payload.as_object_mut().expect("object").remove(field);
        let text = payload.to_string();
        let transport =
            common::FakeTransport::with(move || Ok(GenerationResponse::from_text(text.clone())));
        let outcome = client(transport).analyze(&request());
        assert!(
            matches!(outcome, Err(AuditError::MalformedResponse(_))),
            "missing {field} should be malformed"
        );
    }
}

#[test]
fn audit_client_error_classification_tests_transport_passes_through() {
    let transport = common::FakeTransport::with(|| {
        Err(AuditError::Transport("connection refused".to_string()))
    });
    let error = client(transport)
        .analyze(&request())
        .expect_err("transport failure should surface");
    assert!(matches!(error, AuditError::Transport(_)));
}

#[test]
fn audit_client_error_classification_tests_rejects_plain_http() {
    let transport = common::FakeTransport::text(common::SCENARIO_PAYLOAD);
    assert!(matches!(
        AuditClient::new("http://api.example.test/generate", transport),
        Err(AuditError::InvalidEndpoint(_))
    ));
}
