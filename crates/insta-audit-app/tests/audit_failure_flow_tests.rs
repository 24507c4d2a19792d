//! Integration tests for failed audits at the presentation boundary.

mod common;

use insta_audit_client::AuditError;
use insta_audit_core::Language;
use insta_audit_locale::strings;
use insta_audit_ui::{Body, FlowState};

#[test]
fn audit_failure_flow_tests_not_json_shows_generic_error() {
    let transport = common::FakeTransport::text("not json");
    let mut app = common::ready_app(transport.clone());

    app.submit().expect("submission should be accepted");

    assert_eq!(app.flow().state(), &FlowState::Failed);
    assert!(app.flow().result().is_none());
    assert_eq!(
        app.view().body,
        Body::Form {
            submit_enabled: true,
            submit_label: strings(Language::En).analyze_btn,
            error: Some(strings(Language::En).error_msg),
        }
    );
}

#[test]
fn audit_failure_flow_tests_resubmit_after_failure_succeeds() {
    let transport = common::FakeTransport::with(|| {
        Err(AuditError::Transport("service returned 503".to_string()))
    });
    let mut app = common::ready_app(transport.clone());
    app.submit().expect("first submission should be accepted");
    assert_eq!(app.flow().state(), &FlowState::Failed);

    app.submit().expect("resubmission should be accepted");
    assert_eq!(transport.calls(), 2);
}

#[test]
fn audit_failure_flow_tests_error_text_follows_language() {
    let transport = common::FakeTransport::text("");
    let mut app = common::ready_app(transport);
    app.submit().expect("submission should be accepted");

    app.set_language(Language::He);
    let Body::Form { error, .. } = app.view().body else {
        panic!("form should be shown after failure");
    };
    assert_eq!(error, Some(strings(Language::He).error_msg));
}
