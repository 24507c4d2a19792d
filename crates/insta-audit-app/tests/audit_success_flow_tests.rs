//! Integration tests for the successful audit scenario.

mod common;

use insta_audit_core::{ScoreBand, Severity};
use insta_audit_ui::{Body, Commit, FlowState};

#[test]
fn audit_success_flow_tests_renders_scenario_report() {
    let transport = common::FakeTransport::text(common::SCENARIO_PAYLOAD);
    let mut app = common::ready_app(transport.clone());

    let commit = app.submit().expect("submission should be accepted");
    assert_eq!(commit, Commit::Applied);
    assert_eq!(transport.calls(), 1);

    let prompt = transport.first_prompt();
    assert!(prompt.contains("Instagram"));
    assert!(prompt.contains("English"));

    let result = app.flow().result().expect("result should be stored");
    assert_eq!(result.score, 72);
    assert_eq!(result.high_severity_problems().count(), 1);

    let Body::Report(report) = app.view().body else {
        panic!("report should be shown after success");
    };
    assert_eq!(report.score, 72);
    assert_eq!(report.band, ScoreBand::Fair);
    assert_eq!(report.problems[0].severity, Severity::High);
    assert_eq!(report.hashtags, vec!["#sustainablefashion", "#thrift"]);
}

#[test]
fn audit_success_flow_tests_reset_returns_to_empty_form() {
    let transport = common::FakeTransport::text(common::SCENARIO_PAYLOAD);
    let mut app = common::ready_app(transport);

    app.submit().expect("submission should be accepted");
    app.reset();

    assert_eq!(app.flow().state(), &FlowState::Idle);
    assert!(matches!(app.view().body, Body::Form { error: None, .. }));
}

#[test]
fn audit_success_flow_tests_sends_fixed_generation_config() {
    let transport = common::FakeTransport::text(common::SCENARIO_PAYLOAD);
    let mut app = common::ready_app(transport.clone());
    app.submit().expect("submission should be accepted");

    let requests = transport.requests.lock().expect("request log lock should work");
    let body = serde_json::to_value(&requests[0]).expect("request should encode");
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(body["generationConfig"]["responseSchema"]["required"][0], "score");
    assert_eq!(
        body["systemInstruction"]["parts"][0]["text"],
        "You are a professional Social Media Auditor. Respond strictly in English."
    );
}
