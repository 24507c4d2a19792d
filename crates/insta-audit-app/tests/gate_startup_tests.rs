//! Integration tests for gate initialization and overlay priority.

mod common;

use insta_audit_app::AppError;
use insta_audit_gate::MemoryFlagStore;

#[test]
fn gate_startup_tests_persisted_unlock_skips_overlay() {
    let transport = common::FakeTransport::text(common::SCENARIO_PAYLOAD);
    let app = common::app_with(
        MemoryFlagStore::with_entries([("unlocked", "true")]),
        transport,
    );
    assert!(!app.gate().state().locked);
    assert!(!app.view().overlay.lock_overlay);
}

#[test]
fn gate_startup_tests_absent_flag_starts_locked() {
    let transport = common::FakeTransport::text(common::SCENARIO_PAYLOAD);
    let mut app = common::app_with(MemoryFlagStore::default(), transport);
    assert!(app.view().overlay.lock_overlay);

    // Banner flag is pending, but the lock overlay wins.
    assert!(app.gate().state().cookie_banner_visible);
    app.tick(30_000).expect("tick");
    assert!(!app.view().overlay.cookie_banner);
}

#[test]
fn gate_startup_tests_locked_app_refuses_submission() {
    let transport = common::FakeTransport::text(common::SCENARIO_PAYLOAD);
    let mut app = common::app_with(MemoryFlagStore::default(), transport.clone());
    app.set_username("jane_doe");
    app.set_niche("thrift");

    assert!(matches!(app.submit(), Err(AppError::Locked)));
    assert_eq!(transport.calls(), 0);
}

#[test]
fn gate_startup_tests_unlock_is_persisted_and_one_way() {
    let transport = common::FakeTransport::text(common::SCENARIO_PAYLOAD);
    let mut app = common::app_with(MemoryFlagStore::default(), transport);

    app.unlock(100).expect("unlock");
    assert!(app.gate().flags().is_unlocked().expect("read"));
    assert!(!app.view().overlay.lock_overlay);

    app.unlock(200).expect("second unlock is a no-op");
    assert!(!app.gate().state().locked);
}
