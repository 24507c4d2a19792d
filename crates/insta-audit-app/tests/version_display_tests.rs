//! Integration tests for the build-time version string.

use std::fs;

use insta_audit_app::app_version;

#[test]
fn version_display_tests_follows_workspace_version_file() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../VERSION");
    let recorded = fs::read_to_string(path).expect("VERSION should be readable");
    assert_eq!(app_version(), recorded.trim());
}
