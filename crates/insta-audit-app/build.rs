//! Exposes the workspace `VERSION` file to the app as `INSTA_AUDIT_VERSION`.

use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR");
    let workspace_root = Path::new(&manifest_dir)
        .ancestors()
        .nth(2)
        .expect("app crate lives two levels below the workspace root");
    let version_file = workspace_root.join("VERSION");

    println!("cargo:rerun-if-changed={}", version_file.display());

    let version = fs::read_to_string(&version_file)
        .unwrap_or_else(|error| panic!("cannot read {}: {error}", version_file.display()));
    let version = version.trim();
    if version.is_empty() || version.contains(char::is_whitespace) {
        panic!("VERSION must hold a single non-empty token, got {version:?}");
    }

    println!("cargo:rustc-env=INSTA_AUDIT_VERSION={version}");
}
