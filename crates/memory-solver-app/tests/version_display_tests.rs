//! Integration tests for VERSION propagation into runtime display.

use std::fs;

use memory_solver_app::{Scanner, app_version};
use memory_solver_capture::UnavailablePlatform;

#[test]
fn version_display_tests_matches_root_version_file() {
    let root_version_path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../VERSION");
    let root_version = fs::read_to_string(root_version_path).expect("VERSION should be readable");
    assert_eq!(app_version(), root_version.trim());

    let scanner = Scanner::with_platform(Box::new(UnavailablePlatform::new("offline")));
    assert_eq!(scanner.view().version, root_version.trim());
}
