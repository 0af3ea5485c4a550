//! Integration tests for live screen sharing.

mod common;

use common::{board_frame, cell, scanner_with, upload};
use memory_solver_app::{AppError, CaptureState};
use memory_solver_capture::{CaptureError, SyntheticPlatform};
use memory_solver_core::{Frame, rect_for};

#[test]
fn live_share_tests_connects_and_scans_immediately() {
    let platform = SyntheticPlatform::with_frames(vec![board_frame(640, 360, &[(12, [30, 180, 240])])]);
    let monitor = platform.monitor();
    let mut scanner = scanner_with(platform);

    scanner.start_live_share().expect("share should be granted");
    assert_eq!(scanner.state(), CaptureState::Scanning);
    assert_eq!(scanner.status(), "Screen share connected");
    assert!(scanner.view().is_live());
    assert_eq!(monitor.live_tracks(), 1);

    let report = scanner.on_refresh(0).expect("first refresh should tick");
    assert_eq!(report.accepted, vec![cell(12)]);
}

#[test]
fn live_share_tests_denial_keeps_prior_state() {
    let mut scanner = scanner_with(SyntheticPlatform::denying("Permission denied"));
    scanner.attach_upload(upload(vec![board_frame(640, 360, &[(1, [220, 220, 220])])]));
    scanner.toggle_scan();
    scanner.on_refresh(0);

    let error = scanner.start_live_share().expect_err("share must be denied");

    assert!(matches!(error, AppError::Acquisition(CaptureError::Denied(_))));
    assert_eq!(scanner.state(), CaptureState::Scanning);
    assert_eq!(scanner.status(), "Unable to share screen: Permission denied");
    assert_eq!(
        scanner.view().error_message.as_deref(),
        Some("Unable to share screen: Permission denied")
    );
    assert_eq!(scanner.evidence().revealed_count(), 1);
    assert!(scanner.on_refresh(16).is_some());
}

#[test]
fn live_share_tests_denial_from_idle_stays_idle() {
    let mut scanner = scanner_with(SyntheticPlatform::denying("NotAllowedError"));
    assert!(scanner.start_live_share().is_err());
    assert_eq!(scanner.state(), CaptureState::Idle);
    assert!(scanner.status().contains("NotAllowedError"));
}

#[test]
fn live_share_tests_platform_stop_returns_to_idle() {
    let platform = SyntheticPlatform::with_frames(vec![board_frame(320, 180, &[])]);
    let monitor = platform.monitor();
    let mut scanner = scanner_with(platform);
    scanner.start_live_share().expect("share should be granted");
    scanner.on_refresh(0);

    monitor.end_stream();
    assert!(scanner.on_refresh(16).is_none());

    assert_eq!(scanner.state(), CaptureState::Idle);
    assert_eq!(scanner.status(), "Screen share ended");
    assert_eq!(monitor.live_tracks(), 0);
}

#[test]
fn live_share_tests_new_share_replaces_previous_tracks() {
    let platform = SyntheticPlatform::with_frames(vec![board_frame(320, 180, &[])]);
    let monitor = platform.monitor();
    let mut scanner = scanner_with(platform);

    scanner.start_live_share().expect("first share should be granted");
    scanner.start_live_share().expect("second share should be granted");

    assert_eq!(monitor.live_tracks(), 1);
    assert_eq!(scanner.controller().live_tracks(), 1);
}

#[test]
fn live_share_tests_success_clears_previous_error() {
    let mut scanner = scanner_with(SyntheticPlatform::denying("busy"));
    assert!(scanner.start_live_share().is_err());
    assert!(scanner.view().error_message.is_some());

    scanner.attach_upload(upload(vec![board_frame(320, 180, &[])]));
    assert!(scanner.view().error_message.is_none());
}

#[test]
fn live_share_tests_resolution_change_uses_new_frame_geometry() {
    // Light the pixels where cell 0 sits at 640x360, inside a 1280x720 frame
    // whose own cell 0 stays black.
    let stale_rect = rect_for(cell(0), 640, 360)
        .to_pixels()
        .expect("cell 0 has pixels at 640x360");
    let mut upgraded = Frame::solid(1280, 720, 0, [0, 0, 0]).expect("frame should build");
    upgraded.fill_rect(stale_rect, [220, 220, 220]);

    let platform = SyntheticPlatform::with_frames(vec![
        board_frame(640, 360, &[]),
        upgraded,
        board_frame(1280, 720, &[(0, [220, 220, 220])]),
    ]);
    let mut scanner = scanner_with(platform);
    scanner.start_live_share().expect("share should be granted");

    let first = scanner.on_refresh(0).expect("tick at 0");
    assert!(first.accepted.is_empty());
    let resized = scanner.on_refresh(16).expect("tick at 16");
    assert!(resized.accepted.is_empty());
    assert!(resized.skipped.is_empty());
    assert!(!scanner.evidence().get(cell(0)).is_revealed());

    let lit = scanner.on_refresh(32).expect("tick at 32");
    assert_eq!(lit.accepted, vec![cell(0)]);
}
