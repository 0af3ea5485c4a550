//! Shared fixtures for app integration tests.

use memory_solver_app::Scanner;
use memory_solver_capture::{CapturePlatform, UnavailablePlatform, UploadHandle};
use memory_solver_core::{Frame, GridCell, rect_for};

/// Builds a black frame with the sampled rectangle of each listed cell
/// painted in its color.
#[allow(dead_code)]
pub fn board_frame(width: u32, height: u32, cells: &[(usize, [u8; 3])]) -> Frame {
    let mut frame = Frame::solid(width, height, 0, [0, 0, 0]).expect("frame fixture should build");
    for (index, rgb) in cells {
        let cell = GridCell::new(*index).expect("fixture cell index should be valid");
        let rect = rect_for(cell, width, height)
            .to_pixels()
            .expect("fixture cell should have pixels");
        frame.fill_rect(rect, *rgb);
    }
    frame
}

/// Shorthand for a validated cell.
#[allow(dead_code)]
pub fn cell(index: usize) -> GridCell {
    GridCell::new(index).expect("fixture cell index should be valid")
}

/// Upload playing `frames` at 30 fps.
#[allow(dead_code)]
pub fn upload(frames: Vec<Frame>) -> UploadHandle {
    UploadHandle::from_frames("fixture.mp4", frames, 30).expect("upload fixture should build")
}

/// Scanner with default tuning over `platform`.
#[allow(dead_code)]
pub fn scanner_with(platform: impl CapturePlatform + 'static) -> Scanner {
    Scanner::with_platform(Box::new(platform))
}

/// Scanner whose platform denies every share request.
#[allow(dead_code)]
pub fn offline_scanner() -> Scanner {
    scanner_with(UnavailablePlatform::new("Permission denied"))
}

/// Calls `on_refresh` every 16 ms over `[from_ms, to_ms]`.
#[allow(dead_code)]
pub fn run_refreshes(scanner: &mut Scanner, from_ms: u64, to_ms: u64) {
    let mut now_ms = from_ms;
    while now_ms <= to_ms {
        scanner.on_refresh(now_ms);
        now_ms += 16;
    }
}
