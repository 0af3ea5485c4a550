//! Integration tests for loading image sequences as uploads.

use std::fs;
use std::path::PathBuf;

use image::{Rgba, RgbaImage};
use memory_solver_app::{AppError, load_frame_sequence};
use memory_solver_capture::CaptureError;

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "memory-solver-{tag}-{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("scratch dir should be created");
    dir
}

#[test]
fn frame_sequence_loading_tests_orders_images_by_name() {
    let dir = scratch_dir("ordered");
    RgbaImage::from_pixel(8, 4, Rgba([200, 0, 0, 255]))
        .save(dir.join("002.png"))
        .expect("png should save");
    RgbaImage::from_pixel(8, 4, Rgba([0, 0, 200, 255]))
        .save(dir.join("001.png"))
        .expect("png should save");
    fs::write(dir.join("notes.txt"), "not a frame").expect("text file should write");

    let frames = load_frame_sequence(&dir).expect("sequence should load");

    assert_eq!(frames.len(), 2);
    assert_eq!((frames[0].width, frames[0].height), (8, 4));
    assert_eq!(frames[0].pixel(0, 0), Some([0, 0, 200, 255]));
    assert_eq!(frames[1].pixel(0, 0), Some([200, 0, 0, 255]));
    fs::remove_dir_all(&dir).expect("scratch dir should be removed");
}

#[test]
fn frame_sequence_loading_tests_rejects_directory_without_images() {
    let dir = scratch_dir("empty");
    assert!(matches!(
        load_frame_sequence(&dir),
        Err(AppError::Capture(CaptureError::EmptySource))
    ));
    fs::remove_dir_all(&dir).expect("scratch dir should be removed");
}
