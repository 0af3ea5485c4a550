//! Shared fixtures for scan integration tests.

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
