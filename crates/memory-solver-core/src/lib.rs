#![warn(missing_docs)]
//! # memory-solver-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `memory-solver` workspace.
//!
//! ## Responsibilities
//! - Represent captured video frames as validated RGBA buffers.
//! - Map the 24 cells of the fixed 3x8 board onto frame pixel rectangles.
//! - Hold the tunable scan parameters (sensitivity, layout, score weights,
//!   snapshot format).
//!
//! ## Data flow
//! Capture code emits [`Frame`] objects. The sampler asks [`GridLayout`] for a
//! [`CellRect`] per [`GridCell`], converts it to a [`PixelRect`], and checks
//! it against the frame bounds before reading pixels.
//!
//! ## Ownership and lifetimes
//! Frames own their backing buffers (`Vec<u8>`). Geometry values are `Copy`
//! and recomputed on every sampling pass, since frame dimensions may change
//! between passes.
//!
//! ## Error model
//! Validation failures (buffer shape, out-of-range cell index, invalid tuning
//! values) return [`CoreError`] variants.
//!
//! ## Example
//! ```rust
//! use memory_solver_core::{GridCell, GridLayout};
//!
//! let cell = GridCell::new(9).expect("index in range");
//! assert_eq!((cell.row(), cell.column()), (1, 1));
//!
//! let rect = GridLayout::canonical().rect_for(cell, 1280, 720);
//! let pixels = rect.to_pixels().expect("non-empty rectangle");
//! assert!(pixels.fits_within(1280, 720));
//! ```

mod config;
mod geometry;

pub use config::{
    DEFAULT_THRESHOLD, MAX_THRESHOLD, MIN_THRESHOLD, ScanConfig, ScoreWeights, Sensitivity,
    SnapshotFormat,
};
pub use geometry::{CELL_COUNT, CellRect, GRID_COLS, GRID_ROWS, GridCell, GridLayout, PixelRect, rect_for};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One decoded video frame at the source's native resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Capture time in milliseconds on the scanner's timeline.
    pub captured_at_ms: u64,
    /// Raw RGBA pixel buffer (`width * height * 4` bytes).
    pub rgba: Vec<u8>,
}

impl Frame {
    /// Constructs a validated frame.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidFrameShape`] when the pixel buffer length is
    /// not exactly `width * height * 4`.
    pub fn new(
        width: u32,
        height: u32,
        captured_at_ms: u64,
        rgba: Vec<u8>,
    ) -> Result<Self, CoreError> {
        let expected_len = required_rgba_len(width, height)?;
        if rgba.len() != expected_len {
            return Err(CoreError::InvalidFrameShape {
                expected: expected_len,
                actual: rgba.len(),
            });
        }

        Ok(Self {
            width,
            height,
            captured_at_ms,
            rgba,
        })
    }

    /// Creates a frame filled with one opaque RGB color.
    ///
    /// # Errors
    /// Returns [`CoreError::DimensionOverflow`] when the buffer size overflows.
    pub fn solid(
        width: u32,
        height: u32,
        captured_at_ms: u64,
        rgb: [u8; 3],
    ) -> Result<Self, CoreError> {
        let len = required_rgba_len(width, height)?;
        let mut rgba = Vec::with_capacity(len);
        for _ in 0..len / 4 {
            rgba.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        Self::new(width, height, captured_at_ms, rgba)
    }

    /// Returns `true` when the frame carries no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` when `rgba` holds exactly `width * height * 4` bytes.
    ///
    /// Fields are public, so a frame built as a struct literal may violate the
    /// shape [`Frame::new`] enforces. Pixel readers check this first.
    pub fn has_consistent_buffer(&self) -> bool {
        required_rgba_len(self.width, self.height).is_ok_and(|len| len == self.rgba.len())
    }

    /// Returns the RGBA value at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Paints `rect` with one opaque RGB color, clipping at the frame edges.
    ///
    /// Does nothing on a frame whose buffer does not match its dimensions.
    pub fn fill_rect(&mut self, rect: PixelRect, rgb: [u8; 3]) {
        if !self.has_consistent_buffer() {
            return;
        }
        let x_end = rect.x.saturating_add(rect.width).min(self.width);
        let y_end = rect.y.saturating_add(rect.height).min(self.height);
        let row_len = self.width as usize * 4;

        for y in rect.y..y_end {
            let row = y as usize * row_len;
            for x in rect.x..x_end {
                let offset = row + x as usize * 4;
                self.rgba[offset..offset + 4].copy_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
            }
        }
    }

    /// Copies the RGBA bytes inside `rect` into a new row-major buffer.
    ///
    /// # Returns
    /// `None` when the rectangle is empty, reaches outside the frame, or the
    /// buffer does not match the frame dimensions.
    pub fn crop_rgba(&self, rect: PixelRect) -> Option<Vec<u8>> {
        if rect.is_empty()
            || !rect.fits_within(self.width, self.height)
            || !self.has_consistent_buffer()
        {
            return None;
        }

        let row_len = rect.width as usize * 4;
        let mut out = Vec::with_capacity(row_len * rect.height as usize);
        for y in rect.y..rect.y + rect.height {
            let start = (y as usize * self.width as usize + rect.x as usize) * 4;
            out.extend_from_slice(&self.rgba[start..start + row_len]);
        }
        Some(out)
    }
}

/// Error type for core domain validation.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// Frame buffer shape does not match declared geometry.
    #[error("invalid frame shape: expected {expected} bytes, got {actual}")]
    InvalidFrameShape {
        /// Expected RGBA byte count.
        expected: usize,
        /// Actual RGBA byte count.
        actual: usize,
    },
    /// Frame dimensions overflow addressable memory.
    #[error("frame dimensions overflow")]
    DimensionOverflow,
    /// Cell index lies outside the 24-cell board.
    #[error("cell index {0} is outside the {CELL_COUNT}-cell grid")]
    InvalidCellIndex(usize),
    /// Sensitivity threshold lies outside its accepted range.
    #[error("threshold {value} is outside [{min}, {max}]")]
    ThresholdOutOfRange {
        /// Rejected value.
        value: u32,
        /// Inclusive lower bound.
        min: u8,
        /// Inclusive upper bound.
        max: u8,
    },
    /// Grid layout fractions are inconsistent.
    #[error("invalid grid layout: {0}")]
    InvalidLayout(String),
    /// Score weighting parameters are unusable.
    #[error("invalid score weights: {0}")]
    InvalidWeights(String),
    /// Snapshot output parameters are unusable.
    #[error("invalid snapshot format: {0}")]
    InvalidSnapshotFormat(String),
}

fn required_rgba_len(width: u32, height: u32) -> Result<usize, CoreError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(CoreError::DimensionOverflow)
}

#[cfg(test)]
mod tests {
    //! Unit tests for frame construction and pixel access.

    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        let error = Frame::new(2, 2, 0, vec![0; 15]).expect_err("short buffer must fail");
        assert_eq!(
            error,
            CoreError::InvalidFrameShape {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn fill_and_crop_round_trip_region() {
        let mut frame = Frame::solid(6, 4, 0, [0, 0, 0]).expect("frame should build");
        let rect = PixelRect {
            x: 2,
            y: 1,
            width: 3,
            height: 2,
        };
        frame.fill_rect(rect, [10, 20, 30]);

        assert_eq!(frame.pixel(2, 1), Some([10, 20, 30, 255]));
        assert_eq!(frame.pixel(1, 1), Some([0, 0, 0, 255]));

        let crop = frame.crop_rgba(rect).expect("crop should fit");
        assert_eq!(crop.len(), 3 * 2 * 4);
        assert!(crop.chunks_exact(4).all(|px| px == [10, 20, 30, 255]));
    }

    #[test]
    fn crop_outside_frame_is_rejected() {
        let frame = Frame::solid(4, 4, 0, [0, 0, 0]).expect("frame should build");
        let rect = PixelRect {
            x: 3,
            y: 0,
            width: 2,
            height: 1,
        };
        assert!(frame.crop_rgba(rect).is_none());
    }

    #[test]
    fn short_buffer_is_never_indexed() {
        let mut frame = Frame {
            width: 4,
            height: 4,
            captured_at_ms: 0,
            rgba: vec![0; 8],
        };
        let rect = PixelRect {
            x: 0,
            y: 0,
            width: 4,
            height: 4,
        };
        assert!(!frame.has_consistent_buffer());

        frame.fill_rect(rect, [255, 255, 255]);
        assert_eq!(frame.rgba, vec![0; 8]);
        assert!(frame.crop_rgba(rect).is_none());
        assert_eq!(frame.pixel(3, 3), None);
    }
}
