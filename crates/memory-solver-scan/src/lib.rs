#![warn(missing_docs)]
//! # memory-solver-scan
//!
//! ## Purpose
//! Scores every board cell of a video frame and retains the best snapshot
//! seen so far for each cell.
//!
//! ## Responsibilities
//! - Measure brightness and colorfulness of a cell on a sub-sampled grid.
//! - Apply the acceptance rule (bright enough and strictly better score).
//! - Crop, resample, and JPEG-encode accepted cells into [`Snapshot`]s.
//! - Keep the per-cell [`Evidence`] in an [`EvidenceStore`] and report
//!   revealed counts and exact-duplicate matches.
//!
//! ## Data flow
//! Current frame -> [`Sampler::sample`] -> per-cell [`CellStatistics`] ->
//! accepted cells encoded by [`encode_snapshot`] -> [`EvidenceStore::update`]
//! -> [`SampleReport`] back to the caller.
//!
//! ## Ownership and lifetimes
//! The sampler borrows the frame for the duration of one pass and mutates the
//! store through `&mut`; snapshots own their encoded bytes.
//!
//! ## Error model
//! Sampling never fails as a whole. Cells whose rectangle overflows the frame
//! are skipped silently; a snapshot that fails to encode leaves that cell's
//! evidence untouched and is logged.

mod evidence;
mod sampler;
mod snapshot;
mod stats;

pub use evidence::{Evidence, EvidenceStore, Snapshot};
pub use sampler::{SampleReport, Sampler};
pub use snapshot::encode_snapshot;
pub use stats::{CellStatistics, measure_region};

use thiserror::Error;

/// Error type for snapshot production.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Crop rectangle is empty or reaches outside the frame.
    #[error("crop rectangle does not fit the frame")]
    CropOutOfBounds,
    /// Image encoding failed.
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
