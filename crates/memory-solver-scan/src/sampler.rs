//! One sampling pass over all board cells.

use memory_solver_core::{Frame, GridCell, ScanConfig, Sensitivity};

use crate::{EvidenceStore, encode_snapshot, measure_region};

/// Outcome of one sampling pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleReport {
    /// Cells whose evidence was replaced.
    pub accepted: Vec<GridCell>,
    /// Cells skipped because their rectangle did not fit the frame.
    pub skipped: Vec<GridCell>,
    /// Cells holding a snapshot after the pass.
    pub revealed: usize,
    /// `true` when the pass did nothing because the frame had no pixels.
    pub empty_frame: bool,
}

impl SampleReport {
    /// Returns `true` when any cell changed.
    pub fn changed(&self) -> bool {
        !self.accepted.is_empty()
    }
}

/// Scores frames against the board layout and updates evidence.
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    config: ScanConfig,
}

impl Sampler {
    /// Creates a sampler with `config`.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Changes the sensitivity used from the next pass on.
    pub fn set_sensitivity(&mut self, sensitivity: Sensitivity) {
        self.config.sensitivity = sensitivity;
    }

    /// Samples `frame` with rectangles laid out for its own dimensions.
    pub fn sample_frame(&self, frame: &Frame, store: &mut EvidenceStore) -> SampleReport {
        self.sample(frame, (frame.width, frame.height), store)
    }

    /// Samples `frame`, laying cells out for the source's reported
    /// dimensions.
    ///
    /// The reported size may briefly disagree with the captured buffer while
    /// a live stream renegotiates its resolution; cells reaching past the
    /// buffer are skipped for this pass.
    pub fn sample(
        &self,
        frame: &Frame,
        reported: (u32, u32),
        store: &mut EvidenceStore,
    ) -> SampleReport {
        let (source_width, source_height) = reported;
        if frame.is_empty()
            || !frame.has_consistent_buffer()
            || source_width == 0
            || source_height == 0
        {
            return SampleReport {
                revealed: store.revealed_count(),
                empty_frame: true,
                ..SampleReport::default()
            };
        }

        let threshold = self.config.sensitivity.as_brightness();
        let mut report = SampleReport::default();

        for cell in GridCell::all() {
            let rect = self
                .config
                .layout
                .rect_for(cell, source_width, source_height)
                .to_pixels();
            let Some(rect) = rect.filter(|rect| rect.fits_within(frame.width, frame.height)) else {
                report.skipped.push(cell);
                continue;
            };
            let Some(stats) = measure_region(frame, rect, self.config.weights.sample_stride) else {
                report.skipped.push(cell);
                continue;
            };

            let score = stats.score(&self.config.weights);
            if stats.brightness <= threshold || score <= store.get(cell).best_score {
                continue;
            }

            match encode_snapshot(frame, rect, &self.config.snapshot) {
                Ok(snapshot) => {
                    if store.update(cell, score, snapshot) {
                        tracing::debug!(
                            cell = cell.index(),
                            score,
                            brightness = stats.brightness,
                            colorfulness = stats.colorfulness,
                            "cell evidence improved"
                        );
                        report.accepted.push(cell);
                    }
                }
                Err(error) => {
                    tracing::warn!(cell = cell.index(), %error, "snapshot encoding failed");
                }
            }
        }

        report.revealed = store.revealed_count();
        report
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the acceptance rule.

    use memory_solver_core::{GridLayout, PixelRect};

    use super::*;

    fn board(width: u32, height: u32, bright_cells: &[(usize, [u8; 3])]) -> Frame {
        let mut frame = Frame::solid(width, height, 0, [0, 0, 0]).expect("frame should build");
        for (index, rgb) in bright_cells {
            let cell = GridCell::new(*index).expect("valid cell");
            let nominal = GridLayout::canonical().nominal_rect(cell, width, height);
            let rect = PixelRect {
                x: nominal.x.floor() as u32,
                y: nominal.y.floor() as u32,
                width: nominal.width.ceil() as u32,
                height: nominal.height.ceil() as u32,
            };
            frame.fill_rect(rect, *rgb);
        }
        frame
    }

    #[test]
    fn dark_cells_are_never_accepted() {
        let sampler = Sampler::default();
        let mut store = EvidenceStore::new();
        let report = sampler.sample_frame(&board(320, 180, &[]), &mut store);

        assert!(!report.changed());
        assert!(report.skipped.is_empty());
        assert_eq!(report.revealed, 0);
    }

    #[test]
    fn bright_cell_is_accepted_once() {
        let sampler = Sampler::default();
        let mut store = EvidenceStore::new();
        let frame = board(320, 180, &[(4, [220, 220, 220])]);

        let first = sampler.sample_frame(&frame, &mut store);
        assert_eq!(first.accepted, vec![GridCell::new(4).expect("valid")]);
        assert_eq!(first.revealed, 1);

        let second = sampler.sample_frame(&frame, &mut store);
        assert!(!second.changed());
    }

    #[test]
    fn brightness_must_strictly_exceed_threshold() {
        let sampler = Sampler::default();
        let mut store = EvidenceStore::new();
        let frame = board(320, 180, &[(0, [85, 85, 85])]);

        assert!(!sampler.sample_frame(&frame, &mut store).changed());
    }

    #[test]
    fn mismatched_buffer_skips_overflowing_cells() {
        let sampler = Sampler::default();
        let mut store = EvidenceStore::new();
        let frame = board(320, 180, &[(0, [220, 220, 220])]);

        // Source claims twice the captured size: most cells fall outside.
        let report = sampler.sample(&frame, (640, 360), &mut store);
        assert!(!report.skipped.is_empty());
        assert!(!report.empty_frame);
    }

    #[test]
    fn zero_dimensions_are_a_no_op() {
        let sampler = Sampler::default();
        let mut store = EvidenceStore::new();
        let frame = Frame::new(0, 0, 0, Vec::new()).expect("empty frame is valid");

        let report = sampler.sample_frame(&frame, &mut store);
        assert!(report.empty_frame);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn truncated_buffer_counts_as_empty_frame() {
        let sampler = Sampler::default();
        let mut store = EvidenceStore::new();
        let frame = Frame {
            width: 320,
            height: 180,
            captured_at_ms: 0,
            rgba: vec![255; 64],
        };

        let report = sampler.sample_frame(&frame, &mut store);
        assert!(report.empty_frame);
        assert!(report.accepted.is_empty());
        assert_eq!(store.revealed_count(), 0);
    }
}
