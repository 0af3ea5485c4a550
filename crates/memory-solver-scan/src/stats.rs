//! Per-cell pixel statistics.

use memory_solver_core::{Frame, PixelRect, ScoreWeights};

/// Brightness and colorfulness of one cell region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellStatistics {
    /// Mean of `(R + G + B) / 3` over sampled pixels.
    pub brightness: f64,
    /// Mean of `|R - G| + |G - B| + |R - B|` over sampled pixels.
    pub colorfulness: f64,
    /// Number of sampled pixels.
    pub samples: usize,
}

impl CellStatistics {
    /// Composite score: brightness plus weighted colorfulness.
    pub fn score(&self, weights: &ScoreWeights) -> f64 {
        self.brightness + self.colorfulness / weights.colorfulness_divisor
    }
}

/// Measures `rect` of `frame`, reading every `stride`-th pixel in
/// rectangle-local row-major order.
///
/// # Returns
/// `None` when the rectangle is empty, reaches outside the frame, or the
/// frame buffer does not match its dimensions.
pub fn measure_region(frame: &Frame, rect: PixelRect, stride: usize) -> Option<CellStatistics> {
    if rect.is_empty()
        || !rect.fits_within(frame.width, frame.height)
        || !frame.has_consistent_buffer()
    {
        return None;
    }

    let stride = stride.max(1);
    let rect_width = rect.width as usize;
    let frame_width = frame.width as usize;

    let mut brightness_sum = 0.0;
    let mut colorfulness_sum = 0.0;
    let mut samples = 0_usize;

    for local in (0..rect.area()).step_by(stride) {
        let x = rect.x as usize + local % rect_width;
        let y = rect.y as usize + local / rect_width;
        let offset = (y * frame_width + x) * 4;

        let r = frame.rgba[offset] as i32;
        let g = frame.rgba[offset + 1] as i32;
        let b = frame.rgba[offset + 2] as i32;

        brightness_sum += (r + g + b) as f64 / 3.0;
        colorfulness_sum += ((r - g).abs() + (g - b).abs() + (r - b).abs()) as f64;
        samples += 1;
    }

    Some(CellStatistics {
        brightness: brightness_sum / samples as f64,
        colorfulness: colorfulness_sum / samples as f64,
        samples,
    })
}

#[cfg(test)]
mod tests {
    //! Unit tests for statistic math.

    use super::*;

    fn rect(x: u32, y: u32, width: u32, height: u32) -> PixelRect {
        PixelRect {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn gray_region_has_no_colorfulness() {
        let frame = Frame::solid(20, 20, 0, [200, 200, 200]).expect("frame should build");
        let stats = measure_region(&frame, rect(0, 0, 20, 20), 10).expect("region fits");

        assert_eq!(stats.samples, 40);
        assert!((stats.brightness - 200.0).abs() < 1e-9);
        assert_eq!(stats.colorfulness, 0.0);
        assert!((stats.score(&ScoreWeights::default()) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn saturated_color_raises_score() {
        let frame = Frame::solid(10, 10, 0, [255, 0, 0]).expect("frame should build");
        let stats = measure_region(&frame, rect(0, 0, 10, 10), 1).expect("region fits");

        assert!((stats.brightness - 85.0).abs() < 1e-9);
        assert!((stats.colorfulness - 510.0).abs() < 1e-9);
        assert!((stats.score(&ScoreWeights::default()) - 136.0).abs() < 1e-9);
    }

    #[test]
    fn stride_samples_rectangle_local_pixels() {
        let mut frame = Frame::solid(8, 2, 0, [0, 0, 0]).expect("frame should build");
        // Local pixels 0 and 4 of a 4x2 rect at x=2 are (2,0) and (2,1).
        frame.fill_rect(rect(2, 0, 1, 2), [90, 90, 90]);
        let stats = measure_region(&frame, rect(2, 0, 4, 2), 4).expect("region fits");

        assert_eq!(stats.samples, 2);
        assert!((stats.brightness - 90.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_bounds_region_is_skipped() {
        let frame = Frame::solid(10, 10, 0, [255, 255, 255]).expect("frame should build");
        assert!(measure_region(&frame, rect(5, 5, 6, 1), 10).is_none());
        assert!(measure_region(&frame, rect(0, 0, 0, 4), 10).is_none());
    }

    #[test]
    fn truncated_buffer_is_not_measured() {
        let frame = Frame {
            width: 4,
            height: 4,
            captured_at_ms: 0,
            rgba: vec![255; 8],
        };
        assert!(measure_region(&frame, rect(0, 0, 4, 4), 1).is_none());
    }
}
