//! Tunable scan parameters.

use serde::{Deserialize, Serialize};

use crate::{CoreError, GridLayout};

/// Lowest accepted sensitivity threshold.
pub const MIN_THRESHOLD: u8 = 40;
/// Highest accepted sensitivity threshold.
pub const MAX_THRESHOLD: u8 = 150;
/// Sensitivity threshold used when none is configured.
pub const DEFAULT_THRESHOLD: u8 = 85;

/// Minimum mean brightness a cell must exceed before its score is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Sensitivity(u8);

impl Sensitivity {
    /// Creates a validated sensitivity threshold.
    ///
    /// # Errors
    /// Returns [`CoreError::ThresholdOutOfRange`] outside
    /// `[MIN_THRESHOLD, MAX_THRESHOLD]`.
    pub fn new(value: u32) -> Result<Self, CoreError> {
        if value < MIN_THRESHOLD as u32 || value > MAX_THRESHOLD as u32 {
            return Err(CoreError::ThresholdOutOfRange {
                value,
                min: MIN_THRESHOLD,
                max: MAX_THRESHOLD,
            });
        }
        Ok(Self(value as u8))
    }

    /// Raw threshold value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Threshold as a brightness level.
    pub fn as_brightness(self) -> f64 {
        self.0 as f64
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl TryFrom<u32> for Sensitivity {
    type Error = CoreError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Sensitivity> for u32 {
    fn from(value: Sensitivity) -> Self {
        value.0 as u32
    }
}

/// Weighting of the per-cell statistics.
///
/// `score = brightness + colorfulness / colorfulness_divisor`, measured on
/// every `sample_stride`-th pixel of the cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Divisor applied to colorfulness before adding it to brightness.
    pub colorfulness_divisor: f64,
    /// Pixel stride used when sub-sampling a cell.
    pub sample_stride: usize,
}

impl ScoreWeights {
    /// Creates validated score weights.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidWeights`] when the divisor is not a positive
    /// finite number or the stride is zero.
    pub fn new(colorfulness_divisor: f64, sample_stride: usize) -> Result<Self, CoreError> {
        if !colorfulness_divisor.is_finite() || colorfulness_divisor <= 0.0 {
            return Err(CoreError::InvalidWeights(format!(
                "colorfulness divisor must be positive, got {colorfulness_divisor}"
            )));
        }
        if sample_stride == 0 {
            return Err(CoreError::InvalidWeights(
                "sample stride must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            colorfulness_divisor,
            sample_stride,
        })
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            colorfulness_divisor: 10.0,
            sample_stride: 10,
        }
    }
}

/// Output format for retained cell snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFormat {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// JPEG quality in `1..=100`.
    pub jpeg_quality: u8,
}

impl SnapshotFormat {
    /// Creates a validated snapshot format.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidSnapshotFormat`] for zero dimensions or a
    /// quality outside `1..=100`.
    pub fn new(width: u32, height: u32, jpeg_quality: u8) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidSnapshotFormat(
                "snapshot dimensions must be non-zero".to_string(),
            ));
        }
        if !(1..=100).contains(&jpeg_quality) {
            return Err(CoreError::InvalidSnapshotFormat(format!(
                "jpeg quality must be in 1..=100, got {jpeg_quality}"
            )));
        }
        Ok(Self {
            width,
            height,
            jpeg_quality,
        })
    }
}

impl Default for SnapshotFormat {
    fn default() -> Self {
        Self {
            width: 150,
            height: 180,
            jpeg_quality: 90,
        }
    }
}

/// Complete parameter set for one scanner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Minimum brightness for acceptance.
    pub sensitivity: Sensitivity,
    /// Board placement inside the frame.
    pub layout: GridLayout,
    /// Statistic weighting.
    pub weights: ScoreWeights,
    /// Snapshot output format.
    pub snapshot: SnapshotFormat,
}
