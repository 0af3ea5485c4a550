//! Board geometry: cell identities and their rectangles inside a frame.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Number of board rows.
pub const GRID_ROWS: usize = 3;
/// Number of board columns.
pub const GRID_COLS: usize = 8;
/// Number of tracked cells.
pub const CELL_COUNT: usize = GRID_ROWS * GRID_COLS;

/// One cell of the 3x8 board, addressed row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct GridCell(usize);

impl GridCell {
    /// Creates a cell from its row-major index.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidCellIndex`] when `index >= CELL_COUNT`.
    pub fn new(index: usize) -> Result<Self, CoreError> {
        if index >= CELL_COUNT {
            return Err(CoreError::InvalidCellIndex(index));
        }
        Ok(Self(index))
    }

    /// Row-major index in `[0, CELL_COUNT)`.
    pub fn index(self) -> usize {
        self.0
    }

    /// Zero-based row.
    pub fn row(self) -> usize {
        self.0 / GRID_COLS
    }

    /// Zero-based column.
    pub fn column(self) -> usize {
        self.0 % GRID_COLS
    }

    /// Iterates every cell in row-major order.
    pub fn all() -> impl Iterator<Item = GridCell> {
        (0..CELL_COUNT).map(GridCell)
    }
}

impl TryFrom<usize> for GridCell {
    type Error = CoreError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

impl From<GridCell> for usize {
    fn from(cell: GridCell) -> Self {
        cell.0
    }
}

/// Cell rectangle in fractional source-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl CellRect {
    /// Right edge (`x + width`).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Snaps the rectangle onto whole pixels.
    ///
    /// Origins and extents are floored, so the snapped rectangle never grows
    /// past the fractional one.
    ///
    /// # Returns
    /// `None` when any coordinate is negative or non-finite, or when the
    /// snapped rectangle has no area.
    pub fn to_pixels(&self) -> Option<PixelRect> {
        let values = [self.x, self.y, self.width, self.height];
        if values.iter().any(|value| !value.is_finite() || *value < 0.0) {
            return None;
        }

        let rect = PixelRect {
            x: self.x.floor().min(u32::MAX as f64) as u32,
            y: self.y.floor().min(u32::MAX as f64) as u32,
            width: self.width.floor().min(u32::MAX as f64) as u32,
            height: self.height.floor().min(u32::MAX as f64) as u32,
        };
        (!rect.is_empty()).then_some(rect)
    }
}

/// Whole-pixel rectangle used for reading frame buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Returns `true` when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` when the rectangle lies inside a `width x height` buffer.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        let right = self.x as u64 + self.width as u64;
        let bottom = self.y as u64 + self.height as u64;
        right <= width as u64 && bottom <= height as u64
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Fractional placement of the board inside a frame.
///
/// The defaults skip the header chrome at the top of the game view and the
/// margins at the sides. Each cell is shrunk by `cell_inset` of its size on
/// every side so sampling stays inside the tile when the board is slightly
/// misaligned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Left edge of the board as a fraction of frame width.
    pub origin_x: f64,
    /// Top edge of the board as a fraction of frame height.
    pub origin_y: f64,
    /// Board width as a fraction of frame width.
    pub extent_width: f64,
    /// Board height as a fraction of frame height.
    pub extent_height: f64,
    /// Per-side inset as a fraction of the nominal cell size.
    pub cell_inset: f64,
}

impl GridLayout {
    /// Canonical layout: origin at (5%, 22%), extent 90% x 65%.
    pub const CANONICAL: GridLayout = GridLayout {
        origin_x: 0.05,
        origin_y: 0.22,
        extent_width: 0.90,
        extent_height: 0.65,
        cell_inset: 0.05,
    };

    /// Overlay layout: origin at (5%, 20%), extent 90% x 68%.
    pub const OVERLAY: GridLayout = GridLayout {
        origin_x: 0.05,
        origin_y: 0.20,
        extent_width: 0.90,
        extent_height: 0.68,
        cell_inset: 0.05,
    };

    /// Returns the canonical layout.
    pub fn canonical() -> Self {
        Self::CANONICAL
    }

    /// Returns the overlay layout.
    pub fn overlay() -> Self {
        Self::OVERLAY
    }

    /// Creates a validated layout.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidLayout`] when a fraction is outside
    /// `[0, 1]`, the board reaches past the frame, or the inset swallows the
    /// whole cell.
    pub fn new(
        origin_x: f64,
        origin_y: f64,
        extent_width: f64,
        extent_height: f64,
        cell_inset: f64,
    ) -> Result<Self, CoreError> {
        let layout = Self {
            origin_x,
            origin_y,
            extent_width,
            extent_height,
            cell_inset,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Checks the layout invariants.
    ///
    /// # Errors
    /// See [`GridLayout::new`].
    pub fn validate(&self) -> Result<(), CoreError> {
        let fractions = [
            ("origin_x", self.origin_x),
            ("origin_y", self.origin_y),
            ("extent_width", self.extent_width),
            ("extent_height", self.extent_height),
        ];
        for (name, value) in fractions {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(CoreError::InvalidLayout(format!(
                    "{name} must be a fraction in [0, 1], got {value}"
                )));
            }
        }
        if self.extent_width == 0.0 || self.extent_height == 0.0 {
            return Err(CoreError::InvalidLayout(
                "board extent must be non-zero".to_string(),
            ));
        }
        if self.origin_x + self.extent_width > 1.0 || self.origin_y + self.extent_height > 1.0 {
            return Err(CoreError::InvalidLayout(
                "board must fit inside the frame".to_string(),
            ));
        }
        if !self.cell_inset.is_finite() || !(0.0..0.5).contains(&self.cell_inset) {
            return Err(CoreError::InvalidLayout(format!(
                "cell_inset must be in [0, 0.5), got {}",
                self.cell_inset
            )));
        }
        Ok(())
    }

    /// Nominal cell box before the inset is applied.
    ///
    /// Nominal boxes of neighbouring cells share edges, so together they tile
    /// the board area without gaps.
    pub fn nominal_rect(&self, cell: GridCell, frame_width: u32, frame_height: u32) -> CellRect {
        let width = frame_width as f64;
        let height = frame_height as f64;
        let cell_width = width * self.extent_width / GRID_COLS as f64;
        let cell_height = height * self.extent_height / GRID_ROWS as f64;

        CellRect {
            x: width * self.origin_x + cell.column() as f64 * cell_width,
            y: height * self.origin_y + cell.row() as f64 * cell_height,
            width: cell_width,
            height: cell_height,
        }
    }

    /// Sampled rectangle for `cell`: the nominal box shrunk by the inset.
    pub fn rect_for(&self, cell: GridCell, frame_width: u32, frame_height: u32) -> CellRect {
        let nominal = self.nominal_rect(cell, frame_width, frame_height);
        let scale = 1.0 - 2.0 * self.cell_inset;

        CellRect {
            x: nominal.x + nominal.width * self.cell_inset,
            y: nominal.y + nominal.height * self.cell_inset,
            width: nominal.width * scale,
            height: nominal.height * scale,
        }
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::CANONICAL
    }
}

/// Computes the sampled rectangle for `cell` using the canonical layout.
pub fn rect_for(cell: GridCell, frame_width: u32, frame_height: u32) -> CellRect {
    GridLayout::CANONICAL.rect_for(cell, frame_width, frame_height)
}

#[cfg(test)]
mod tests {
    //! Unit tests for cell addressing and rectangle math.

    use super::*;

    #[test]
    fn cells_are_row_major() {
        let last = GridCell::new(23).expect("last cell is valid");
        assert_eq!(last.row(), 2);
        assert_eq!(last.column(), 7);
        assert!(GridCell::new(24).is_err());
        assert_eq!(GridCell::all().count(), CELL_COUNT);
    }

    #[test]
    fn first_cell_matches_canonical_fractions() {
        let rect = rect_for(GridCell::new(0).expect("valid"), 1280, 720);
        // Nominal box is 144 x 156 starting at (64, 158.4); the inset is 5%.
        assert!((rect.x - 71.2).abs() < 1e-9);
        assert!((rect.y - 166.2).abs() < 1e-9);
        assert!((rect.width - 129.6).abs() < 1e-9);
        assert!((rect.height - 140.4).abs() < 1e-9);

        let pixels = rect.to_pixels().expect("non-empty");
        assert_eq!(
            pixels,
            PixelRect {
                x: 71,
                y: 166,
                width: 129,
                height: 140
            }
        );
    }

    #[test]
    fn tiny_frames_snap_to_empty_rectangles() {
        let rect = rect_for(GridCell::new(5).expect("valid"), 8, 4);
        assert!(rect.to_pixels().is_none());
    }

    #[test]
    fn layout_validation_rejects_overhang() {
        assert!(GridLayout::new(0.2, 0.2, 0.9, 0.5, 0.05).is_err());
        assert!(GridLayout::new(0.05, 0.22, 0.9, 0.65, 0.5).is_err());
        assert!(GridLayout::new(0.05, 0.20, 0.9, 0.68, 0.05).is_ok());
    }
}
