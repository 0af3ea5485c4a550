//! Per-cell evidence retained across sampling passes.

use std::collections::BTreeMap;

use memory_solver_core::{CELL_COUNT, GridCell};
use sha2::{Digest, Sha256};

/// Encoded image of one cell at its best-scoring moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    jpeg: Vec<u8>,
    digest: String,
}

impl Snapshot {
    /// Wraps JPEG bytes and fingerprints them.
    pub fn from_jpeg(width: u32, height: u32, jpeg: Vec<u8>) -> Self {
        let digest = hex::encode(Sha256::digest(&jpeg));
        Self {
            width,
            height,
            jpeg,
            digest,
        }
    }

    /// Snapshot width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Snapshot height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.jpeg
    }

    /// Media type of [`Snapshot::bytes`].
    pub fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }

    /// Hex SHA-256 of the encoded bytes; equal digests mean equal images.
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

/// Best evidence retained for one cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evidence {
    /// Highest accepted score, `0.0` until the first acceptance.
    pub best_score: f64,
    /// Snapshot taken at the highest accepted score.
    pub snapshot: Option<Snapshot>,
}

impl Evidence {
    /// Returns `true` once the cell has a snapshot.
    pub fn is_revealed(&self) -> bool {
        self.snapshot.is_some()
    }
}

/// Fixed 24-slot store of per-cell evidence.
///
/// Scores only ever rise between resets: [`EvidenceStore::update`] ignores
/// candidates that do not strictly beat the stored score.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceStore {
    cells: [Evidence; CELL_COUNT],
}

impl EvidenceStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|_| Evidence::default()),
        }
    }

    /// Evidence for `cell`.
    pub fn get(&self, cell: GridCell) -> &Evidence {
        &self.cells[cell.index()]
    }

    /// Replaces the evidence for `cell` when `score` beats the stored score.
    ///
    /// # Returns
    /// `true` when the evidence was replaced.
    pub fn update(&mut self, cell: GridCell, score: f64, snapshot: Snapshot) -> bool {
        let slot = &mut self.cells[cell.index()];
        if !(score > slot.best_score) {
            return false;
        }
        slot.best_score = score;
        slot.snapshot = Some(snapshot);
        true
    }

    /// Clears every cell back to `{ best_score: 0, snapshot: None }`.
    pub fn reset_all(&mut self) {
        for slot in &mut self.cells {
            *slot = Evidence::default();
        }
    }

    /// Number of cells holding a snapshot.
    pub fn revealed_count(&self) -> usize {
        self.cells.iter().filter(|slot| slot.is_revealed()).count()
    }

    /// All evidence in cell order.
    pub fn entries(&self) -> &[Evidence] {
        &self.cells
    }

    /// Snapshot per cell in cell order, `None` where nothing was accepted.
    pub fn snapshots(&self) -> impl Iterator<Item = Option<&Snapshot>> + '_ {
        self.cells.iter().map(|slot| slot.snapshot.as_ref())
    }

    /// Other cells whose snapshot is byte-identical to `cell`'s.
    pub fn matching_cells(&self, cell: GridCell) -> Vec<GridCell> {
        let Some(own) = &self.get(cell).snapshot else {
            return Vec::new();
        };

        GridCell::all()
            .filter(|other| *other != cell)
            .filter(|other| {
                self.get(*other)
                    .snapshot
                    .as_ref()
                    .is_some_and(|snapshot| snapshot.digest() == own.digest())
            })
            .collect()
    }

    /// Groups of two or more cells sharing an identical snapshot, ordered by
    /// their lowest cell index.
    pub fn matched_groups(&self) -> Vec<Vec<GridCell>> {
        let mut by_digest: BTreeMap<&str, Vec<GridCell>> = BTreeMap::new();
        for cell in GridCell::all() {
            if let Some(snapshot) = &self.get(cell).snapshot {
                by_digest.entry(snapshot.digest()).or_default().push(cell);
            }
        }

        let mut groups: Vec<Vec<GridCell>> = by_digest
            .into_values()
            .filter(|cells| cells.len() > 1)
            .collect();
        groups.sort_by_key(|cells| cells[0]);
        groups
    }
}

impl Default for EvidenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for evidence retention rules.

    use super::*;

    fn cell(index: usize) -> GridCell {
        GridCell::new(index).expect("index in range")
    }

    fn snapshot(tag: u8) -> Snapshot {
        Snapshot::from_jpeg(150, 180, vec![0xFF, 0xD8, tag])
    }

    #[test]
    fn update_only_accepts_strict_improvements() {
        let mut store = EvidenceStore::new();
        assert!(store.update(cell(3), 120.0, snapshot(1)));
        assert!(!store.update(cell(3), 120.0, snapshot(2)));
        assert!(!store.update(cell(3), 90.0, snapshot(3)));

        let evidence = store.get(cell(3));
        assert_eq!(evidence.best_score, 120.0);
        assert_eq!(evidence.snapshot, Some(snapshot(1)));
        assert_eq!(store.revealed_count(), 1);
    }

    #[test]
    fn non_positive_scores_never_reveal() {
        let mut store = EvidenceStore::new();
        assert!(!store.update(cell(0), 0.0, snapshot(1)));
        assert!(!store.update(cell(0), f64::NAN, snapshot(1)));
        assert_eq!(store.revealed_count(), 0);
    }

    #[test]
    fn reset_clears_every_cell() {
        let mut store = EvidenceStore::new();
        for index in 0..CELL_COUNT {
            store.update(cell(index), 100.0 + index as f64, snapshot(index as u8));
        }
        assert_eq!(store.revealed_count(), CELL_COUNT);

        store.reset_all();
        for evidence in store.entries() {
            assert_eq!(evidence, &Evidence::default());
        }
    }

    #[test]
    fn identical_snapshots_form_match_groups() {
        let mut store = EvidenceStore::new();
        store.update(cell(2), 100.0, snapshot(7));
        store.update(cell(9), 110.0, snapshot(7));
        store.update(cell(15), 100.0, snapshot(8));

        assert_eq!(store.matching_cells(cell(2)), vec![cell(9)]);
        assert!(store.matching_cells(cell(15)).is_empty());
        assert!(store.matching_cells(cell(0)).is_empty());
        assert_eq!(store.matched_groups(), vec![vec![cell(2), cell(9)]]);
    }
}
