use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    Empty,
    RaggedRows { row: usize, expected: usize, actual: usize },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Empty => write!(f, "snapshot must have at least one row and column"),
            SnapshotError::RaggedRows {
                row,
                expected,
                actual,
            } => write!(
                f,
                "row {row} has {actual} cells, expected {expected}"
            ),
        }
    }
}

impl Error for SnapshotError {}

/// Encoded, immutable copy of a grid: `0` for empty cells, `t + 1` for an agent of
/// internal type `t`. Stored row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    height: usize,
    width: usize,
    cells: Vec<u8>,
}

impl GridSnapshot {
    pub fn new(height: usize, width: usize, cells: Vec<u8>) -> Self {
        assert!(height > 0 && width > 0, "snapshot dimensions must be positive");
        assert_eq!(cells.len(), height * width, "cell count must match dimensions");
        Self {
            height,
            width,
            cells,
        }
    }

    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self, SnapshotError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(SnapshotError::Empty);
        }
        let mut cells = Vec::with_capacity(rows.len() * width);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != width {
                return Err(SnapshotError::RaggedRows {
                    row,
                    expected: width,
                    actual: values.len(),
                });
            }
            cells.extend_from_slice(values);
        }
        Ok(Self::new(rows.len(), width, cells))
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.width + col]
    }

    pub fn rows(&self) -> Vec<Vec<u8>> {
        self.cells.chunks(self.width).map(<[u8]>::to_vec).collect()
    }

    /// Largest type code present; zero for an empty grid.
    pub fn max_code(&self) -> u8 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_round_trips_layout() {
        let rows = vec![vec![0, 1, 2], vec![2, 2, 0]];
        let snapshot = GridSnapshot::from_rows(&rows).unwrap();
        assert_eq!(snapshot.height(), 2);
        assert_eq!(snapshot.width(), 3);
        assert_eq!(snapshot.get(1, 0), 2);
        assert_eq!(snapshot.rows(), rows);
        assert_eq!(snapshot.max_code(), 2);
        assert_eq!(snapshot.occupied(), 4);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let rows = vec![vec![0, 1], vec![1]];
        assert_eq!(
            GridSnapshot::from_rows(&rows),
            Err(SnapshotError::RaggedRows {
                row: 1,
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(GridSnapshot::from_rows(&[]), Err(SnapshotError::Empty));
    }
}
