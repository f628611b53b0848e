//! Linear cell identifier <-> (row, column) mapping
//!
//! Identifiers are 1-based and numbered bottom-up: identifier 1 is the
//! leftmost cell of the bottom row, identifiers grow left-to-right within a
//! row, and each block of `cols` identifiers moves one row up. Row 0 is the
//! topmost row of the grid.

use crate::error::{GridFillError, Result};
use serde::{Deserialize, Serialize};

/// Bijection between linear cell identifiers and grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridIndexMapper {
    rows: usize,
    cols: usize,
}

impl GridIndexMapper {
    /// Create a mapper for a `rows x cols` grid
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 {
            return Err(GridFillError::invalid_parameter("rows", rows, "must be positive"));
        }
        if cols == 0 {
            return Err(GridFillError::invalid_parameter("cols", cols, "must be positive"));
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells, which is also the largest valid identifier
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Map a 1-based identifier to `(row, col)`
    #[inline]
    pub fn to_rc(&self, oid: usize) -> Result<(usize, usize)> {
        if oid == 0 || oid > self.len() {
            return Err(GridFillError::OutOfRange {
                oid: oid as i64,
                max: self.len(),
            });
        }
        let offset = oid - 1;
        Ok((self.rows - 1 - offset / self.cols, offset % self.cols))
    }

    /// Map `(row, col)` back to its 1-based identifier
    #[inline]
    pub fn to_oid(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(GridFillError::invalid_parameter(
                "cell",
                format!("({}, {})", row, col),
                &format!("outside {}x{} grid", self.rows, self.cols),
            ));
        }
        Ok((self.rows - 1 - row) * self.cols + col + 1)
    }

    /// Validate a raw identifier read from a table and convert it to `usize`
    pub fn check_oid(&self, oid: i64) -> Result<usize> {
        if oid < 1 || oid as u64 > self.len() as u64 {
            return Err(GridFillError::OutOfRange { oid, max: self.len() });
        }
        Ok(oid as usize)
    }

    /// All identifiers in ascending order
    pub fn oids(&self) -> impl Iterator<Item = usize> {
        1..=self.len()
    }
}
