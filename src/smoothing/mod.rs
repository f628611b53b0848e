//! Fixed-window box smoothing
//!
//! Each output cell is the mean of the `window x window` block centred on it.
//! Positions beyond the grid edge count as zeros and stay in the divisor, so
//! edge and corner cells are pulled toward 0.

use crate::error::{GridFillError, Result};
use crate::grid::Grid;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Default window side length
pub const DEFAULT_WINDOW: usize = 5;

/// Zero-padded box filter over a complete grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedWindowSmoother {
    window: usize,
}

impl Default for FixedWindowSmoother {
    fn default() -> Self {
        Self { window: DEFAULT_WINDOW }
    }
}

impl FixedWindowSmoother {
    /// Create a smoother with the given window side length
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(GridFillError::invalid_parameter("window", window, "must be positive"));
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Cells covered before and after the centre along one axis.
    ///
    /// For even windows the extra cell goes before the centre.
    fn extent(&self) -> (usize, usize) {
        let before = self.window / 2;
        (before, self.window - 1 - before)
    }

    /// Smooth a fully populated grid
    pub fn smooth(&self, grid: &Grid) -> Result<Grid> {
        let missing = grid.missing_count();
        if missing > 0 {
            return Err(GridFillError::DataError(format!(
                "cannot smooth a grid with {} missing cells",
                missing
            )));
        }

        let (rows, cols) = (grid.rows(), grid.cols());
        // Summed-area table with a leading zero row and column
        let mut sat = Array2::<f64>::zeros((rows + 1, cols + 1));
        for r in 0..rows {
            for c in 0..cols {
                let v = grid.get(r, c).unwrap_or(0.0);
                sat[[r + 1, c + 1]] = v + sat[[r, c + 1]] + sat[[r + 1, c]] - sat[[r, c]];
            }
        }

        let (before, after) = self.extent();
        let area = (self.window * self.window) as f64;
        let mut out = Array2::from_elem((rows, cols), None);

        for r in 0..rows {
            let r0 = r.saturating_sub(before);
            let r1 = (r + after + 1).min(rows);
            for c in 0..cols {
                let c0 = c.saturating_sub(before);
                let c1 = (c + after + 1).min(cols);
                let sum = sat[[r1, c1]] - sat[[r0, c1]] - sat[[r1, c0]] + sat[[r0, c0]];
                out[[r, c]] = Some(sum / area);
            }
        }

        Ok(Grid::from_cells(out))
    }
}
