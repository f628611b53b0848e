//! Regular grid storage
//!
//! A [`Grid`] holds one optional real value per cell. `None` is the missing
//! marker; it can never collide with a stored value, including a categorical
//! code of 0.

mod index;

pub use index::GridIndexMapper;

use crate::error::{GridFillError, Result};
use ndarray::Array2;

/// `rows x cols` array of optional values
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: Array2<Option<f64>>,
}

impl Grid {
    /// Create a grid with every cell missing
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cells: Array2::from_elem((rows, cols), None),
        }
    }

    /// Wrap an existing cell array
    pub fn from_cells(cells: Array2<Option<f64>>) -> Self {
        Self { cells }
    }

    /// Build from row-major values (row 0 first)
    pub fn from_shape_vec(rows: usize, cols: usize, values: Vec<Option<f64>>) -> Result<Self> {
        Ok(Self {
            cells: Array2::from_shape_vec((rows, cols), values)?,
        })
    }

    /// Place per-record values at the cells their identifiers map to.
    ///
    /// Cells with no record stay missing; NaN values are stored as missing.
    pub fn from_records(
        mapper: &GridIndexMapper,
        oids: &[usize],
        values: &[Option<f64>],
    ) -> Result<Self> {
        if oids.len() != values.len() {
            return Err(GridFillError::DataError(format!(
                "{} identifiers but {} values",
                oids.len(),
                values.len()
            )));
        }

        let mut grid = Self::new(mapper.rows(), mapper.cols());
        for (&oid, &value) in oids.iter().zip(values) {
            let (r, c) = mapper.to_rc(oid)?;
            grid.cells[[r, c]] = value.filter(|v| !v.is_nan());
        }
        Ok(grid)
    }

    /// Read back one value per identifier, in the order given
    pub fn to_records(&self, mapper: &GridIndexMapper, oids: &[usize]) -> Result<Vec<Option<f64>>> {
        self.check_shape(mapper)?;
        oids.iter()
            .map(|&oid| {
                let (r, c) = mapper.to_rc(oid)?;
                Ok(self.cells[[r, c]])
            })
            .collect()
    }

    fn check_shape(&self, mapper: &GridIndexMapper) -> Result<()> {
        if self.rows() != mapper.rows() || self.cols() != mapper.cols() {
            return Err(GridFillError::DimensionMismatch {
                rows: mapper.rows(),
                cols: mapper.cols(),
                expected: mapper.len(),
                actual: self.len(),
            });
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cells.get((row, col)).copied().flatten()
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: Option<f64>) {
        if let Some(cell) = self.cells.get_mut((row, col)) {
            *cell = value;
        }
    }

    pub fn cells(&self) -> &Array2<Option<f64>> {
        &self.cells
    }

    pub fn into_cells(self) -> Array2<Option<f64>> {
        self.cells
    }

    /// Number of missing cells
    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|v| v.is_none()).count()
    }

    /// True when no cell is missing
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Present values of the 3x3 block around `(row, col)`, clipped to the grid.
    ///
    /// The centre cell is included; callers only ask about missing centres.
    pub(crate) fn neighbor_values(&self, row: usize, col: usize, out: &mut Vec<f64>) {
        out.clear();
        let r_end = (row + 2).min(self.rows());
        let c_end = (col + 2).min(self.cols());
        for r in row.saturating_sub(1)..r_end {
            for c in col.saturating_sub(1)..c_end {
                if let Some(v) = self.cells[[r, c]] {
                    out.push(v);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_round_trip() {
        let mapper = GridIndexMapper::new(2, 3).unwrap();
        let oids: Vec<usize> = vec![6, 1, 4, 2, 5, 3];
        let values = vec![Some(6.0), Some(1.0), None, Some(2.0), Some(5.0), Some(f64::NAN)];

        let grid = Grid::from_records(&mapper, &oids, &values).unwrap();
        assert_eq!(grid.get(1, 0), Some(1.0));
        assert_eq!(grid.get(0, 2), Some(6.0));
        assert_eq!(grid.get(0, 0), None);
        // NaN is read as missing
        assert_eq!(grid.get(1, 2), None);
        assert_eq!(grid.missing_count(), 2);

        let back = grid.to_records(&mapper, &oids).unwrap();
        assert_eq!(back, vec![Some(6.0), Some(1.0), None, Some(2.0), Some(5.0), None]);
    }

    #[test]
    fn test_from_records_rejects_bad_identifier() {
        let mapper = GridIndexMapper::new(2, 2).unwrap();
        let err = Grid::from_records(&mapper, &[1, 9], &[Some(1.0), Some(2.0)]).unwrap_err();
        assert!(matches!(err, GridFillError::OutOfRange { oid: 9, .. }));
    }

    #[test]
    fn test_to_records_shape_mismatch() {
        let mapper = GridIndexMapper::new(2, 2).unwrap();
        let grid = Grid::new(3, 3);
        assert!(matches!(
            grid.to_records(&mapper, &[1]),
            Err(GridFillError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_neighbor_values_clipped() {
        let values = (0..9).map(|v| Some(v as f64)).collect();
        let grid = Grid::from_shape_vec(3, 3, values).unwrap();

        let mut buf = Vec::new();
        grid.neighbor_values(0, 0, &mut buf);
        assert_eq!(buf, vec![0.0, 1.0, 3.0, 4.0]);

        grid.neighbor_values(1, 1, &mut buf);
        assert_eq!(buf.len(), 9);

        grid.neighbor_values(2, 1, &mut buf);
        assert_eq!(buf, vec![3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }
}
