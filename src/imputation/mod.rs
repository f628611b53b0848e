//! Spatial imputation module
//!
//! Fills gaps in a [`Grid`](crate::grid::Grid) using only neighboring cells:
//! - `Mean` aggregation for continuous fields
//! - `Mode` aggregation for categorical (already encoded) fields

mod neighborhood;

pub use neighborhood::NeighborhoodImputer;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default number of fill rounds
pub const DEFAULT_MAX_ROUNDS: usize = 20;

/// Strategy for combining present neighbor values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Arithmetic mean
    Mean,
    /// Most frequent integer value; ties go to the lowest value
    Mode,
}

impl Aggregation {
    /// Aggregate present values, `None` if there are none
    pub fn aggregate(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        match self {
            Aggregation::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
            Aggregation::Mode => {
                let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
                for &v in values {
                    *counts.entry(v as i64).or_insert(0) += 1;
                }
                // Ascending key order + strict comparison keeps the lowest on ties
                let mut best: Option<(i64, usize)> = None;
                for (value, count) in counts {
                    if best.map_or(true, |(_, c)| count > c) {
                        best = Some((value, count));
                    }
                }
                best.map(|(value, _)| value as f64)
            }
        }
    }
}

/// Per-round fill counts of one [`NeighborhoodImputer::iterate`] run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillTrace {
    /// Cells filled in each round, in order
    pub fills_per_round: Vec<usize>,
    /// A round filled zero cells before the round limit
    pub converged: bool,
}

impl FillTrace {
    pub fn rounds(&self) -> usize {
        self.fills_per_round.len()
    }

    pub fn total_filled(&self) -> usize {
        self.fills_per_round.iter().sum()
    }
}

/// Check if a raw value counts as missing
#[inline]
pub fn is_missing(v: Option<f64>) -> bool {
    v.map_or(true, f64::is_nan)
}
