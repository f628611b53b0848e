//! Completeness reporting

use super::FieldKind;
use crate::imputation::FillTrace;
use serde::{Deserialize, Serialize};

/// Outcome of filling one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldReport {
    pub name: String,
    /// Kind actually used, after promotion of string columns
    pub kind: FieldKind,
    /// Cells with a value before filling
    pub observed: usize,
    /// Cells missing before filling
    pub initially_missing: usize,
    /// Cells filled per round
    pub fills_per_round: Vec<usize>,
    /// Cells still missing after filling
    pub residual_missing: usize,
}

impl FieldReport {
    pub(crate) fn new(
        name: &str,
        kind: FieldKind,
        initially_missing: usize,
        total: usize,
        trace: &FillTrace,
        residual_missing: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind,
            observed: total - initially_missing,
            initially_missing,
            fills_per_round: trace.fills_per_round.clone(),
            residual_missing,
        }
    }

    pub fn rounds(&self) -> usize {
        self.fills_per_round.len()
    }

    pub fn is_complete(&self) -> bool {
        self.residual_missing == 0
    }
}

/// Per-field completeness of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub fields: Vec<FieldReport>,
}

impl CompletenessReport {
    /// Report for a field by name
    pub fn field(&self, name: &str) -> Option<&FieldReport> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// True when every field was filled completely
    pub fn is_complete(&self) -> bool {
        self.fields.iter().all(FieldReport::is_complete)
    }

    /// Fields with cells left missing
    pub fn incomplete_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| !f.is_complete())
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
