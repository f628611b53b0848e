//! Pipeline configuration

use crate::encoding::DEFAULT_PLACEHOLDER;
use crate::error::{GridFillError, Result};
use crate::imputation::{Aggregation, DEFAULT_MAX_ROUNDS};
use crate::smoothing::DEFAULT_WINDOW;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// How a field's values are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Real-valued, filled with the neighbor mean
    Continuous,
    /// String-valued, encoded and filled with the neighbor mode
    Categorical,
}

impl FieldKind {
    /// Aggregation strategy used to fill this kind of field
    pub fn aggregation(&self) -> Aggregation {
        match self {
            FieldKind::Continuous => Aggregation::Mean,
            FieldKind::Categorical => Aggregation::Mode,
        }
    }
}

/// A field to fill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self { name: name.into(), kind }
    }

    pub fn continuous(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Continuous)
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Categorical)
    }
}

/// Box smoothing applied to one field to derive a new column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothingSpec {
    /// Source field
    pub field: String,

    /// Window side length
    #[serde(default = "default_window")]
    pub window: usize,

    /// Name of the derived column, `{field}_{window}x{window}` when unset
    #[serde(default)]
    pub output: Option<String>,
}

impl SmoothingSpec {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            window: DEFAULT_WINDOW,
            output: None,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Resolved name of the derived column
    pub fn output_name(&self) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| format!("{}_{}x{}", self.field, self.window, self.window))
    }
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_id_column() -> String {
    "OID".to_string()
}

fn default_max_rounds() -> usize {
    DEFAULT_MAX_ROUNDS
}

fn default_missing_label() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

fn default_parallel() -> bool {
    true
}

/// Configuration for a fill run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Grid rows
    pub rows: usize,

    /// Grid columns
    pub cols: usize,

    /// Column holding the 1-based linear cell identifier
    #[serde(default = "default_id_column")]
    pub id_column: String,

    /// Fields to fill
    #[serde(default)]
    pub fields: Vec<FieldSpec>,

    /// Round limit per field
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    /// Label written for categorical cells that stay missing
    #[serde(default = "default_missing_label")]
    pub missing_label: String,

    /// Optional derived smoothed column
    #[serde(default)]
    pub smoothing: Option<SmoothingSpec>,

    /// Fill fields concurrently
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rows: 100,
            cols: 100,
            id_column: default_id_column(),
            fields: Vec::new(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            missing_label: default_missing_label(),
            smoothing: None,
            parallel: true,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration for a `rows x cols` grid
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    /// Builder method to add a field
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Builder method to add several fields of the same kind
    pub fn with_fields<I, S>(mut self, names: I, kind: FieldKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .extend(names.into_iter().map(|n| FieldSpec::new(n, kind)));
        self
    }

    /// Builder method to set the identifier column
    pub fn with_id_column(mut self, name: impl Into<String>) -> Self {
        self.id_column = name.into();
        self
    }

    /// Builder method to set the round limit
    pub fn with_max_rounds(mut self, n: usize) -> Self {
        self.max_rounds = n.max(1);
        self
    }

    /// Builder method to set the missing placeholder label
    pub fn with_missing_label(mut self, label: impl Into<String>) -> Self {
        self.missing_label = label.into();
        self
    }

    /// Builder method to enable smoothing
    pub fn with_smoothing(mut self, smoothing: SmoothingSpec) -> Self {
        self.smoothing = Some(smoothing);
        self
    }

    /// Builder method to toggle concurrent field processing
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty-printed JSON
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), text)?;
        Ok(())
    }

    /// Check parameter ranges and naming conflicts
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            return Err(GridFillError::invalid_parameter("rows", self.rows, "must be positive"));
        }
        if self.cols == 0 {
            return Err(GridFillError::invalid_parameter("cols", self.cols, "must be positive"));
        }
        if self.max_rounds == 0 {
            return Err(GridFillError::invalid_parameter(
                "max_rounds",
                self.max_rounds,
                "must be at least 1",
            ));
        }
        if self.id_column.is_empty() {
            return Err(GridFillError::ConfigError("id_column must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name == self.id_column {
                return Err(GridFillError::ConfigError(format!(
                    "identifier column '{}' cannot be filled",
                    field.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(GridFillError::ConfigError(format!(
                    "field '{}' declared twice",
                    field.name
                )));
            }
        }

        if let Some(smoothing) = &self.smoothing {
            if smoothing.window == 0 {
                return Err(GridFillError::invalid_parameter(
                    "smoothing.window",
                    smoothing.window,
                    "must be positive",
                ));
            }
            let output = smoothing.output_name();
            if output == self.id_column || seen.contains(output.as_str()) {
                return Err(GridFillError::ConfigError(format!(
                    "smoothing output '{}' collides with an existing column",
                    output
                )));
            }
        }

        Ok(())
    }
}
