//! Field-by-field fill pipeline
//!
//! For each declared field: gather the column into a grid, fill it, read the
//! values back in record order and, for categorical fields, decode them. An
//! optional smoothing step derives one extra column from a completed field.

mod columns;
mod config;
mod report;

pub use columns::read_identifiers;
pub use config::{FieldKind, FieldSpec, PipelineConfig, SmoothingSpec};
pub use report::{CompletenessReport, FieldReport};

use crate::encoding::{CategoricalCodec, CodecTable};
use crate::error::{GridFillError, Result};
use crate::grid::{Grid, GridIndexMapper};
use crate::imputation::NeighborhoodImputer;
use crate::smoothing::FixedWindowSmoother;
use polars::prelude::*;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{info, warn};

/// Result of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Input table with filled fields and the derived column
    pub frame: DataFrame,
    /// Per-field completeness
    pub report: CompletenessReport,
    /// Codec tables of categorical fields, by field name
    pub codecs: BTreeMap<String, CodecTable>,
}

/// Result of filling one field
struct FieldOutcome {
    column: Series,
    report: FieldReport,
    codec: Option<CodecTable>,
    /// Filled reals in record order, continuous fields only
    numeric: Option<Vec<Option<f64>>>,
}

/// Spatial gap-filling pipeline over a tabular data set
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    mapper: GridIndexMapper,
    codec: CategoricalCodec,
}

impl Pipeline {
    /// Create a pipeline from a validated configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let mapper = GridIndexMapper::new(config.rows, config.cols)?;
        let codec = CategoricalCodec::new(config.missing_label.clone());
        Ok(Self { config, mapper, codec })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn mapper(&self) -> &GridIndexMapper {
        &self.mapper
    }

    /// Fill every declared field of `df` and attach the smoothed column
    pub fn run(&self, df: &DataFrame) -> Result<PipelineOutput> {
        let start = Instant::now();
        self.check_columns(df)?;
        let oids = read_identifiers(df, &self.config.id_column, &self.mapper)?;

        info!(
            rows = self.mapper.rows(),
            cols = self.mapper.cols(),
            fields = self.config.fields.len(),
            parallel = self.config.parallel,
            "Starting grid fill"
        );

        let outcomes: Vec<FieldOutcome> = if self.config.parallel {
            self.config
                .fields
                .par_iter()
                .map(|field| self.fill_field(df, field, &oids))
                .collect::<Result<Vec<_>>>()?
        } else {
            self.config
                .fields
                .iter()
                .map(|field| self.fill_field(df, field, &oids))
                .collect::<Result<Vec<_>>>()?
        };

        let mut frame = df.clone();
        let mut report = CompletenessReport::default();
        let mut codecs = BTreeMap::new();
        let mut completed: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();

        for outcome in outcomes {
            let name = outcome.report.name.clone();
            frame.with_column(outcome.column)?;
            if let Some(codec) = outcome.codec {
                codecs.insert(name.clone(), codec);
            }
            if let Some(values) = outcome.numeric {
                completed.insert(name, values);
            }
            report.fields.push(outcome.report);
        }

        if let Some(spec) = &self.config.smoothing {
            let column = self.smooth_field(df, spec, &oids, completed.remove(&spec.field))?;
            frame.with_column(column)?;
        }

        let incomplete = report.incomplete_fields();
        if !incomplete.is_empty() {
            warn!(fields = ?incomplete, "Some fields still have missing cells");
        }
        info!(elapsed_ms = start.elapsed().as_millis() as u64, "Grid fill finished");

        Ok(PipelineOutput { frame, report, codecs })
    }

    /// Fail before building any grid if a referenced column is absent
    fn check_columns(&self, df: &DataFrame) -> Result<()> {
        columns::column(df, &self.config.id_column)?;
        for field in &self.config.fields {
            columns::column(df, &field.name)?;
        }
        if let Some(spec) = &self.config.smoothing {
            columns::column(df, &spec.field)?;
        }
        Ok(())
    }

    fn imputer(&self, kind: FieldKind) -> NeighborhoodImputer {
        NeighborhoodImputer::new(kind.aggregation()).with_max_rounds(self.config.max_rounds)
    }

    /// Kind used for filling.
    ///
    /// A string column declared continuous stays continuous when all of its
    /// tokens are numbers; otherwise it is filled as categorical.
    fn effective_kind(field: &FieldSpec, series: &Series) -> Result<FieldKind> {
        if field.kind == FieldKind::Continuous
            && columns::is_text(series)
            && !columns::is_numeric_text(series)?
        {
            warn!(field = %field.name, "String column declared continuous, filling as categorical");
            return Ok(FieldKind::Categorical);
        }
        Ok(field.kind)
    }

    fn fill_field(&self, df: &DataFrame, field: &FieldSpec, oids: &[usize]) -> Result<FieldOutcome> {
        let series = columns::column(df, &field.name)?;
        let kind = Self::effective_kind(field, series)?;

        let (values, table) = match kind {
            FieldKind::Continuous => (columns::read_numeric(series)?, None),
            FieldKind::Categorical => {
                let tokens = columns::read_text(series)?;
                let refs: Vec<Option<&str>> = tokens.iter().map(|t| t.as_deref()).collect();
                let (codes, table) = self.codec.encode(&field.name, &refs);
                let values = codes.into_iter().map(|c| c.map(f64::from)).collect();
                (values, Some(table))
            }
        };

        let grid = Grid::from_records(&self.mapper, oids, &values)?;
        let initially_missing = grid.missing_count();
        info!(field = %field.name, kind = ?kind, missing = initially_missing, "Filling field");

        let (grid, trace) = self.imputer(kind).iterate(grid);
        let residual = grid.missing_count();
        let filled = grid.to_records(&self.mapper, oids)?;

        info!(
            field = %field.name,
            filled = trace.total_filled(),
            rounds = trace.rounds(),
            residual,
            "Field filled"
        );
        if residual > 0 {
            warn!(field = %field.name, residual, "Field left incomplete");
        }

        let report = FieldReport::new(&field.name, kind, initially_missing, grid.len(), &trace, residual);
        let name: PlSmallStr = field.name.as_str().into();

        let outcome = match table {
            Some(table) => {
                let decoded = self.codec.decode_values(&filled, &table)?;
                FieldOutcome {
                    column: Series::new(name, decoded),
                    report,
                    codec: Some(table),
                    numeric: None,
                }
            }
            None => FieldOutcome {
                column: Series::new(name, filled.clone()),
                report,
                codec: None,
                numeric: Some(filled),
            },
        };

        Ok(outcome)
    }

    /// Build the derived smoothed column.
    ///
    /// Reuses the filled values when the source is a declared continuous
    /// field; otherwise the raw column is mean-filled first.
    fn smooth_field(
        &self,
        df: &DataFrame,
        spec: &SmoothingSpec,
        oids: &[usize],
        completed: Option<Vec<Option<f64>>>,
    ) -> Result<Series> {
        let smoother = FixedWindowSmoother::new(spec.window)?;

        let grid = match completed {
            Some(values) => Grid::from_records(&self.mapper, oids, &values)?,
            None => {
                let series = columns::column(df, &spec.field)?;
                let declared_categorical = self
                    .config
                    .fields
                    .iter()
                    .any(|f| f.name == spec.field && f.kind == FieldKind::Categorical);
                let promoted = columns::is_text(series) && !columns::is_numeric_text(series)?;
                if declared_categorical || promoted {
                    return Err(GridFillError::ConfigError(format!(
                        "smoothing field '{}' must be continuous",
                        spec.field
                    )));
                }
                let raw = Grid::from_records(&self.mapper, oids, &columns::read_numeric(series)?)?;
                self.imputer(FieldKind::Continuous).iterate(raw).0
            }
        };

        let missing = grid.missing_count();
        if missing > 0 {
            return Err(GridFillError::IncompleteGrid {
                field: spec.field.clone(),
                missing,
            });
        }

        let smoothed = smoother.smooth(&grid)?;
        let values = smoothed.to_records(&self.mapper, oids)?;
        let output = spec.output_name();
        info!(field = %spec.field, output = %output, window = spec.window, "Derived smoothed column");

        Ok(Series::new(output.as_str().into(), values))
    }
}
