//! Raw drive-test table cleaning
//!
//! Prepares exported measurement tables before they are joined to a grid:
//! - drops columns that are blank in the first record
//! - drops records repeating a coordinate key (first one wins)
//! - concatenates two identifier columns into a combined key

use crate::error::{GridFillError, Result};
use crate::utils::{DataLoader, DataSaver};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Two columns joined into a new one, e.g. `GNODEB` + `GCELLID` -> `CGI`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineSpec {
    pub left: String,
    pub right: String,
    pub output: String,
}

impl CombineSpec {
    pub fn new(left: impl Into<String>, right: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            output: output.into(),
        }
    }
}

/// Table cleaner configuration and operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCleaner {
    /// Drop columns blank in the first record
    pub drop_blank_columns: bool,
    /// Columns forming the duplicate key; empty disables deduplication
    pub dedupe_keys: Vec<String>,
    /// Optional combined key column
    pub combine: Option<CombineSpec>,
}

impl Default for TableCleaner {
    fn default() -> Self {
        Self {
            drop_blank_columns: true,
            dedupe_keys: vec!["LATITUDE".to_string(), "LONGITUDE".to_string()],
            combine: Some(CombineSpec::new("GNODEB", "GCELLID", "CGI")),
        }
    }
}

/// Summary of a directory run
#[derive(Debug, Clone, Default)]
pub struct CleanSummary {
    /// Written output files
    pub written: Vec<PathBuf>,
    /// Inputs skipped, with the reason
    pub skipped: Vec<(PathBuf, String)>,
}

fn is_blank(value: &AnyValue) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::String(s) => s.trim().is_empty(),
        AnyValue::StringOwned(s) => s.trim().is_empty(),
        AnyValue::Float64(v) => v.is_nan(),
        AnyValue::Float32(v) => v.is_nan(),
        _ => false,
    }
}

fn string_column(df: &DataFrame, name: &str) -> Result<Series> {
    let column = df
        .column(name)
        .map_err(|_| GridFillError::MissingField(name.to_string()))?;
    Ok(column.as_materialized_series().cast(&DataType::String)?)
}

impl TableCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the duplicate key columns
    pub fn with_dedupe_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dedupe_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set or clear the combined key
    pub fn with_combine(mut self, combine: Option<CombineSpec>) -> Self {
        self.combine = combine;
        self
    }

    /// Builder method to toggle blank-column removal
    pub fn with_drop_blank_columns(mut self, enabled: bool) -> Self {
        self.drop_blank_columns = enabled;
        self
    }

    /// Apply every enabled step in order
    pub fn clean(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = if self.drop_blank_columns {
            Self::drop_blank_columns(df)?
        } else {
            df.clone()
        };

        if !self.dedupe_keys.is_empty() {
            result = Self::dedupe(&result, &self.dedupe_keys)?;
        }

        if let Some(spec) = &self.combine {
            result = Self::combine_columns(&result, spec)?;
        }

        Ok(result)
    }

    /// Remove columns whose first value is null, NaN or blank text
    pub fn drop_blank_columns(df: &DataFrame) -> Result<DataFrame> {
        if df.height() == 0 {
            return Ok(df.clone());
        }

        let mut blank = Vec::new();
        for column in df.get_columns() {
            if is_blank(&column.get(0)?) {
                blank.push(column.name().to_string());
            }
        }

        let mut result = df.clone();
        for name in &blank {
            result = result.drop(name)?;
        }
        if !blank.is_empty() {
            info!(columns = ?blank, "Dropped blank columns");
        }
        Ok(result)
    }

    /// Keep only the first record of each key combination
    pub fn dedupe(df: &DataFrame, keys: &[String]) -> Result<DataFrame> {
        let key_columns: Vec<Series> = keys
            .iter()
            .map(|k| string_column(df, k))
            .collect::<Result<_>>()?;
        let key_values: Vec<&StringChunked> = key_columns
            .iter()
            .map(|s| s.str())
            .collect::<PolarsResult<_>>()?;

        let mut seen: HashSet<Vec<Option<&str>>> = HashSet::with_capacity(df.height());
        let mask: Vec<bool> = (0..df.height())
            .map(|i| seen.insert(key_values.iter().map(|ca| ca.get(i)).collect()))
            .collect();

        let kept = mask.iter().filter(|&&m| m).count();
        if kept < df.height() {
            info!(dropped = df.height() - kept, "Dropped duplicate records");
        }

        let mask = BooleanChunked::from_slice("mask".into(), &mask);
        Ok(df.filter(&mask)?)
    }

    /// Add `output` as the text concatenation of `left` and `right`.
    ///
    /// A record missing either part gets a null key.
    pub fn combine_columns(df: &DataFrame, spec: &CombineSpec) -> Result<DataFrame> {
        let left = string_column(df, &spec.left)?;
        let right = string_column(df, &spec.right)?;

        let combined: Vec<Option<String>> = left
            .str()?
            .into_iter()
            .zip(right.str()?)
            .map(|(l, r)| match (l, r) {
                (Some(l), Some(r)) => Some(format!("{}{}", l, r)),
                _ => None,
            })
            .collect();

        let mut result = df.clone();
        result.with_column(Series::new(spec.output.as_str().into(), combined))?;
        Ok(result)
    }

    /// Clean one file into `output_dir` as `cleaned_<name>`
    pub fn clean_file(&self, input: &Path, output_dir: &Path) -> Result<Option<PathBuf>> {
        let df = DataLoader::new().load_auto(input)?;
        if df.height() == 0 {
            return Ok(None);
        }

        let mut cleaned = self.clean(&df)?;
        let file_name = input
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| GridFillError::DataError(format!("bad file name: {}", input.display())))?;
        let output = output_dir.join(format!("cleaned_{}", file_name));
        DataSaver::save_auto(&mut cleaned, &output)?;
        Ok(Some(output))
    }

    /// Clean every `.csv` in `input_dir`.
    ///
    /// Failing files are logged and skipped. When `archive_dir` is set,
    /// each successfully cleaned source is moved there.
    pub fn clean_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        archive_dir: Option<&Path>,
    ) -> Result<CleanSummary> {
        std::fs::create_dir_all(output_dir)?;
        if let Some(dir) = archive_dir {
            std::fs::create_dir_all(dir)?;
        }

        let mut inputs: Vec<PathBuf> = std::fs::read_dir(input_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|e| e.to_str())
                        .map_or(false, |e| e.eq_ignore_ascii_case("csv"))
            })
            .collect();
        inputs.sort();

        let mut summary = CleanSummary::default();
        for input in inputs {
            info!(file = %input.display(), "Cleaning file");
            match self.clean_file(&input, output_dir) {
                Ok(Some(output)) => {
                    if let (Some(dir), Some(name)) = (archive_dir, input.file_name()) {
                        if let Err(e) = move_file(&input, &dir.join(name)) {
                            warn!(file = %input.display(), error = %e, "Failed to archive file");
                            summary.skipped.push((input, format!("archive failed: {}", e)));
                            continue;
                        }
                    }
                    summary.written.push(output);
                }
                Ok(None) => {
                    warn!(file = %input.display(), "Empty file, skipped");
                    summary.skipped.push((input, "empty".to_string()));
                }
                Err(e) => {
                    warn!(file = %input.display(), error = %e, "Failed to clean file");
                    summary.skipped.push((input, e.to_string()));
                }
            }
        }

        Ok(summary)
    }
}

/// Move a file, copying then removing the source when a rename is
/// refused (for example across filesystems).
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if to.is_dir() {
                return Err(rename_err);
            }
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        }
    }
}
