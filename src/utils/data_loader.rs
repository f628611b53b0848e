//! Data loading utilities

use crate::error::{GridFillError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Supported table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Parquet,
    Json,
    JsonLines,
}

impl TableFormat {
    /// Detect the format from a file extension, defaulting to CSV
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "tsv" => TableFormat::Tsv,
            "parquet" | "pq" => TableFormat::Parquet,
            "json" => TableFormat::Json,
            "jsonl" | "ndjson" => TableFormat::JsonLines,
            _ => TableFormat::Csv,
        }
    }
}

/// Data loader for grid tables
pub struct DataLoader {
    /// Rows used for schema inference; `None` scans the whole file
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader.
    ///
    /// Grid tables are sparse, so a column can be empty for thousands of
    /// leading records; the schema is inferred over the full file.
    pub fn new() -> Self {
        Self {
            infer_schema_length: None,
        }
    }

    /// Set schema inference length (`None` scans the whole file)
    pub fn with_infer_schema_length(mut self, n: Option<usize>) -> Self {
        self.infer_schema_length = n;
        self
    }

    /// Load a delimited text file with a header row
    pub fn load_csv_with_separator(&self, path: &Path, separator: u8) -> Result<DataFrame> {
        let file = File::open(path)?;

        let parse_opts = CsvParseOptions::default().with_separator(separator);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| GridFillError::DataError(format!("{}: {}", path.display(), e)))
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        self.load_csv_with_separator(path, b',')
    }

    /// Load a Parquet file
    pub fn load_parquet(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)?;
        Ok(ParquetReader::new(file).finish()?)
    }

    /// Load a JSON array file
    pub fn load_json(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)?;
        Ok(JsonReader::new(file).finish()?)
    }

    /// Load a newline-delimited JSON file
    pub fn load_json_lines(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)?;
        Ok(JsonReader::new(file)
            .with_json_format(JsonFormat::JsonLines)
            .infer_schema_len(self.infer_schema_length.and_then(std::num::NonZeroUsize::new))
            .finish()?)
    }

    /// Detect file format from extension and load
    pub fn load_auto(&self, path: &Path) -> Result<DataFrame> {
        let start = Instant::now();
        let df = match TableFormat::from_path(path) {
            TableFormat::Csv => self.load_csv(path)?,
            TableFormat::Tsv => self.load_csv_with_separator(path, b'\t')?,
            TableFormat::Parquet => self.load_parquet(path)?,
            TableFormat::Json => self.load_json(path)?,
            TableFormat::JsonLines => self.load_json_lines(path)?,
        };
        debug!(
            path = %path.display(),
            rows = df.height(),
            cols = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded table"
        );
        Ok(df)
    }
}

/// Save DataFrame to various formats
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV
    pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file).include_header(true).finish(df)?;
        Ok(())
    }

    /// Save to Parquet
    pub fn save_parquet(df: &mut DataFrame, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        ParquetWriter::new(file).finish(df)?;
        Ok(())
    }

    /// Save to JSON
    pub fn save_json(df: &mut DataFrame, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        JsonWriter::new(&mut file)
            .with_json_format(JsonFormat::Json)
            .finish(df)?;
        Ok(())
    }

    /// Save to newline-delimited JSON
    pub fn save_json_lines(df: &mut DataFrame, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        JsonWriter::new(&mut file)
            .with_json_format(JsonFormat::JsonLines)
            .finish(df)?;
        Ok(())
    }

    /// Pick the writer from the file extension
    pub fn save_auto(df: &mut DataFrame, path: &Path) -> Result<()> {
        match TableFormat::from_path(path) {
            TableFormat::Csv => Self::save_csv(df, path),
            TableFormat::Tsv => {
                let mut file = File::create(path)?;
                CsvWriter::new(&mut file)
                    .include_header(true)
                    .with_separator(b'\t')
                    .finish(df)?;
                Ok(())
            }
            TableFormat::Parquet => Self::save_parquet(df, path),
            TableFormat::Json => Self::save_json(df, path),
            TableFormat::JsonLines => Self::save_json_lines(df, path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_csv() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        writeln!(file, "OID,SS_RSRP,NETWORK_TYPE").unwrap();
        writeln!(file, "1,-95.5,NR").unwrap();
        writeln!(file, "2,,LTE").unwrap();
        writeln!(file, "3,-101.0,").unwrap();
        file
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(TableFormat::from_path(Path::new("a.CSV")), TableFormat::Csv);
        assert_eq!(TableFormat::from_path(Path::new("a.tsv")), TableFormat::Tsv);
        assert_eq!(TableFormat::from_path(Path::new("a.pq")), TableFormat::Parquet);
        assert_eq!(TableFormat::from_path(Path::new("a.json")), TableFormat::Json);
        assert_eq!(TableFormat::from_path(Path::new("a.jsonl")), TableFormat::JsonLines);
        assert_eq!(TableFormat::from_path(Path::new("noext")), TableFormat::Csv);
    }

    #[test]
    fn test_load_csv_with_nulls() {
        let file = create_test_csv();
        let df = DataLoader::new().load_auto(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
        assert_eq!(df.column("SS_RSRP").unwrap().null_count(), 1);
        assert_eq!(df.column("NETWORK_TYPE").unwrap().null_count(), 1);
    }

    #[test]
    fn test_save_and_reload_csv() {
        let mut df = df!(
            "OID" => &[1i64, 2],
            "v" => &[1.5, 2.5],
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        DataSaver::save_auto(&mut df, &path).unwrap();
        let back = DataLoader::new().load_auto(&path).unwrap();
        assert_eq!(back.shape(), (2, 2));
    }

    #[test]
    fn test_json_lines_round_trip() {
        let mut df = df!(
            "OID" => &[1i64, 2, 3],
            "NR_BAND" => &["n78", "n41", "n78"],
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.jsonl");

        DataSaver::save_auto(&mut df, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(!text.trim_start().starts_with('['));

        let back = DataLoader::new().load_auto(&path).unwrap();
        assert_eq!(back.shape(), (3, 2));
    }

    #[test]
    fn test_sparse_leading_rows_stay_numeric() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "OID,SS_RSRP").unwrap();
        for oid in 1..=1500 {
            if oid <= 1200 {
                writeln!(file, "{},", oid).unwrap();
            } else {
                writeln!(file, "{},-97.5", oid).unwrap();
            }
        }

        let df = DataLoader::new().load_auto(file.path()).unwrap();
        assert_eq!(df.column("SS_RSRP").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("SS_RSRP").unwrap().null_count(), 1200);
    }

    #[test]
    fn test_load_missing_file() {
        let err = DataLoader::new().load_auto(Path::new("/nonexistent/grid.csv")).unwrap_err();
        assert!(matches!(err, GridFillError::IoError(_)));
    }
}
