//! Error types for grid gap filling

use thiserror::Error;

/// Result type alias for gridfill operations
pub type Result<T> = std::result::Result<T, GridFillError>;

/// Main error type for the gridfill crate
#[derive(Error, Debug)]
pub enum GridFillError {
    #[error("Cell identifier {oid} out of range [1, {max}]")]
    OutOfRange { oid: i64, max: usize },

    #[error("Grid {rows}x{cols} expects {expected} cells, table has {actual} records")]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate cell identifier: {0}")]
    DuplicateIdentifier(i64),

    #[error("Field not found: {0}")]
    MissingField(String),

    #[error("Unknown code {code} for field '{field}'")]
    UnknownCode { field: String, code: String },

    #[error("Grid for field '{field}' still has {missing} missing cells")]
    IncompleteGrid { field: String, missing: usize },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GridFillError {
    pub(crate) fn invalid_parameter(name: &str, value: impl ToString, reason: &str) -> Self {
        GridFillError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<polars::error::PolarsError> for GridFillError {
    fn from(err: polars::error::PolarsError) -> Self {
        GridFillError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for GridFillError {
    fn from(err: serde_json::Error) -> Self {
        GridFillError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for GridFillError {
    fn from(err: ndarray::ShapeError) -> Self {
        GridFillError::DataError(format!("invalid grid shape: {}", err))
    }
}
