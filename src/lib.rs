//! gridfill - Spatial gap filling for gridded measurements
//!
//! This crate turns sparse per-cell measurements on a regular grid into
//! complete, gap-free fields using only neighboring cell values:
//! - Mapping between linear cell identifiers and grid coordinates
//! - Missingness-preserving categorical encoding
//! - Iterative 3x3 neighborhood fill (mean or mode)
//! - Zero-padded box smoothing for derived features
//!
//! # Modules
//!
//! ## Core
//! - [`grid`] - Identifier mapping and grid storage
//! - [`encoding`] - Categorical codec
//! - [`imputation`] - Neighborhood imputer
//! - [`smoothing`] - Fixed-window smoother
//!
//! ## Orchestration
//! - [`pipeline`] - Per-field fill pipeline and completeness report
//! - [`cleaning`] - Raw export cleaning
//!
//! ## Services
//! - [`cli`] - Command-line interface
//! - [`utils`] - Data loading and saving

// Core error handling
pub mod error;

// Core
pub mod grid;
pub mod encoding;
pub mod imputation;
pub mod smoothing;

// Orchestration
pub mod pipeline;
pub mod cleaning;

// Services
pub mod cli;
pub mod utils;

pub use error::{GridFillError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{GridFillError, Result};

    // Grid
    pub use crate::grid::{Grid, GridIndexMapper};

    // Encoding
    pub use crate::encoding::{CategoricalCodec, CodecTable};

    // Imputation
    pub use crate::imputation::{Aggregation, FillTrace, NeighborhoodImputer};

    // Smoothing
    pub use crate::smoothing::FixedWindowSmoother;

    // Pipeline
    pub use crate::pipeline::{
        CompletenessReport, FieldKind, FieldReport, FieldSpec, Pipeline, PipelineConfig,
        PipelineOutput, SmoothingSpec,
    };

    // Cleaning
    pub use crate::cleaning::{CombineSpec, TableCleaner};

    // Data I/O
    pub use crate::utils::{DataLoader, DataSaver};
}
