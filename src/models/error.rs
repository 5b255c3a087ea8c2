//! Error types for tcompare.
//!
//! Epistemic taxonomy:
//! - B_i falsified: The input did not hold what the config promised
//! - I^B materialized: The filesystem refused a write
//! - K_i violated: The statistics are undefined for the selected data

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for tcompare.
///
/// Every variant is fatal to a run: there is no partial result to keep.
#[derive(Debug, Error)]
pub enum TcompareError {
    // ═══════════════════════════════════════════════════════════════════
    // B_i FALSIFIED: Input does not match expectations
    // ═══════════════════════════════════════════════════════════════════

    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error("Failed to load data from {path}: {reason}")]
    DataLoad { path: PathBuf, reason: String },

    #[error("Column '{column}' not found (available: {})", available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("Row {row}: column '{column}' holds non-numeric value '{value}'")]
    NonNumericValue {
        row: usize,
        column: String,
        value: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // K_i VIOLATED: Statistic undefined for this data
    // ═══════════════════════════════════════════════════════════════════

    #[error("Group '{group}' has {count} observation(s); at least 2 are required")]
    InsufficientData { group: String, count: usize },

    #[error("Both groups have zero variance and equal means; t-statistic is undefined")]
    DegenerateVariance,

    #[error("Internal error: {0}")]
    Internal(String),

    // ═══════════════════════════════════════════════════════════════════
    // I^B MATERIALIZED: Output could not be written
    // ═══════════════════════════════════════════════════════════════════

    #[error("Failed to write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl TcompareError {
    /// Create a data load error for `path`.
    pub fn data_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DataLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an output write error from any underlying failure.
    pub fn output_write(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Result type alias for tcompare.
pub type Result<T> = std::result::Result<T, TcompareError>;
