//! Error types for the analysis pipeline.
//!
//! Every stage reports failures through `PipelineError`. There is no retry or
//! partial recovery: the first error halts the run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the pipeline stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input file is missing, unreadable, or does not match the expected schema.
    #[error("Failed to load dataset '{path}': {message}")]
    DataLoad {
        /// Path of the file being loaded
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// A split requested more evaluation rows than the table holds.
    #[error("Insufficient data: requested {requested} evaluation rows but only {available} are available")]
    InsufficientData {
        /// Requested evaluation-set size
        requested: usize,
        /// Rows available after cleaning
        available: usize,
    },

    /// Model fitting failed (degenerate design matrix or no convergence).
    #[error("Model fit failed: {0}")]
    Fit(String),

    /// A column is absent or holds values outside its expected type or level set.
    #[error("Schema error in column '{column}': {message}")]
    Schema {
        /// Offending column
        column: String,
        /// What went wrong
        message: String,
    },
}

impl PipelineError {
    pub(crate) fn data_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DataLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn schema(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            column: column.into(),
            message: message.into(),
        }
    }

    pub(crate) fn fit(message: impl Into<String>) -> Self {
        Self::Fit(message.into())
    }

    /// Short name of the error kind, used in the terminal failure banner.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::DataLoad { .. } => "DataLoadError",
            PipelineError::InsufficientData { .. } => "InsufficientDataError",
            PipelineError::Fit(_) => "FitError",
            PipelineError::Schema { .. } => "SchemaError",
        }
    }
}

/// Convenience alias used across the pipeline modules.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
