//! Error types for the analysis pipeline.
//!
//! Every failure is fatal for a run; the variants exist so that callers and
//! tests can tell an unreadable input apart from a malformed row, a shape
//! mismatch or a model of the wrong kind.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, training, scoring or permuting.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The input file does not exist.
    #[error("Data file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A field does not match its declared type.
    ///
    /// `row` is the 1-based data row (the header is not counted).
    #[error("Parse error at row {row}, column '{column}': expected {expected}, found '{value}'")]
    Parse {
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },

    /// The file has fewer fields than the schema declares.
    #[error("Column count mismatch: schema needs {expected} field(s), file has {actual}")]
    ColumnCount { expected: usize, actual: usize },

    /// A named column is not part of the loaded table.
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    /// Feature dimensionality differs between training and scoring.
    #[error("Shape mismatch: expected {expected} feature(s), got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Linear parameters were requested from a model that has none.
    #[error("Model of kind '{kind}' does not expose linear weights")]
    UnsupportedModel { kind: String },

    /// Labels contain a single class, so the model or AUC is undefined.
    #[error("Labels contain only one class ({0}); both classes are required")]
    SingleClass(bool),

    /// Training was attempted on zero rows.
    #[error("Training set is empty")]
    EmptyTrainingSet,

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
