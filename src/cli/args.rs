//! Command-line argument definitions using clap
//!
//! Every setting is optional on the command line; unset flags fall back to
//! the `--config` file and then to the built-in defaults.

use clap::Parser;
use std::path::PathBuf;

use super::config::OutputFormat;
use crate::pipeline::{ImportanceMetric, NormalizerKind, PipelineVariant};

/// attrition-pfi - Rank employee-attrition features by permutation importance
#[derive(Parser, Debug)]
#[command(name = "attrition-pfi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input CSV file with a header row [default: ./data/attrition.csv]
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Boolean label column [default: Attrition]
    #[arg(short, long)]
    pub label: Option<String>,

    /// Fraction of rows held out for evaluation, in (0, 1) [default: 0.2]
    #[arg(long, value_parser = validate_fraction)]
    pub test_fraction: Option<f64>,

    /// Shuffles per feature during permutation importance [default: 3]
    #[arg(long, value_parser = validate_permutations)]
    pub permutations: Option<usize>,

    /// Feature sub-vectors to build: numeric, text or combined [default: combined]
    #[arg(long)]
    pub variant: Option<PipelineVariant>,

    /// Normalization of the feature vector: min-max or mean-variance [default: min-max]
    #[arg(long)]
    pub normalizer: Option<NormalizerKind>,

    /// Metric whose change is reported: auc, accuracy, f1 or log-loss [default: auc]
    #[arg(long)]
    pub metric: Option<ImportanceMetric>,

    /// Permute all slots of a source column together (one row per declared column)
    #[arg(long, default_value = "false")]
    pub group_by_column: bool,

    /// Columns to leave out of the schema (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Seed for the train/test split and the permutations [default: 0]
    #[arg(long)]
    pub seed: Option<u64>,

    /// L2 regularization strength of the logistic regression [default: 0.001]
    #[arg(long)]
    pub l2: Option<f64>,

    /// Maximum L-BFGS iterations [default: 200]
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Output format of the importance table
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write metrics and ranked importance to this JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// JSON configuration file; command-line flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose diagnostic logging (overridden by RUST_LOG)
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

/// Validator for test_fraction
fn validate_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test fraction must be strictly between 0 and 1, got {}",
            value
        ))
    }
}

/// Validator for permutations
fn validate_permutations(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid count", s))?;

    if value == 0 {
        Err("permutation count must be at least 1".to_string())
    } else {
        Ok(value)
    }
}
