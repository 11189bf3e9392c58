//! Resolved analysis configuration
//!
//! One struct carries every setting of a run. It starts from the defaults,
//! is overlaid with an optional JSON file and then with command-line flags,
//! and is validated once before any work starts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::args::Cli;
use crate::pipeline::{
    AnalysisError, ColumnKind, ColumnSchema, ImportanceMetric, LogisticRegressionTrainer,
    NormalizerKind, PermutationConfig, PipelineVariant,
};

/// How the importance table is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated lines
    #[default]
    Tsv,
    /// Box-drawn table
    Table,
}

/// Every setting of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub label: String,
    /// Column layout of the input; the built-in attrition schema when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<ColumnSchema>,
    /// Columns removed from the schema before loading
    pub exclude: Vec<String>,
    pub test_fraction: f64,
    pub permutations: usize,
    pub variant: PipelineVariant,
    pub normalizer: NormalizerKind,
    pub metric: ImportanceMetric,
    pub group_by_column: bool,
    pub seed: u64,
    pub trainer: LogisticRegressionTrainer,
    pub format: OutputFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("./data/attrition.csv"),
            label: "Attrition".to_string(),
            schema: None,
            exclude: Vec::new(),
            test_fraction: 0.2,
            permutations: 3,
            variant: PipelineVariant::default(),
            normalizer: NormalizerKind::default(),
            metric: ImportanceMetric::default(),
            group_by_column: false,
            seed: 0,
            trainer: LogisticRegressionTrainer::default(),
            format: OutputFormat::default(),
            export: None,
        }
    }
}

impl AnalysisConfig {
    /// Defaults, then the `--config` file if given, then command-line flags
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Read a (possibly partial) configuration; missing keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Overlay the flags that were given on the command line
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(input) = &cli.input {
            self.input = input.clone();
        }
        if let Some(label) = &cli.label {
            self.label = label.clone();
        }
        if let Some(fraction) = cli.test_fraction {
            self.test_fraction = fraction;
        }
        if let Some(permutations) = cli.permutations {
            self.permutations = permutations;
        }
        if let Some(variant) = cli.variant {
            self.variant = variant;
        }
        if let Some(normalizer) = cli.normalizer {
            self.normalizer = normalizer;
        }
        if let Some(metric) = cli.metric {
            self.metric = metric;
        }
        if cli.group_by_column {
            self.group_by_column = true;
        }
        if !cli.exclude.is_empty() {
            self.exclude = cli.exclude.clone();
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(l2) = cli.l2 {
            self.trainer.l2 = l2;
        }
        if let Some(max_iterations) = cli.max_iterations {
            self.trainer.max_iterations = max_iterations;
        }
        if let Some(format) = cli.format {
            self.format = format;
        }
        if let Some(export) = &cli.export {
            self.export = Some(export.clone());
        }
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> std::result::Result<(), AnalysisError> {
        let invalid = |msg: String| Err(AnalysisError::InvalidConfig(msg));

        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return invalid(format!(
                "test_fraction must be strictly between 0 and 1, got {}",
                self.test_fraction
            ));
        }
        if self.permutations == 0 {
            return invalid("permutations must be at least 1".to_string());
        }
        if !(self.trainer.l2 >= 0.0 && self.trainer.l2.is_finite()) {
            return invalid(format!(
                "l2 must be a non-negative number, got {}",
                self.trainer.l2
            ));
        }
        if self.trainer.max_iterations == 0 {
            return invalid("max_iterations must be at least 1".to_string());
        }
        if self.trainer.memory == 0 {
            return invalid("memory must be at least 1".to_string());
        }
        if self.exclude.iter().any(|c| c == &self.label) {
            return invalid(format!("the label column '{}' cannot be excluded", self.label));
        }

        let schema = self.base_schema().with_label(&self.label);
        match schema.get(&self.label) {
            Some(spec) if spec.kind == ColumnKind::Boolean => {}
            Some(spec) => {
                return invalid(format!(
                    "label column '{}' is declared as {}, expected boolean",
                    self.label, spec.kind
                ))
            }
            None => return invalid(format!("label column '{}' is not in the schema", self.label)),
        }
        if let Some(unknown) = self.exclude.iter().find(|c| schema.get(c).is_none()) {
            return invalid(format!("excluded column '{}' is not in the schema", unknown));
        }
        Ok(())
    }

    fn base_schema(&self) -> ColumnSchema {
        self.schema.clone().unwrap_or_else(ColumnSchema::attrition)
    }

    /// Schema with the configured label and exclusions applied
    pub fn schema(&self) -> ColumnSchema {
        self.base_schema()
            .with_label(&self.label)
            .without(&self.exclude)
    }

    pub fn permutation_config(&self, show_progress: bool) -> PermutationConfig {
        PermutationConfig {
            repetitions: self.permutations,
            seed: self.seed,
            metric: self.metric,
            show_progress,
        }
    }
}
