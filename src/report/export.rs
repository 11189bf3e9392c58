//! JSON export of an analysis run

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use super::importance::{ImportanceReport, ImportanceRow};
use crate::pipeline::{BinaryMetrics, FeatureLayout};

/// Metadata about the analysis run
#[derive(Debug, Serialize)]
pub struct RunMetadata {
    /// Timestamp of the analysis (RFC 3339)
    pub timestamp: String,
    pub version: String,
    pub input_file: String,
    pub label_column: String,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Width of the feature vector
    pub feature_slots: usize,
    pub model_kind: String,
}

/// Complete export
#[derive(Debug, Serialize)]
pub struct AnalysisExport<'a, C: Serialize> {
    pub metadata: RunMetadata,
    /// Resolved configuration the run used
    pub config: &'a C,
    /// Held-out evaluation
    pub metrics: &'a BinaryMetrics,
    pub baseline: f64,
    pub importance: &'a [ImportanceRow],
    /// Feature-vector slots and their sources
    pub layout: &'a FeatureLayout,
}

/// Inputs of [`export_analysis`] besides the report itself
pub struct ExportParams<'a, C: Serialize> {
    pub input_file: &'a str,
    pub label_column: &'a str,
    pub train_rows: usize,
    pub test_rows: usize,
    pub model_kind: &'a str,
    pub config: &'a C,
    pub metrics: &'a BinaryMetrics,
    pub layout: &'a FeatureLayout,
}

/// Write the run, its metrics and the ranked importance to a JSON file
pub fn export_analysis<C: Serialize>(
    report: &ImportanceReport,
    output_path: &Path,
    params: &ExportParams<'_, C>,
) -> Result<()> {
    let export = AnalysisExport {
        metadata: RunMetadata {
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.to_string(),
            label_column: params.label_column.to_string(),
            train_rows: params.train_rows,
            test_rows: params.test_rows,
            feature_slots: params.layout.len(),
            model_kind: params.model_kind.to_string(),
        },
        config: params.config,
        metrics: params.metrics,
        baseline: report.baseline,
        importance: &report.rows,
        layout: params.layout,
    };

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize analysis export")?;
    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write export file: {}", output_path.display()))?;

    log::info!("Exported analysis to {}", output_path.display());
    Ok(())
}
