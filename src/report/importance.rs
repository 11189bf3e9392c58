//! Ranked importance table and metrics block

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use serde::Serialize;

use crate::pipeline::{BinaryMetrics, FeatureImportance, ImportanceMetric};
use crate::utils::{format_g4, format_weight};

/// One line of the importance table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportanceRow {
    pub name: String,
    /// Model weight of the slot; `None` for multi-slot groups or models
    /// without linear weights
    pub weight: Option<f64>,
    pub mean: f64,
    pub std_error: f64,
    pub confidence_95: f64,
}

/// Importance rows ranked by descending |mean change|
#[derive(Debug, Clone, Serialize)]
pub struct ImportanceReport {
    pub metric: ImportanceMetric,
    pub baseline: f64,
    pub rows: Vec<ImportanceRow>,
}

/// Build the ranked report.
///
/// `weights` are indexed by feature slot. A group gets a weight only when it
/// covers exactly one slot. The sort is stable, so equal magnitudes keep
/// their input order.
pub fn build_report(
    metric: ImportanceMetric,
    baseline: f64,
    importances: &[FeatureImportance],
    weights: Option<&[f64]>,
) -> ImportanceReport {
    let mut rows: Vec<ImportanceRow> = importances
        .iter()
        .map(|imp| {
            let weight = match (weights, imp.indices.as_slice()) {
                (Some(w), [single]) => w.get(*single).copied(),
                _ => None,
            };
            ImportanceRow {
                name: imp.name.clone(),
                weight,
                mean: imp.mean,
                std_error: imp.std_error,
                confidence_95: imp.confidence_95(),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.mean.abs().total_cmp(&a.mean.abs()));

    ImportanceReport {
        metric,
        baseline,
        rows,
    }
}

fn headers(metric: ImportanceMetric) -> [String; 4] {
    let name = metric.display_name();
    [
        "Feature".to_string(),
        "Model Weight".to_string(),
        format!("Change in {}", name),
        format!("95% Confidence in the Mean Change in {}", name),
    ]
}

/// Tab-separated table: a header line, then one line per row
pub fn render_tsv(report: &ImportanceReport) -> String {
    let mut out = headers(report.metric).join("\t");
    out.push('\n');
    for row in &report.rows {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            row.name,
            format_weight(row.weight),
            format_g4(row.mean),
            format_g4(row.confidence_95)
        ));
    }
    out
}

/// The same rows as a comfy-table
pub fn render_table(report: &ImportanceReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        headers(report.metric)
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for row in &report.rows {
        // Changes that make the metric worse are the important ones
        let color = if row.mean < 0.0 {
            Color::Red
        } else if row.mean > 0.0 {
            Color::Green
        } else {
            Color::Reset
        };
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(format_weight(row.weight)).set_alignment(CellAlignment::Right),
            Cell::new(format_g4(row.mean))
                .fg(color)
                .set_alignment(CellAlignment::Right),
            Cell::new(format_g4(row.confidence_95)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Metrics block printed before the table
pub fn render_metrics(metrics: &BinaryMetrics) -> String {
    let lines = [
        ("Accuracy", metrics.accuracy),
        ("AUC", metrics.auc),
        ("F1 Score", metrics.f1_score),
        ("Negative Precision", metrics.negative_precision),
        ("Negative Recall", metrics.negative_recall),
        ("Positive Precision", metrics.positive_precision),
        ("Positive Recall", metrics.positive_recall),
        ("Log Loss", metrics.log_loss),
        ("Log Loss Reduction", metrics.log_loss_reduction),
    ];
    lines
        .iter()
        .map(|(name, value)| format!("{}: {}\n", name, value))
        .collect()
}
