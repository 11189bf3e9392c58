//! Boolean label parsing and extraction
//!
//! Source files spell booleans in several ways ("Yes"/"No" in the attrition
//! data). They are parsed once at load time into a polars Boolean column.

use polars::prelude::*;

use super::error::{AnalysisError, Result};

/// Parse a boolean field. Accepts true/false, yes/no, t/f, y/n and 1/0,
/// case-insensitively and ignoring surrounding whitespace.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "t" | "y" | "1" => Some(true),
        "false" | "no" | "f" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Extract the label column as a plain boolean vector
pub fn label_values(df: &DataFrame, label: &str) -> Result<Vec<bool>> {
    let column = df
        .column(label)
        .map_err(|_| AnalysisError::ColumnNotFound(label.to_string()))?;

    let values = column
        .bool()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.ok_or_else(|| AnalysisError::Parse {
                row: i + 1,
                column: label.to_string(),
                value: String::new(),
                expected: "boolean",
            })
        })
        .collect::<Result<Vec<bool>>>()?;

    Ok(values)
}

/// Count (positives, negatives)
pub fn class_counts(labels: &[bool]) -> (usize, usize) {
    let positives = labels.iter().filter(|&&l| l).count();
    (positives, labels.len() - positives)
}

/// Fail unless both classes are present
pub fn require_both_classes(labels: &[bool]) -> Result<()> {
    match class_counts(labels) {
        (0, 0) => Err(AnalysisError::EmptyTrainingSet),
        (0, _) => Err(AnalysisError::SingleClass(false)),
        (_, 0) => Err(AnalysisError::SingleClass(true)),
        _ => Ok(()),
    }
}
