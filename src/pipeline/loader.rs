//! Dataset loader for schema-typed CSV files

use std::path::Path;

use polars::prelude::*;

use super::error::{AnalysisError, Result};
use super::label::parse_bool;
use super::schema::{ColumnKind, ColumnSchema, ColumnSpec};
use crate::utils::{create_spinner, finish_with_success};

/// Shown as the found value when a row ends before a declared column
const MISSING_FIELD: &str = "<missing field>";

/// Load a CSV file and type every declared column.
///
/// All fields are first read as strings so that each declared column can be
/// parsed strictly; a single bad field aborts the load with its row number.
/// Empty fields arrive as `""`, so a null can only come from a row that is
/// shorter than the header and is rejected for every column kind.
/// Fields at undeclared positions are read and discarded.
pub fn load_dataset(path: &Path, schema: &ColumnSchema) -> Result<DataFrame> {
    if !path.exists() {
        return Err(AnalysisError::FileNotFound(path.to_path_buf()));
    }

    let raw = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_missing_is_null(false))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let required = schema.required_width();
    if raw.width() < required {
        return Err(AnalysisError::ColumnCount {
            expected: required,
            actual: raw.width(),
        });
    }

    let mut columns = Vec::with_capacity(schema.columns.len());
    for spec in &schema.columns {
        let source = &raw.get_columns()[spec.position];
        if source.name().as_str() != spec.name {
            log::warn!(
                "Header field {} is '{}', loading it as '{}'",
                spec.position,
                source.name(),
                spec.name
            );
        }
        columns.push(convert_column(spec, source.str()?)?);
    }

    log::debug!(
        "Loaded {} row(s), kept {} of {} field(s) from {}",
        raw.height(),
        columns.len(),
        raw.width(),
        path.display()
    );

    Ok(DataFrame::new(columns)?)
}

/// Load a dataset with a spinner, returning the frame and its statistics
/// (rows, columns, estimated memory in MB).
pub fn load_dataset_with_progress(
    path: &Path,
    schema: &ColumnSchema,
) -> Result<(DataFrame, usize, usize, f64)> {
    let spinner = create_spinner(&format!("Loading {}...", path.display()));
    let df = match load_dataset(path, schema) {
        Ok(df) => df,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };
    finish_with_success(&spinner, "Dataset loaded");

    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    Ok((df, rows, cols, memory_mb))
}

fn convert_column(spec: &ColumnSpec, values: &StringChunked) -> Result<Column> {
    let name: PlSmallStr = spec.name.as_str().into();

    let column = match spec.kind {
        ColumnKind::Float => {
            let parsed = values
                .into_iter()
                .enumerate()
                .map(|(i, v)| parse_float(v).ok_or_else(|| parse_error(spec, i, v)))
                .collect::<Result<Vec<f64>>>()?;
            Column::new(name, parsed)
        }
        ColumnKind::Boolean => {
            let parsed = values
                .into_iter()
                .enumerate()
                .map(|(i, v)| v.and_then(parse_bool).ok_or_else(|| parse_error(spec, i, v)))
                .collect::<Result<Vec<bool>>>()?;
            Column::new(name, parsed)
        }
        ColumnKind::Text => {
            let text = values
                .into_iter()
                .enumerate()
                .map(|(i, v)| v.map(str::to_string).ok_or_else(|| parse_error(spec, i, v)))
                .collect::<Result<Vec<String>>>()?;
            Column::new(name, text)
        }
    };

    Ok(column)
}

fn parse_float(value: Option<&str>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn parse_error(spec: &ColumnSpec, index: usize, value: Option<&str>) -> AnalysisError {
    AnalysisError::Parse {
        row: index + 1,
        column: spec.name.clone(),
        value: value.unwrap_or(MISSING_FIELD).to_string(),
        expected: spec.kind.expected(),
    }
}
