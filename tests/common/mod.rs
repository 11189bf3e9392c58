//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use attrition_pfi::pipeline::{ColumnKind, ColumnSchema, ColumnSpec};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tempfile::TempDir;

const TRAVEL: [&str; 3] = ["Travel_Rarely", "Travel_Frequently", "Non-Travel"];
const DEPARTMENTS: [&str; 3] = ["Sales", "Research & Development", "Human Resources"];
const FIELDS: [&str; 5] = ["Life Sciences", "Medical", "Marketing", "Technical Degree", "Other"];
const ROLES: [&str; 4] = [
    "Sales Executive",
    "Research Scientist",
    "Laboratory Technician",
    "Manager",
];
const MARITAL: [&str; 3] = ["Single", "Married", "Divorced"];

fn pick<'a>(rng: &mut ChaCha8Rng, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or("")
}

/// One synthetic attrition record, fields in source order.
///
/// Attrition is driven by OverTime and a low MonthlyIncome so that a model
/// has something to learn.
fn attrition_record(rng: &mut ChaCha8Rng, employee_number: usize) -> Vec<String> {
    let overtime = rng.gen_bool(0.3);
    let income: u32 = rng.gen_range(1_000..20_000);
    let p_leave = 0.05 + if overtime { 0.45 } else { 0.0 } + if income < 4_000 { 0.3 } else { 0.0 };
    let attrition = rng.gen_bool(p_leave);
    let yes_no = |b: bool| if b { "Yes" } else { "No" }.to_string();

    vec![
        rng.gen_range(18..60).to_string(),
        yes_no(attrition),
        pick(rng, &TRAVEL).to_string(),
        rng.gen_range(100..1500).to_string(),
        pick(rng, &DEPARTMENTS).to_string(),
        rng.gen_range(1..30).to_string(),
        rng.gen_range(1..6).to_string(),
        pick(rng, &FIELDS).to_string(),
        "1".to_string(),
        employee_number.to_string(),
        rng.gen_range(1..5).to_string(),
        pick(rng, &["Male", "Female"]).to_string(),
        rng.gen_range(30..101).to_string(),
        rng.gen_range(1..5).to_string(),
        rng.gen_range(1..6).to_string(),
        pick(rng, &ROLES).to_string(),
        rng.gen_range(1..5).to_string(),
        pick(rng, &MARITAL).to_string(),
        income.to_string(),
        rng.gen_range(2_000..27_000).to_string(),
        rng.gen_range(0..10).to_string(),
        "Y".to_string(),
        yes_no(overtime),
        rng.gen_range(11..26).to_string(),
        rng.gen_range(3..5).to_string(),
        rng.gen_range(1..5).to_string(),
        "80".to_string(),
        rng.gen_range(0..4).to_string(),
        rng.gen_range(0..41).to_string(),
        rng.gen_range(0..7).to_string(),
        rng.gen_range(1..5).to_string(),
        rng.gen_range(0..41).to_string(),
        rng.gen_range(0..19).to_string(),
        rng.gen_range(0..16).to_string(),
        rng.gen_range(0..18).to_string(),
    ]
}

/// Synthetic attrition rows (without header) from a fixed seed
pub fn attrition_rows(rows: usize, seed: u64) -> Vec<Vec<String>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..rows).map(|i| attrition_record(&mut rng, i + 1)).collect()
}

/// Write a CSV file from a header and raw rows
pub fn write_csv(path: &Path, header: &[&str], rows: &[Vec<String>]) {
    let mut text = header.join(",");
    text.push('\n');
    for row in rows {
        text.push_str(&row.join(","));
        text.push('\n');
    }
    std::fs::write(path, text).unwrap();
}

/// Create a temporary directory with a synthetic attrition CSV
pub fn create_temp_attrition_csv(rows: usize, seed: u64) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("attrition.csv");
    write_csv(
        &csv_path,
        &ColumnSchema::attrition_header(),
        &attrition_rows(rows, seed),
    );
    (temp_dir, csv_path)
}

/// Create a temporary CSV from arbitrary rows under the attrition header
pub fn create_temp_csv_with_rows(rows: &[Vec<String>]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("attrition.csv");
    write_csv(&csv_path, &ColumnSchema::attrition_header(), rows);
    (temp_dir, csv_path)
}

/// Schema of [`scenario_dataframe`]: three floats and a boolean label
pub fn scenario_schema() -> ColumnSchema {
    ColumnSchema::new(
        vec![
            ColumnSpec::new("signal", ColumnKind::Float, 0),
            ColumnSpec::new("noise_a", ColumnKind::Float, 1),
            ColumnSpec::new("noise_b", ColumnKind::Float, 2),
            ColumnSpec::new("label", ColumnKind::Boolean, 3),
        ],
        "label",
    )
}

/// Three numeric features; only `signal` is related to the label
pub fn scenario_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut signal = Vec::with_capacity(rows);
    let mut noise_a = Vec::with_capacity(rows);
    let mut noise_b = Vec::with_capacity(rows);
    let mut label = Vec::with_capacity(rows);

    for _ in 0..rows {
        let s: f64 = rng.gen_range(-1.0..1.0);
        let jitter: f64 = rng.gen_range(-0.5..0.5);
        signal.push(s);
        noise_a.push(rng.gen_range(-1.0..1.0));
        noise_b.push(rng.gen_range(-1.0..1.0));
        label.push(s + jitter > 0.0);
    }

    df! {
        "signal" => signal,
        "noise_a" => noise_a,
        "noise_b" => noise_b,
        "label" => label,
    }
    .unwrap()
}
