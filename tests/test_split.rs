//! Tests for the train/test split

#[path = "common/mod.rs"]
mod common;

use std::collections::BTreeSet;

use attrition_pfi::pipeline::split::test_row_count;
use attrition_pfi::pipeline::{load_dataset, train_test_split, AnalysisError, ColumnSchema};
use common::create_temp_attrition_csv;
use polars::prelude::*;

fn employee_numbers(df: &DataFrame) -> Vec<i64> {
    df.column("EmployeeNumber")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .map(|v| v as i64)
        .collect()
}

fn attrition_frame(rows: usize) -> DataFrame {
    let (_dir, path) = create_temp_attrition_csv(rows, 21);
    load_dataset(&path, &ColumnSchema::attrition()).unwrap()
}

#[test]
fn test_split_is_a_partition() {
    let df = attrition_frame(97);
    let (train, test) = train_test_split(&df, 0.2, 0).unwrap();

    assert_eq!(train.height() + test.height(), 97);
    assert_eq!(test.height(), 19);

    let train_ids: BTreeSet<i64> = employee_numbers(&train).into_iter().collect();
    let test_ids: BTreeSet<i64> = employee_numbers(&test).into_iter().collect();
    assert!(train_ids.is_disjoint(&test_ids));

    let all: BTreeSet<i64> = train_ids.union(&test_ids).copied().collect();
    let expected: BTreeSet<i64> = (1..=97).collect();
    assert_eq!(all, expected);
}

#[test]
fn test_split_is_reproducible() {
    let df = attrition_frame(60);
    let (train_a, test_a) = train_test_split(&df, 0.25, 17).unwrap();
    let (train_b, test_b) = train_test_split(&df, 0.25, 17).unwrap();
    assert_eq!(employee_numbers(&train_a), employee_numbers(&train_b));
    assert_eq!(employee_numbers(&test_a), employee_numbers(&test_b));

    let (_, test_c) = train_test_split(&df, 0.25, 18).unwrap();
    assert_ne!(employee_numbers(&test_a), employee_numbers(&test_c));
}

#[test]
fn test_row_count_rounds() {
    assert_eq!(test_row_count(1470, 0.2), 294);
    assert_eq!(test_row_count(10, 0.25), 3);
    assert_eq!(test_row_count(10, 0.24), 2);
    assert_eq!(test_row_count(0, 0.2), 0);
}

#[test]
fn test_invalid_fraction_rejected() {
    let df = attrition_frame(10);
    for fraction in [0.0, 1.0, -0.1, 1.5] {
        let err = train_test_split(&df, fraction, 0).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)), "{fraction}");
    }
}
