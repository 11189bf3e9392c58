//! Tests for permutation feature importance

#[path = "common/mod.rs"]
mod common;

use attrition_pfi::pipeline::{
    label_values, load_dataset, permutation_importance, ColumnSchema, FeatureLayout, FeatureMatrix,
    FeaturePipeline, ImportanceMetric, LinearBinaryModel, LogisticRegressionTrainer,
    NormalizerKind, PermutationConfig, PipelineVariant, TrainedModel,
};
use attrition_pfi::report::build_report;
use ndarray::array;
use common::{create_temp_attrition_csv, scenario_dataframe, scenario_schema};

fn scenario_features(rows: usize, seed: u64) -> (FeatureMatrix, Vec<bool>, Vec<String>) {
    let df = scenario_dataframe(rows, seed);
    let fitted = FeaturePipeline::from_schema(
        &scenario_schema(),
        PipelineVariant::Numeric,
        NormalizerKind::MinMax,
    )
    .fit(&df)
    .unwrap();
    let x = fitted.transform(&df).unwrap();
    let y = label_values(&df, "label").unwrap();
    (x, y, fitted.layout().names())
}

#[test]
fn test_correlated_feature_ranked_first() {
    let mut first = 0;
    for trial in 0..100u64 {
        let (x, y, names) = scenario_features(100, trial);
        let model = LogisticRegressionTrainer::default().fit(&x, &y).unwrap();
        let layout = FeatureLayout::numeric(&names);
        let config = PermutationConfig {
            repetitions: 3,
            seed: trial,
            ..Default::default()
        };
        let result = permutation_importance(&model, &x, &y, &layout.slot_groups(), &config).unwrap();
        let report = build_report(result.metric, result.baseline, &result.features, None);
        if report.rows[0].name == "signal" {
            first += 1;
        }
    }
    assert!(first >= 95, "signal ranked first in {first}/100 trials");
}

#[test]
fn test_zero_weight_feature_has_zero_delta() {
    let (x, y, names) = scenario_features(80, 3);
    let model = TrainedModel::Linear(LinearBinaryModel::new(array![3.0, 0.0, -0.5], 0.1));
    let layout = FeatureLayout::numeric(&names);

    for metric in [
        ImportanceMetric::Auc,
        ImportanceMetric::Accuracy,
        ImportanceMetric::F1,
        ImportanceMetric::LogLoss,
    ] {
        let config = PermutationConfig {
            repetitions: 5,
            seed: 9,
            metric,
            show_progress: false,
        };
        let result = permutation_importance(&model, &x, &y, &layout.slot_groups(), &config).unwrap();
        let zero = &result.features[1];
        assert_eq!(zero.name, "noise_a");
        assert!(zero.deltas.iter().all(|&d| d == 0.0), "{metric}");
        assert_eq!(zero.mean, 0.0);
    }
}

#[test]
fn test_single_repetition_has_zero_std_error() {
    let (x, y, names) = scenario_features(60, 4);
    let model = LogisticRegressionTrainer::default().fit(&x, &y).unwrap();
    let layout = FeatureLayout::numeric(&names);
    let config = PermutationConfig {
        repetitions: 1,
        ..Default::default()
    };
    let result = permutation_importance(&model, &x, &y, &layout.slot_groups(), &config).unwrap();
    for feature in &result.features {
        assert_eq!(feature.deltas.len(), 1);
        assert_eq!(feature.std_error, 0.0);
        assert_eq!(feature.mean, feature.deltas[0]);
    }
}

#[test]
fn test_std_error_from_repetitions() {
    let (x, y, names) = scenario_features(60, 5);
    let model = LogisticRegressionTrainer::default().fit(&x, &y).unwrap();
    let layout = FeatureLayout::numeric(&names);
    let config = PermutationConfig {
        repetitions: 4,
        seed: 1,
        ..Default::default()
    };
    let result = permutation_importance(&model, &x, &y, &layout.slot_groups(), &config).unwrap();
    let signal = &result.features[0];

    let n = signal.deltas.len() as f64;
    let mean = signal.deltas.iter().sum::<f64>() / n;
    let var = signal.deltas.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (n - 1.0);
    assert!((signal.mean - mean).abs() < 1e-12);
    assert!((signal.std_error - var.sqrt() / n.sqrt()).abs() < 1e-12);
    assert!((signal.confidence_95() - 1.96 * signal.std_error).abs() < 1e-15);
}

#[test]
fn test_column_groups_on_attrition() {
    let (_dir, path) = create_temp_attrition_csv(120, 12);
    let schema = ColumnSchema::attrition();
    let df = load_dataset(&path, &schema).unwrap();
    let fitted = FeaturePipeline::from_schema(&schema, PipelineVariant::Combined, NormalizerKind::MinMax)
        .fit(&df)
        .unwrap();
    let x = fitted.transform(&df).unwrap();
    let y = label_values(&df, "Attrition").unwrap();
    let model = LogisticRegressionTrainer::default().fit(&x, &y).unwrap();

    let groups = fitted.layout().column_groups();
    let config = PermutationConfig {
        repetitions: 2,
        ..Default::default()
    };
    let result = permutation_importance(&model, &x, &y, &groups, &config).unwrap();
    assert_eq!(result.features.len(), 25);

    let weights = model.linear().unwrap().weights().to_vec();
    let report = build_report(result.metric, result.baseline, &result.features, Some(&weights));
    let text = report.rows.iter().find(|r| r.name == "Text").unwrap();
    assert_eq!(text.weight, None);
    let age = report.rows.iter().find(|r| r.name == "Age").unwrap();
    assert_eq!(age.weight, Some(weights[0]));
}

#[test]
fn test_results_independent_of_thread_count() {
    let (x, y, names) = scenario_features(80, 8);
    let model = LogisticRegressionTrainer::default().fit(&x, &y).unwrap();
    let groups = FeatureLayout::numeric(&names).slot_groups();
    let config = PermutationConfig {
        repetitions: 3,
        seed: 77,
        ..Default::default()
    };

    let parallel = permutation_importance(&model, &x, &y, &groups, &config).unwrap();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let serial = pool
        .install(|| permutation_importance(&model, &x, &y, &groups, &config))
        .unwrap();
    assert_eq!(parallel.features, serial.features);
}
