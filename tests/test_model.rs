//! Tests for training and evaluating the logistic regression

#[path = "common/mod.rs"]
mod common;

use attrition_pfi::pipeline::metrics::auc;
use attrition_pfi::pipeline::{
    evaluate, label_values, load_dataset, train_test_split, AnalysisError, ColumnSchema,
    FeatureMatrix, FeaturePipeline, LinearBinaryModel, LogisticRegressionTrainer, NormalizerKind,
    PipelineVariant, TrainedModel,
};
use ndarray::array;
use common::{create_temp_attrition_csv, scenario_dataframe, scenario_schema};

#[test]
fn test_train_and_evaluate_attrition() {
    let (_dir, path) = create_temp_attrition_csv(600, 31);
    let schema = ColumnSchema::attrition();
    let df = load_dataset(&path, &schema).unwrap();
    let (train, test) = train_test_split(&df, 0.2, 0).unwrap();

    let fitted = FeaturePipeline::from_schema(&schema, PipelineVariant::Combined, NormalizerKind::MinMax)
        .fit(&train)
        .unwrap();
    let train_x = fitted.transform(&train).unwrap();
    let test_x = fitted.transform(&test).unwrap();
    let train_y = label_values(&train, "Attrition").unwrap();
    let test_y = label_values(&test, "Attrition").unwrap();

    let model = LogisticRegressionTrainer::default().fit(&train_x, &train_y).unwrap();
    assert_eq!(model.kind(), "linear");
    assert_eq!(model.linear().unwrap().weights().len(), fitted.layout().len());

    let metrics = evaluate(&model, &test_x, &test_y).unwrap();
    assert!(metrics.auc > 0.55, "auc {}", metrics.auc);
    assert!((0.0..=1.0).contains(&metrics.accuracy));
    assert!((0.0..=1.0).contains(&metrics.f1_score));
    assert!(metrics.log_loss > 0.0);

    // The model fits its own training rows
    let train_p = model.predict_proba_batch(&train_x).unwrap();
    assert!(auc(&train_p, &train_y).unwrap() > 0.6);
}

#[test]
fn test_signal_weight_dominates() {
    let df = scenario_dataframe(200, 5);
    let schema = scenario_schema();
    let fitted = FeaturePipeline::from_schema(&schema, PipelineVariant::Numeric, NormalizerKind::MinMax)
        .fit(&df)
        .unwrap();
    let x = fitted.transform(&df).unwrap();
    let y = label_values(&df, "label").unwrap();

    let model = LogisticRegressionTrainer::default().fit(&x, &y).unwrap();
    let w = model.linear().unwrap().weights().to_vec();
    assert_eq!(fitted.layout().names(), vec!["signal", "noise_a", "noise_b"]);
    assert!(w[0] > 2.0 * w[1].abs());
    assert!(w[0] > 2.0 * w[2].abs());
}

#[test]
fn test_scoring_with_wrong_width() {
    let df = scenario_dataframe(50, 6);
    let schema = scenario_schema();
    let fitted = FeaturePipeline::from_schema(&schema, PipelineVariant::Numeric, NormalizerKind::MinMax)
        .fit(&df)
        .unwrap();
    let x = fitted.transform(&df).unwrap();
    let y = label_values(&df, "label").unwrap();
    let model = LogisticRegressionTrainer::default().fit(&x, &y).unwrap();

    let narrow = FeatureMatrix::zeros((3, 2));
    let err = evaluate(&model, &narrow, &[true, false, true]).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::ShapeMismatch {
            expected: 3,
            actual: 2
        }
    ));
}

#[test]
fn test_empty_training_set() {
    let x = FeatureMatrix::zeros((0, 3));
    let err = LogisticRegressionTrainer::default().fit(&x, &[]).unwrap_err();
    assert!(matches!(err, AnalysisError::EmptyTrainingSet));
}

#[test]
fn test_single_class_evaluation() {
    let model = TrainedModel::Linear(LinearBinaryModel::new(array![1.0], 0.0));
    let x = array![[0.1], [0.9]];
    let err = evaluate(&model, &x, &[false, false]).unwrap_err();
    assert!(matches!(err, AnalysisError::SingleClass(false)));
}
