//! End-to-end analysis run
//!
//! load → split → fit pipeline → train → evaluate → permute → rank.

use std::time::Instant;

use anyhow::{Context, Result};

use crate::cli::AnalysisConfig;
use crate::pipeline::{
    evaluate, label_values, load_dataset, load_dataset_with_progress, permutation_importance,
    train_test_split, AnalysisError, BinaryMetrics, FeatureLayout, FeaturePipeline, TrainedModel,
};
use crate::report::{build_report, ImportanceReport};
use crate::utils::{
    create_spinner, finish_with_success, print_count, print_info, print_step_header,
    print_step_time, print_success,
};

/// Everything a run produces
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub metrics: BinaryMetrics,
    pub report: ImportanceReport,
    pub layout: FeatureLayout,
    pub model_kind: String,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Linear weights of the model, or `None` for other model kinds.
///
/// The weight vector must match the layout slot for slot.
pub fn model_weights(model: &TrainedModel, layout: &FeatureLayout) -> Result<Option<Vec<f64>>> {
    match model.linear() {
        Ok(linear) => {
            if linear.weights().len() != layout.len() {
                return Err(AnalysisError::ShapeMismatch {
                    expected: layout.len(),
                    actual: linear.weights().len(),
                }
                .into());
            }
            Ok(Some(linear.weights().to_vec()))
        }
        Err(AnalysisError::UnsupportedModel { kind }) => {
            log::warn!("Model of kind '{}' has no linear weights; weights column left empty", kind);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Run the whole analysis. With `interactive` set, step headers, spinners
/// and the progress bar are drawn on stderr.
pub fn run_analysis(config: &AnalysisConfig, interactive: bool) -> Result<AnalysisOutcome> {
    let schema = config.schema();

    // Step 1: load
    if interactive {
        print_step_header(1, "Load Dataset");
    }
    let step_start = Instant::now();
    let df = if interactive {
        let (df, rows, cols, memory_mb) = load_dataset_with_progress(&config.input, &schema)
            .with_context(|| format!("Failed to load dataset: {}", config.input.display()))?;
        print_count("rows", rows, None);
        print_count("columns", cols, Some(&format!("(~{:.2} MB)", memory_mb)));
        print_step_time(step_start.elapsed());
        df
    } else {
        load_dataset(&config.input, &schema)
            .with_context(|| format!("Failed to load dataset: {}", config.input.display()))?
    };

    // Step 2: split and featurize
    if interactive {
        print_step_header(2, "Split & Featurize");
    }
    let step_start = Instant::now();
    let (train, test) = train_test_split(&df, config.test_fraction, config.seed)?;
    log::info!("Split {} row(s) into {} train / {} test", df.height(), train.height(), test.height());

    let pipeline = FeaturePipeline::from_schema(&schema, config.variant, config.normalizer);
    let fitted = pipeline.fit(&train).context("Failed to fit the feature pipeline")?;
    let train_x = fitted.transform(&train)?;
    let test_x = fitted.transform(&test)?;
    let train_y = label_values(&train, &schema.label)?;
    let test_y = label_values(&test, &schema.label)?;
    let layout = fitted.layout().clone();

    if interactive {
        print_count("train rows", train.height(), None);
        print_count("test rows", test.height(), None);
        print_count(
            "feature slots",
            layout.len(),
            Some(&format!("({} variant, {} normalizer)", config.variant, config.normalizer)),
        );
        print_step_time(step_start.elapsed());
    }

    // Step 3: train and evaluate
    if interactive {
        print_step_header(3, "Train & Evaluate");
    }
    let step_start = Instant::now();
    let spinner = interactive.then(|| create_spinner("Training logistic regression..."));
    let model = config
        .trainer
        .fit(&train_x, &train_y)
        .context("Failed to train the model")?;
    if let Some(spinner) = &spinner {
        finish_with_success(spinner, "Model trained");
    }
    let metrics = evaluate(&model, &test_x, &test_y).context("Failed to evaluate the model")?;
    let weights = model_weights(&model, &layout)?;
    if interactive {
        print_success(&format!("Test AUC {:.4}", metrics.auc));
        print_step_time(step_start.elapsed());
    }

    // Step 4: permutation importance on the training split
    if interactive {
        print_step_header(4, "Permutation Feature Importance");
    }
    let step_start = Instant::now();
    let groups = if config.group_by_column {
        layout.column_groups()
    } else {
        layout.slot_groups()
    };
    if interactive {
        print_info(&format!(
            "{} group(s) x {} permutation(s) on {} training row(s)",
            groups.len(),
            config.permutations,
            train_x.nrows()
        ));
    }
    let importance = permutation_importance(
        &model,
        &train_x,
        &train_y,
        &groups,
        &config.permutation_config(interactive),
    )
    .context("Permutation importance failed")?;
    if interactive {
        print_step_time(step_start.elapsed());
    }

    let report = build_report(
        importance.metric,
        importance.baseline,
        &importance.features,
        weights.as_deref(),
    );

    Ok(AnalysisOutcome {
        metrics,
        report,
        layout,
        model_kind: model.kind().to_string(),
        train_rows: train.height(),
        test_rows: test.height(),
    })
}
