//! attrition-pfi: Permutation Feature Importance CLI
//!
//! Trains a logistic regression on the employee attrition data and prints
//! its held-out metrics followed by the features ranked by importance.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use attrition_pfi::analysis::run_analysis;
use attrition_pfi::cli::{AnalysisConfig, Cli, OutputFormat};
use attrition_pfi::report::{export_analysis, render_metrics, render_table, render_tsv, ExportParams};
use attrition_pfi::utils::{
    print_banner, print_completion, print_config, print_step_header, print_step_time,
    print_success, ConfigCard,
};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AnalysisConfig::resolve(&cli)?;
    log::debug!("Resolved configuration: {:?}", config);

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&ConfigCard {
        input: &config.input,
        label: &config.label,
        variant: config.variant.to_string(),
        metric: config.metric.to_string(),
        permutations: config.permutations,
        seed: config.seed,
    });

    let outcome = run_analysis(&config, true)?;

    // Report goes to stdout; everything else above went to stderr
    print!("{}", render_metrics(&outcome.metrics));
    println!();
    match config.format {
        OutputFormat::Tsv => print!("{}", render_tsv(&outcome.report)),
        OutputFormat::Table => {
            // Indent the table
            for line in render_table(&outcome.report).to_string().lines() {
                println!("    {}", line);
            }
        }
    }

    if let Some(export_path) = &config.export {
        print_step_header(5, "Export");
        let step_start = Instant::now();
        let input_file = config.input.display().to_string();
        export_analysis(
            &outcome.report,
            export_path,
            &ExportParams {
                input_file: &input_file,
                label_column: &config.label,
                train_rows: outcome.train_rows,
                test_rows: outcome.test_rows,
                model_kind: &outcome.model_kind,
                config: &config,
                metrics: &outcome.metrics,
                layout: &outcome.layout,
            },
        )?;
        print_success(&format!("Saved to {}", export_path.display()));
        print_step_time(step_start.elapsed());
    }

    print_completion();

    Ok(())
}
