//! Titanic survival analysis CLI
//!
//! Runs the six pipeline stages against a passenger CSV, prints the profile,
//! the fitted models and the evaluation, and writes a JSON report.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::ProgressBar;

use titanic_survival::cli::{confirm_overwrite, Cli, Commands};
use titanic_survival::pipeline::{
    get_column_names, run_pipeline_observed, run_profile_observed, PipelineConfig, PipelineError,
    Stage, StageFailure, StageObserver,
};
use titanic_survival::report::{
    display_likelihood_ratio, display_model, display_profile, display_scores, display_transform,
    export_report, AnalysisReport, TimingInfo,
};
use titanic_survival::utils::{
    create_spinner, finish_with_failure, finish_with_success, print_banner, print_completion,
    print_config, print_count, print_failure, print_info, print_step_header, print_step_time,
    print_success, print_warning, RunSettings,
};

/// Shows a spinner per stage and records how long each one took
#[derive(Default)]
struct ConsoleProgress {
    spinner: Option<ProgressBar>,
    timing: TimingInfo,
}

impl StageObserver for ConsoleProgress {
    fn stage_started(&mut self, stage: Stage) {
        print_step_header(stage.number(), stage.title());
        let message = match stage {
            Stage::Loader => "Reading passenger list...",
            Stage::Profiler => "Profiling columns...",
            Stage::Transformer => "Cleaning and encoding...",
            Stage::Splitter => "Drawing evaluation sample...",
            Stage::Modeler => "Fitting models...",
            Stage::Evaluator => "Scoring evaluation rows...",
        };
        self.spinner = Some(create_spinner(message));
    }

    fn stage_finished(&mut self, stage: Stage, elapsed: Duration) {
        if let Some(spinner) = self.spinner.take() {
            finish_with_success(&spinner, &format!("{} complete", stage.title()));
        }
        match stage {
            Stage::Loader => self.timing.set_load(elapsed),
            Stage::Profiler => self.timing.set_profile(elapsed),
            Stage::Transformer => self.timing.set_transform(elapsed),
            Stage::Splitter => self.timing.set_split(elapsed),
            Stage::Modeler => self.timing.set_model(elapsed),
            Stage::Evaluator => self.timing.set_evaluate(elapsed),
        }
        print_step_time(elapsed);
    }

    fn stage_failed(&mut self, stage: Stage, _error: &PipelineError) {
        if let Some(spinner) = self.spinner.take() {
            finish_with_failure(&spinner, &format!("{} failed", stage.title()));
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(command) = &cli.command {
        return match command {
            Commands::Profile {
                input,
                infer_schema_length,
            } => run_profile(input, *infer_schema_length),
        };
    }

    let config = cli.pipeline_config().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;
    let report_path = cli
        .report_path()
        .ok_or_else(|| anyhow::anyhow!("Could not derive a report path from the input"))?;

    if report_path.exists() && !cli.no_confirm && !confirm_overwrite(&report_path)? {
        println!("Cancelled by user.");
        return Ok(());
    }

    print_banner(env!("CARGO_PKG_VERSION"));

    let formula = config.reduced_formula.to_string();
    print_config(&RunSettings {
        input: &config.input,
        report: &report_path,
        seed: config.seed,
        eval_size: config.eval_size,
        tree_count: config.tree_count,
        reduced_formula: &formula,
    });

    if let Ok(columns) = get_column_names(&config.input) {
        print_count("column(s) in header", columns.len(), None);
    }

    let run_start = Instant::now();
    let mut progress = ConsoleProgress::default();
    let outcome = match run_pipeline_observed(&config, &mut progress) {
        Ok(outcome) => outcome,
        Err(failure) => return Err(report_failure(failure)),
    };

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows loaded: {}", outcome.loaded_rows);
    println!(
        "      Training rows: {}   Evaluation rows: {}",
        style(outcome.training_rows).green().bold(),
        style(outcome.evaluation_rows).green().bold()
    );
    display_transform(&outcome.transform);
    if outcome.transform.dropped_rows > 0 {
        print_warning(&format!(
            "{} row(s) with missing values were left out of modeling",
            outcome.transform.dropped_rows
        ));
    }
    display_profile(&outcome.profile);
    display_model("FULL LOGISTIC MODEL", &outcome.full_model);
    display_model("REFINED LOGISTIC MODEL", &outcome.reduced_model);
    display_likelihood_ratio(&outcome.likelihood_ratio);
    print_info(&format!(
        "Random forest: {} tree(s) on {}",
        outcome.forest.tree_count,
        outcome.forest.features.join(", ")
    ));
    display_scores(&outcome.scores);

    let mut timing = progress.timing;
    timing.set_total(run_start.elapsed());

    let report = AnalysisReport::new(&config, outcome, timing);
    export_report(&report, &report_path)?;
    print_success(&format!("Report saved to {}", report_path.display()));

    print_completion();

    Ok(())
}

/// Load and profile only, without cleaning or modeling
fn run_profile(input: &Path, infer_schema_length: usize) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));

    let mut config = PipelineConfig::new(input);
    config.infer_schema_length = infer_schema_length;

    let mut progress = ConsoleProgress::default();
    let (loaded, profile) = match run_profile_observed(&config, &mut progress) {
        Ok(result) => result,
        Err(failure) => return Err(report_failure(failure)),
    };

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", loaded.rows);
    println!("      Columns: {}", loaded.cols);
    println!("      Estimated memory: {:.2} MB", loaded.memory_mb);

    for entry in profile.missing.iter().filter(|m| m.missing > 0) {
        print_count(
            &format!("missing in {}", entry.column),
            entry.missing,
            Some(&format!("({:.1}%)", entry.ratio * 100.0)),
        );
    }
    display_profile(&profile);

    print_completion();
    Ok(())
}

/// Print the failure banner and hand the failure back as an error
fn report_failure(failure: StageFailure) -> anyhow::Error {
    print_failure(
        &failure.stage.to_string(),
        failure.source.kind(),
        &failure.source.to_string(),
    );
    failure.into()
}
