//! Command-line argument definitions using clap

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::pipeline::{
    Formula, GlmConfig, PipelineConfig, DEFAULT_EVAL_SIZE, DEFAULT_MAX_ITERATIONS, DEFAULT_SEED,
    DEFAULT_TREE_COUNT, DEFAULT_TOLERANCE,
};

/// Titanic survival analysis - profile, clean, and model the passenger list
#[derive(Parser, Debug)]
#[command(name = "titanic")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input CSV file with the passenger list
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// JSON report path.
    /// Defaults to the input directory with a '_report.json' suffix (e.g., train.csv → train_report.json).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Seed for the evaluation/training split and the random forest
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Number of rows held out for evaluation
    #[arg(long, default_value_t = DEFAULT_EVAL_SIZE, value_parser = validate_eval_size)]
    pub eval_size: usize,

    /// Number of trees in the random forest
    #[arg(long, default_value_t = DEFAULT_TREE_COUNT, value_parser = validate_trees)]
    pub trees: u16,

    /// Iteration cap for fitting the logistic models
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS, value_parser = validate_max_iterations)]
    pub max_iterations: usize,

    /// Refined logistic model compared against the full model,
    /// e.g. "Survived ~ Pclass + Sex + Age". Must be nested in the full model.
    #[arg(long, default_value = "Pclass + Sex + Age + SibSp + Fare")]
    pub reduced_formula: Formula,

    /// Skip the prompt before overwriting an existing report
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference.
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and profile the passenger list without fitting any model
    Profile {
        /// Input CSV file
        input: PathBuf,

        /// Number of rows to use for schema inference
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },
}

impl Cli {
    /// Get the report path, deriving it from the input if not explicitly provided
    pub fn report_path(&self) -> Option<PathBuf> {
        let input = self.input.as_ref()?;
        Some(
            self.output
                .clone()
                .unwrap_or_else(|| derive_report_path(input)),
        )
    }

    /// Build the pipeline configuration, if an input was given
    pub fn pipeline_config(&self) -> Option<PipelineConfig> {
        let input = self.input.as_ref()?;
        Some(PipelineConfig {
            input: input.clone(),
            seed: self.seed,
            eval_size: self.eval_size,
            tree_count: self.trees,
            glm: GlmConfig {
                max_iterations: self.max_iterations,
                tolerance: DEFAULT_TOLERANCE,
            },
            reduced_formula: self.reduced_formula.clone(),
            infer_schema_length: self.infer_schema_length,
        })
    }
}

fn derive_report_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("titanic");
    parent.join(format!("{}_report.json", stem))
}

/// Validator for eval_size
fn validate_eval_size(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid row count", s))?;

    if value == 0 {
        Err("eval_size must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

/// Validator for trees
fn validate_trees(s: &str) -> Result<u16, String> {
    let value: u16 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid tree count (1-65535)", s))?;

    if value == 0 {
        Err("trees must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

/// Validator for max_iterations
fn validate_max_iterations(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid iteration count", s))?;

    if value == 0 {
        Err("max_iterations must be at least 1".to_string())
    } else {
        Ok(value)
    }
}
