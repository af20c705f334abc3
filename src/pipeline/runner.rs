//! End-to-end composition of the pipeline stages
//!
//! Stages run strictly in order, each consuming the previous stage's value.
//! The first failure stops the run and is reported with its stage.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;

use super::error::{PipelineError, PipelineResult};
use super::evaluate::ModelScore;
use super::forest::{fit_forest, predict_forest, ForestSummary, DEFAULT_TREE_COUNT};
use super::glm::{
    classify_log_odds, fit_logistic, likelihood_ratio_test, predict_log_odds, Formula, GlmConfig,
    LikelihoodRatioTest, LogisticModel,
};
use super::loader::{load_dataset, LoadedDataset};
use super::profile::{profile_dataset, DatasetProfile};
use super::split::{split_dataset, DEFAULT_EVAL_SIZE, DEFAULT_SEED};
use super::transform::{transform, TransformSummary};

/// Pipeline stage, used to say where a run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loader,
    Profiler,
    Transformer,
    Splitter,
    Modeler,
    Evaluator,
}

impl Stage {
    pub fn number(&self) -> u8 {
        match self {
            Stage::Loader => 1,
            Stage::Profiler => 2,
            Stage::Transformer => 3,
            Stage::Splitter => 4,
            Stage::Modeler => 5,
            Stage::Evaluator => 6,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Loader => "Loader",
            Stage::Profiler => "Profiler",
            Stage::Transformer => "Transformer",
            Stage::Splitter => "Splitter",
            Stage::Modeler => "Modeler",
            Stage::Evaluator => "Evaluator",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stage {} ({})", self.number(), self.title())
    }
}

/// A pipeline error tagged with the stage that raised it
#[derive(Debug, Error)]
#[error("{stage} failed with {}: {source}", .source.kind())]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub source: PipelineError,
}

/// Receives stage lifecycle events during a run
pub trait StageObserver {
    fn stage_started(&mut self, _stage: Stage) {}
    fn stage_finished(&mut self, _stage: Stage, _elapsed: Duration) {}
    fn stage_failed(&mut self, _stage: Stage, _error: &PipelineError) {}
}

/// Observer that ignores every event
pub struct Silent;

impl StageObserver for Silent {}

fn observe<T>(
    observer: &mut dyn StageObserver,
    stage: Stage,
    run: impl FnOnce() -> PipelineResult<T>,
) -> Result<T, StageFailure> {
    observer.stage_started(stage);
    let start = Instant::now();
    match run() {
        Ok(value) => {
            observer.stage_finished(stage, start.elapsed());
            Ok(value)
        }
        Err(source) => {
            observer.stage_failed(stage, &source);
            Err(StageFailure { stage, source })
        }
    }
}

/// Everything needed for one run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub seed: u64,
    pub eval_size: usize,
    pub tree_count: u16,
    pub glm: GlmConfig,
    /// Refined model compared against the full model
    pub reduced_formula: Formula,
    pub infer_schema_length: usize,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            seed: DEFAULT_SEED,
            eval_size: DEFAULT_EVAL_SIZE,
            tree_count: DEFAULT_TREE_COUNT,
            glm: GlmConfig::default(),
            reduced_formula: Formula::reduced(),
            infer_schema_length: 10000,
        }
    }
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub loaded_rows: usize,
    pub profile: DatasetProfile,
    pub transform: TransformSummary,
    pub training_rows: usize,
    pub evaluation_rows: usize,
    pub full_model: LogisticModel,
    pub reduced_model: LogisticModel,
    pub likelihood_ratio: LikelihoodRatioTest,
    pub forest: ForestSummary,
    /// Scores in report order: logistic model first, forest second
    pub scores: Vec<ModelScore>,
}

/// Display name of the logistic model in score tables
pub const GLM_NAME: &str = "Logistic regression";

/// Display name of the forest in score tables
pub const FOREST_NAME: &str = "Random forest";

/// Run only the Loader and Profiler stages
pub fn run_profile_observed(
    config: &PipelineConfig,
    observer: &mut dyn StageObserver,
) -> Result<(LoadedDataset, DatasetProfile), StageFailure> {
    let loaded = observe(observer, Stage::Loader, || {
        load_dataset(&config.input, config.infer_schema_length)
    })?;
    let profile = observe(observer, Stage::Profiler, || profile_dataset(&loaded.df))?;
    Ok((loaded, profile))
}

/// Run all stages without reporting progress
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutcome, StageFailure> {
    run_pipeline_observed(config, &mut Silent)
}

/// Run all stages, reporting each stage's start, end and failure to `observer`
pub fn run_pipeline_observed(
    config: &PipelineConfig,
    observer: &mut dyn StageObserver,
) -> Result<PipelineOutcome, StageFailure> {
    let loaded = observe(observer, Stage::Loader, || {
        load_dataset(&config.input, config.infer_schema_length)
    })?;
    let profile = observe(observer, Stage::Profiler, || profile_dataset(&loaded.df))?;
    let transformed = observe(observer, Stage::Transformer, || transform(&loaded.df))?;
    let split = observe(observer, Stage::Splitter, || {
        split_dataset(&transformed.table, config.eval_size, config.seed)
    })?;

    let (full_model, reduced_model, likelihood_ratio, forest) =
        observe(observer, Stage::Modeler, || {
            let full = fit_logistic(&split.training, &Formula::full(), &config.glm)?;
            let reduced = fit_logistic(&split.training, &config.reduced_formula, &config.glm)?;
            let lrt = likelihood_ratio_test(&reduced, &full)?;
            let forest = fit_forest(&split.training, config.tree_count, config.seed)?;
            Ok((full, reduced, lrt, forest))
        })?;

    let scores = observe(observer, Stage::Evaluator, || {
        let truth = split.evaluation.outcomes();
        let glm_predictions =
            classify_log_odds(&predict_log_odds(&reduced_model, &split.evaluation));
        let forest_predictions = predict_forest(&forest, &split.evaluation)?;
        Ok(vec![
            ModelScore::new(GLM_NAME, &glm_predictions, &truth)?,
            ModelScore::new(FOREST_NAME, &forest_predictions, &truth)?,
        ])
    })?;

    Ok(PipelineOutcome {
        loaded_rows: loaded.rows,
        profile,
        transform: transformed.summary(),
        training_rows: split.training.len(),
        evaluation_rows: split.evaluation.len(),
        full_model,
        reduced_model,
        likelihood_ratio,
        forest: forest.summary(),
        scores,
    })
}
