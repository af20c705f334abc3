//! JSON export of a full analysis run

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{
    DatasetProfile, ForestSummary, LikelihoodRatioTest, LogisticModel, ModelScore,
    PipelineConfig, PipelineOutcome, TransformSummary, LOG_ODDS_THRESHOLD,
};

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub version: String,
    pub input_file: String,
    pub seed: u64,
    pub eval_size: usize,
    pub tree_count: u16,
    pub max_iterations: usize,
    pub log_odds_threshold: f64,
}

/// Partition sizes
#[derive(Debug, Clone, Serialize)]
pub struct SplitSummary {
    pub training_rows: usize,
    pub evaluation_rows: usize,
}

/// Both model families and their comparison
#[derive(Debug, Clone, Serialize)]
pub struct ModelsSection {
    pub full: LogisticModel,
    pub reduced: LogisticModel,
    pub likelihood_ratio: LikelihoodRatioTest,
    pub forest: ForestSummary,
}

/// Timing information in milliseconds
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimingInfo {
    pub load_ms: u64,
    pub profile_ms: u64,
    pub transform_ms: u64,
    pub split_ms: u64,
    pub model_ms: u64,
    pub evaluate_ms: u64,
    pub total_ms: u64,
}

impl TimingInfo {
    pub fn set_load(&mut self, elapsed: Duration) {
        self.load_ms = elapsed.as_millis() as u64;
    }

    pub fn set_profile(&mut self, elapsed: Duration) {
        self.profile_ms = elapsed.as_millis() as u64;
    }

    pub fn set_transform(&mut self, elapsed: Duration) {
        self.transform_ms = elapsed.as_millis() as u64;
    }

    pub fn set_split(&mut self, elapsed: Duration) {
        self.split_ms = elapsed.as_millis() as u64;
    }

    pub fn set_model(&mut self, elapsed: Duration) {
        self.model_ms = elapsed.as_millis() as u64;
    }

    pub fn set_evaluate(&mut self, elapsed: Duration) {
        self.evaluate_ms = elapsed.as_millis() as u64;
    }

    pub fn set_total(&mut self, elapsed: Duration) {
        self.total_ms = elapsed.as_millis() as u64;
    }
}

/// Complete analysis report
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub profile: DatasetProfile,
    pub transform: TransformSummary,
    pub split: SplitSummary,
    pub models: ModelsSection,
    pub scores: Vec<ModelScore>,
    pub timing: TimingInfo,
}

impl AnalysisReport {
    pub fn new(config: &PipelineConfig, outcome: PipelineOutcome, timing: TimingInfo) -> Self {
        Self {
            metadata: ReportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: config.input.display().to_string(),
                seed: config.seed,
                eval_size: config.eval_size,
                tree_count: config.tree_count,
                max_iterations: config.glm.max_iterations,
                log_odds_threshold: LOG_ODDS_THRESHOLD,
            },
            profile: outcome.profile,
            transform: outcome.transform,
            split: SplitSummary {
                training_rows: outcome.training_rows,
                evaluation_rows: outcome.evaluation_rows,
            },
            models: ModelsSection {
                full: outcome.full_model,
                reduced: outcome.reduced_model,
                likelihood_ratio: outcome.likelihood_ratio,
                forest: outcome.forest,
            },
            scores: outcome.scores,
            timing,
        }
    }
}

/// Write the report as pretty-printed JSON
pub fn export_report(report: &AnalysisReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize analysis report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    Ok(())
}
