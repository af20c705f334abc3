//! Random forest survival classifier
//!
//! Uses the numeric predictors only: Age, SibSp, Parch and Fare. Sex, class
//! and port never reach the trees.

use serde::Serialize;
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use super::error::{PipelineError, PipelineResult};
use super::record::{ModelingTable, Survival, TransformedRecord};

/// Default number of trees
pub const DEFAULT_TREE_COUNT: u16 = 10;

/// Feature columns fed to the forest, in matrix order
pub const FOREST_FEATURES: [&str; 4] = ["Age", "SibSp", "Parch", "Fare"];

/// Columns the forest deliberately does not see
pub const FOREST_EXCLUDED: [&str; 3] = ["Sex", "Pclass", "Embarked"];

type Forest = RandomForestClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;

/// A fitted forest together with the settings it was trained with
pub struct ForestModel {
    forest: Forest,
    pub tree_count: u16,
    pub seed: u64,
    pub training_rows: usize,
}

/// Settings reported alongside a forest fit
#[derive(Debug, Clone, Serialize)]
pub struct ForestSummary {
    pub tree_count: u16,
    pub seed: u64,
    pub training_rows: usize,
    pub features: Vec<String>,
    pub excluded: Vec<String>,
}

impl ForestModel {
    pub fn summary(&self) -> ForestSummary {
        ForestSummary {
            tree_count: self.tree_count,
            seed: self.seed,
            training_rows: self.training_rows,
            features: FOREST_FEATURES.iter().map(|s| s.to_string()).collect(),
            excluded: FOREST_EXCLUDED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn feature_row(record: &TransformedRecord) -> Vec<f64> {
    vec![record.age, record.sibsp, record.parch, record.fare]
}

fn feature_matrix(table: &ModelingTable) -> PipelineResult<DenseMatrix<f64>> {
    let rows: Vec<Vec<f64>> = table.records().iter().map(feature_row).collect();
    DenseMatrix::from_2d_vec(&rows)
        .map_err(|e| PipelineError::fit(format!("forest feature matrix: {}", e)))
}

/// Class code for the "No"/"Yes" relabeling of the survival indicator
fn encode(label: Survival) -> u32 {
    match label {
        Survival::Died => 0,
        Survival::Survived => 1,
    }
}

fn decode(code: u32) -> PipelineResult<Survival> {
    match code {
        0 => Ok(Survival::Died),
        1 => Ok(Survival::Survived),
        other => Err(PipelineError::schema(
            "Survived",
            format!("forest produced unknown class code {}", other),
        )),
    }
}

/// Train a forest of `tree_count` trees on `training`.
///
/// The seed drives bootstrap sampling and feature selection so that the same
/// inputs always give the same forest.
pub fn fit_forest(training: &ModelingTable, tree_count: u16, seed: u64) -> PipelineResult<ForestModel> {
    if tree_count == 0 {
        return Err(PipelineError::fit("forest needs at least one tree"));
    }
    if training.is_empty() {
        return Err(PipelineError::fit("forest needs at least one training row"));
    }

    let labels: Vec<u32> = training.records().iter().map(|r| encode(r.survived)).collect();
    if labels.iter().all(|&l| l == labels[0]) {
        return Err(PipelineError::fit(format!(
            "training labels are all '{}'; a classifier needs both classes",
            training.records()[0].survived.label()
        )));
    }

    let x = feature_matrix(training)?;
    let params = RandomForestClassifierParameters::default()
        .with_n_trees(tree_count)
        .with_seed(seed);

    let forest = RandomForestClassifier::fit(&x, &labels, params)
        .map_err(|e| PipelineError::fit(format!("random forest: {}", e)))?;

    Ok(ForestModel {
        forest,
        tree_count,
        seed,
        training_rows: training.len(),
    })
}

/// Predict "No"/"Yes" survival labels for each row of `table`
pub fn predict_forest(model: &ForestModel, table: &ModelingTable) -> PipelineResult<Vec<Survival>> {
    if table.is_empty() {
        return Ok(Vec::new());
    }

    let x = feature_matrix(table)?;
    let codes: Vec<u32> = model
        .forest
        .predict(&x)
        .map_err(|e| PipelineError::fit(format!("random forest prediction: {}", e)))?;

    codes.into_iter().map(decode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::record::{PassengerClass, Port, Sex};

    fn record(age: f64, fare: f64, survived: Survival) -> TransformedRecord {
        TransformedRecord {
            survived,
            pclass: PassengerClass::Second,
            sex: Sex::Female,
            age,
            sibsp: 0.0,
            parch: 0.0,
            fare,
            embarked: Port::Cherbourg,
        }
    }

    fn separable_table() -> ModelingTable {
        (0..60)
            .map(|i| {
                let survived = i % 2 == 0;
                let fare = if survived { 4.0 + (i % 5) as f64 * 0.1 } else { 1.0 + (i % 5) as f64 * 0.1 };
                let label = if survived { Survival::Survived } else { Survival::Died };
                record(20.0 + (i % 7) as f64, fare, label)
            })
            .collect()
    }

    #[test]
    fn test_codes_round_trip() {
        assert_eq!(decode(encode(Survival::Survived)).unwrap(), Survival::Survived);
        assert_eq!(decode(encode(Survival::Died)).unwrap(), Survival::Died);
        assert!(decode(7).is_err());
    }

    #[test]
    fn test_forest_learns_separable_fares() {
        let table = separable_table();
        let model = fit_forest(&table, DEFAULT_TREE_COUNT, 1234).unwrap();
        let predictions = predict_forest(&model, &table).unwrap();

        assert_eq!(predictions.len(), table.len());
        let correct = predictions
            .iter()
            .zip(table.outcomes())
            .filter(|(p, t)| **p == *t)
            .count();
        assert!(correct >= 54, "expected near-perfect fit, got {}/60", correct);
    }

    #[test]
    fn test_zero_trees_rejected() {
        let err = fit_forest(&separable_table(), 0, 1).err().unwrap();
        assert_eq!(err.kind(), "FitError");
    }

    #[test]
    fn test_single_class_rejected() {
        let table: ModelingTable = (0..10).map(|i| record(i as f64, 1.0, Survival::Died)).collect();
        let err = fit_forest(&table, 5, 1).err().unwrap();
        assert!(err.to_string().contains("both classes"));
    }

    #[test]
    fn test_summary_lists_excluded_predictors() {
        let model = fit_forest(&separable_table(), 3, 9).unwrap();
        let summary = model.summary();
        assert_eq!(summary.tree_count, 3);
        assert!(summary.excluded.contains(&"Sex".to_string()));
        assert_eq!(summary.features.len(), 4);
    }
}
