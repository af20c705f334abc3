//! Integration tests for the random forest

use titanic_survival::pipeline::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_same_seed_same_predictions() {
    let training = create_modeling_table(400, 21);
    let evaluation = create_modeling_table(100, 22);

    let a = fit_forest(&training, DEFAULT_TREE_COUNT, DEFAULT_SEED).unwrap();
    let b = fit_forest(&training, DEFAULT_TREE_COUNT, DEFAULT_SEED).unwrap();

    assert_eq!(
        predict_forest(&a, &evaluation).unwrap(),
        predict_forest(&b, &evaluation).unwrap()
    );
}

#[test]
fn test_one_prediction_per_row() {
    let training = create_modeling_table(300, 21);
    let evaluation = create_modeling_table(57, 22);

    let forest = fit_forest(&training, 5, 1).unwrap();
    let predictions = predict_forest(&forest, &evaluation).unwrap();

    assert_eq!(predictions.len(), 57);
}

#[test]
fn test_summary_lists_numeric_features_only() {
    let training = create_modeling_table(200, 21);

    let summary = fit_forest(&training, 3, 9).unwrap().summary();

    assert_eq!(summary.tree_count, 3);
    assert_eq!(summary.training_rows, 200);
    assert_eq!(summary.features, vec!["Age", "SibSp", "Parch", "Fare"]);
    assert!(summary.excluded.contains(&"Sex".to_string()));
}

#[test]
fn test_single_class_training_is_fit_error() {
    let training: ModelingTable = create_modeling_table(50, 21)
        .records()
        .iter()
        .cloned()
        .map(|mut r| {
            r.survived = Survival::Died;
            r
        })
        .collect();

    let err = fit_forest(&training, 10, 1).err().unwrap();

    assert_eq!(err.kind(), "FitError");
}
