//! Integration tests for the evaluation/training split

use std::collections::HashSet;

use titanic_survival::pipeline::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_default_split_of_cleaned_table() {
    let table = create_modeling_table(FULL_ROWS - MISSING_EMBARKED.len(), 7);

    let split = split_dataset(&table, DEFAULT_EVAL_SIZE, DEFAULT_SEED).unwrap();

    assert_eq!(split.evaluation.len(), 100);
    assert_eq!(split.training.len(), 789);
}

#[test]
fn test_partition_is_disjoint_and_covering() {
    let table = create_modeling_table(300, 7);

    let split = split_dataset(&table, 120, 99).unwrap();

    let eval: HashSet<usize> = split.evaluation_indices.iter().copied().collect();
    let train: HashSet<usize> = split.training_indices.iter().copied().collect();
    assert_eq!(eval.len(), 120);
    assert!(eval.is_disjoint(&train));
    assert_eq!(eval.len() + train.len(), table.len());
}

#[test]
fn test_training_rows_keep_table_order() {
    let table = create_modeling_table(150, 7);

    let split = split_dataset(&table, 50, 3).unwrap();

    assert!(split.training_indices.windows(2).all(|w| w[0] < w[1]));
    for (row, &i) in split.training.records().iter().zip(&split.training_indices) {
        assert_eq!(row, &table.records()[i]);
    }
}

#[test]
fn test_same_seed_same_partition() {
    let table = create_modeling_table(200, 7);

    let a = split_dataset(&table, 100, DEFAULT_SEED).unwrap();
    let b = split_dataset(&table, 100, DEFAULT_SEED).unwrap();
    let c = split_dataset(&table, 100, DEFAULT_SEED + 1).unwrap();

    assert_eq!(a.evaluation_indices, b.evaluation_indices);
    assert_ne!(a.evaluation_indices, c.evaluation_indices);
}

#[test]
fn test_whole_table_as_evaluation() {
    let table = create_modeling_table(40, 7);

    let split = split_dataset(&table, 40, DEFAULT_SEED).unwrap();

    assert_eq!(split.evaluation.len(), 40);
    assert!(split.training.is_empty());
}

#[test]
fn test_oversized_request_is_insufficient_data() {
    let table = create_modeling_table(40, 7);

    let err = split_dataset(&table, 41, DEFAULT_SEED).unwrap_err();

    assert_eq!(err.kind(), "InsufficientDataError");
    assert!(matches!(
        err,
        PipelineError::InsufficientData {
            requested: 41,
            available: 40
        }
    ));
}
