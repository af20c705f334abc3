//! Scoring predictions against the evaluation set

use serde::Serialize;

use super::error::{PipelineError, PipelineResult};

/// Match count for one model on the evaluation set
#[derive(Debug, Clone, Serialize)]
pub struct ModelScore {
    pub model: String,
    pub matches: usize,
    pub total: usize,
    /// `matches / total`, or 0 for an empty evaluation set
    pub accuracy: f64,
}

impl ModelScore {
    /// Score `predicted` against `truth`, aligned by row
    pub fn new<T: PartialEq>(
        model: impl Into<String>,
        predicted: &[T],
        truth: &[T],
    ) -> PipelineResult<Self> {
        let matches = count_matches(predicted, truth)?;
        let total = truth.len();
        let accuracy = if total == 0 {
            0.0
        } else {
            matches as f64 / total as f64
        };

        Ok(Self {
            model: model.into(),
            matches,
            total,
            accuracy,
        })
    }
}

/// Number of positions where prediction and truth agree
pub fn count_matches<T: PartialEq>(predicted: &[T], truth: &[T]) -> PipelineResult<usize> {
    if predicted.len() != truth.len() {
        return Err(PipelineError::schema(
            "Survived",
            format!(
                "{} predictions for {} evaluation rows",
                predicted.len(),
                truth.len()
            ),
        ));
    }

    Ok(predicted
        .iter()
        .zip(truth.iter())
        .filter(|(p, t)| p == t)
        .count())
}
