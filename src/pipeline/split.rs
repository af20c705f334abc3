//! Seeded evaluation/training split

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;

use super::error::{PipelineError, PipelineResult};
use super::record::ModelingTable;

/// Default evaluation-set size
pub const DEFAULT_EVAL_SIZE: usize = 100;

/// Default sampling seed
pub const DEFAULT_SEED: u64 = 1234;

/// A disjoint partition of the modeling table
#[derive(Debug, Clone)]
pub struct Split {
    pub evaluation: ModelingTable,
    pub training: ModelingTable,
    /// Row indices (into the source table) of the evaluation set, in sampled order
    pub evaluation_indices: Vec<usize>,
    /// Row indices of the training set, in table order
    pub training_indices: Vec<usize>,
}

/// Draw `eval_size` rows uniformly without replacement as the evaluation set;
/// everything else becomes the training set.
///
/// The same seed always yields the same partition.
pub fn split_dataset(table: &ModelingTable, eval_size: usize, seed: u64) -> PipelineResult<Split> {
    let n = table.len();
    if eval_size > n {
        return Err(PipelineError::InsufficientData {
            requested: eval_size,
            available: n,
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let evaluation_indices: Vec<usize> = sample(&mut rng, n, eval_size).into_vec();

    let mut in_eval = vec![false; n];
    for &i in &evaluation_indices {
        in_eval[i] = true;
    }
    let training_indices: Vec<usize> = (0..n).filter(|&i| !in_eval[i]).collect();

    Ok(Split {
        evaluation: table.select(&evaluation_indices),
        training: table.select(&training_indices),
        evaluation_indices,
        training_indices,
    })
}
