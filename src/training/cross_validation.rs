//! Repeated k-fold cross-validation

use crate::error::{PipelineError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A single train/test split
#[derive(Debug, Clone)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Shuffled k-fold splitter, repeated with a fresh shuffle each time
#[derive(Debug, Clone)]
pub struct CrossValidator {
    n_splits: usize,
    n_repeats: usize,
    random_state: Option<u64>,
}

impl CrossValidator {
    pub fn new(n_splits: usize, n_repeats: usize) -> Self {
        Self {
            n_splits,
            n_repeats,
            random_state: None,
        }
    }

    /// Seed the shuffles; entropy is used when `None`
    pub fn with_random_state(mut self, seed: Option<u64>) -> Self {
        self.random_state = seed;
        self
    }

    fn rng(&self, offset: u64) -> ChaCha8Rng {
        match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(offset)),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// `n_splits * n_repeats` splits; `fold_idx` counts across repeats
    pub fn split(&self, n_samples: usize) -> Result<Vec<CVSplit>> {
        if self.n_splits < 2 {
            return Err(PipelineError::invalid_parameter(
                "n_splits",
                self.n_splits,
                "must be at least 2",
            ));
        }
        if self.n_repeats == 0 {
            return Err(PipelineError::invalid_parameter(
                "n_repeats",
                self.n_repeats,
                "must be at least 1",
            ));
        }
        if n_samples < self.n_splits {
            return Err(PipelineError::InsufficientRows {
                rows: n_samples,
                required: self.n_splits,
            });
        }

        let mut all_splits = Vec::with_capacity(self.n_splits * self.n_repeats);
        for repeat in 0..self.n_repeats {
            let mut indices: Vec<usize> = (0..n_samples).collect();
            indices.shuffle(&mut self.rng(repeat as u64));

            // the first `n % k` folds take one extra row
            let base = n_samples / self.n_splits;
            let remainder = n_samples % self.n_splits;
            let mut current = 0;

            for fold in 0..self.n_splits {
                let fold_size = if fold < remainder { base + 1 } else { base };
                let test_indices = indices[current..current + fold_size].to_vec();
                let train_indices: Vec<usize> = indices[..current]
                    .iter()
                    .chain(indices[current + fold_size..].iter())
                    .copied()
                    .collect();

                all_splits.push(CVSplit {
                    train_indices,
                    test_indices,
                    fold_idx: repeat * self.n_splits + fold,
                });
                current += fold_size;
            }
        }

        Ok(all_splits)
    }
}

/// Summary of per-fold scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CVResults {
    /// Scores for each fold
    pub scores: Vec<f64>,
    /// Mean score across folds
    pub mean_score: f64,
    /// Population standard deviation of scores
    pub std_score: f64,
    pub n_folds: usize,
}

impl CVResults {
    /// Summarize fold scores; `None` when there are none
    pub fn from_scores(scores: Vec<f64>) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let n_folds = scores.len();
        let mean_score = scores.iter().sum::<f64>() / n_folds as f64;
        let variance = scores.iter().map(|s| (s - mean_score).powi(2)).sum::<f64>() / n_folds as f64;

        Some(Self {
            scores,
            mean_score,
            std_score: variance.sqrt(),
            n_folds,
        })
    }
}
