//! Shuffled train/test partitioning

use crate::error::{PipelineError, Result};
use crate::preprocessing::{FeatureMatrix, LabelVector, PreparedData};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Training and held-out partitions of one dataset
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: PreparedData,
    pub test: PreparedData,
}

/// Row-aligned random splitter
#[derive(Debug, Clone)]
pub struct Splitter {
    /// Fraction of rows held out for testing, in (0, 1)
    test_ratio: f64,
    random_state: Option<u64>,
}

impl Splitter {
    pub fn new(test_ratio: f64) -> Result<Self> {
        if !(test_ratio > 0.0 && test_ratio < 1.0) {
            return Err(PipelineError::invalid_parameter(
                "test_ratio",
                test_ratio,
                "must be strictly between 0 and 1",
            ));
        }
        Ok(Self {
            test_ratio,
            random_state: None,
        })
    }

    /// Set random state for reproducibility
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn test_ratio(&self) -> f64 {
        self.test_ratio
    }

    /// Number of test rows: `round(n * ratio)`, kept within `[1, n - 1]`
    pub fn test_size(&self, n_samples: usize) -> Result<usize> {
        if n_samples < 2 {
            return Err(PipelineError::InsufficientRows {
                rows: n_samples,
                required: 2,
            });
        }
        let raw = (n_samples as f64 * self.test_ratio).round() as usize;
        Ok(raw.clamp(1, n_samples - 1))
    }

    /// Shuffled (train, test) row indices
    pub fn split_indices(&self, n_samples: usize) -> Result<(Vec<usize>, Vec<usize>)> {
        let test_size = self.test_size(n_samples)?;

        let mut indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        indices.shuffle(&mut rng);

        let train = indices.split_off(test_size);
        Ok((train, indices))
    }

    pub fn split(&self, features: &FeatureMatrix, labels: &LabelVector) -> Result<TrainTestSplit> {
        if features.n_rows() != labels.len() {
            return Err(PipelineError::invalid_parameter(
                "labels",
                format!("length {}", labels.len()),
                format!("expected one label per row ({} rows)", features.n_rows()),
            ));
        }

        let (train_idx, test_idx) = self.split_indices(features.n_rows())?;

        Ok(TrainTestSplit {
            train: PreparedData {
                features: features.select_rows(&train_idx),
                labels: labels.select_rows(&train_idx),
            },
            test: PreparedData {
                features: features.select_rows(&test_idx),
                labels: labels.select_rows(&test_idx),
            },
        })
    }
}
