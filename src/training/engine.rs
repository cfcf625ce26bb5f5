//! Model lifecycle: untrained → trained → predictions

use super::config::{Algorithm, AlgorithmFamily};
use super::decision_tree::DecisionTree;
use super::linear_models::{LinearRegression, LogisticRegression};
use crate::error::{PipelineError, Result};
use crate::preprocessing::{FeatureMatrix, LabelVector};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Concrete estimator behind a model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Estimator {
    LogisticRegression(LogisticRegression),
    LinearRegression(LinearRegression),
    DecisionTree(DecisionTree),
}

impl Estimator {
    fn fresh(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::LogisticRegression => Estimator::LogisticRegression(LogisticRegression::new()),
            Algorithm::LinearRegression => Estimator::LinearRegression(LinearRegression::new()),
            Algorithm::DecisionTree => Estimator::DecisionTree(DecisionTree::new()),
        }
    }
}

/// A model that has not seen any data yet.
///
/// [`UntrainedModel::fit`] consumes it, so a model is trained exactly once.
#[derive(Debug, Clone)]
pub struct UntrainedModel {
    algorithm: Algorithm,
    estimator: Estimator,
}

impl UntrainedModel {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            estimator: Estimator::fresh(algorithm),
        }
    }

    /// Resolve a registry name into a fresh model
    pub fn from_name(name: &str) -> Result<Self> {
        Algorithm::from_name(name).map(Self::new)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn family(&self) -> AlgorithmFamily {
        self.algorithm.family()
    }

    /// Fit on a feature matrix and its row-aligned labels
    pub fn fit(self, x: &FeatureMatrix, y: &LabelVector) -> Result<TrainedModel> {
        if x.n_rows() != y.len() {
            return Err(PipelineError::invalid_parameter(
                "labels",
                format!("length {}", y.len()),
                format!("expected one label per row ({} rows)", x.n_rows()),
            ));
        }

        let start = Instant::now();
        let features = x.values();
        let codes = y.codes();

        let mut estimator = self.estimator;
        match &mut estimator {
            Estimator::LogisticRegression(model) => {
                model.fit(features, codes)?;
            }
            Estimator::LinearRegression(model) => {
                model.fit(features, codes)?;
            }
            Estimator::DecisionTree(model) => {
                model.fit(features, codes)?;
            }
        }

        debug!(
            algorithm = %self.algorithm,
            rows = x.n_rows(),
            features = x.n_features(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Model fitted"
        );

        Ok(TrainedModel {
            algorithm: self.algorithm,
            estimator,
            expected_feature_count: x.n_features(),
            feature_names: x.names().to_vec(),
            n_classes: y.n_classes(),
        })
    }
}

/// A fitted model, ready to predict class codes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    algorithm: Algorithm,
    estimator: Estimator,
    expected_feature_count: usize,
    feature_names: Vec<String>,
    n_classes: usize,
}

impl TrainedModel {
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    /// Number of feature columns the model was fitted on
    pub fn expected_feature_count(&self) -> usize {
        self.expected_feature_count
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn predict(&self, x: &FeatureMatrix) -> Result<Array1<f64>> {
        self.predict_array(x.values())
    }

    /// Predict class codes.
    ///
    /// The column count is checked before the estimator is touched.
    pub fn predict_array(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.expected_feature_count {
            return Err(PipelineError::FeatureShapeMismatch {
                expected: self.expected_feature_count,
                actual: x.ncols(),
            });
        }

        match &self.estimator {
            Estimator::LogisticRegression(model) => model.predict(x),
            Estimator::DecisionTree(model) => model.predict(x),
            Estimator::LinearRegression(model) => {
                let max_code = self.n_classes.saturating_sub(1) as f64;
                Ok(model.predict(x)?.mapv(|v| {
                    if v.is_finite() {
                        v.round().clamp(0.0, max_code)
                    } else {
                        0.0
                    }
                }))
            }
        }
    }
}
