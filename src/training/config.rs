//! Algorithm registry

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Broad kind of model an algorithm produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlgorithmFamily {
    /// Predicts class labels directly
    Classifier,
    /// Predicts a continuous value, mapped back onto class codes
    Regressor,
}

impl fmt::Display for AlgorithmFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmFamily::Classifier => f.write_str("classifier"),
            AlgorithmFamily::Regressor => f.write_str("regressor"),
        }
    }
}

/// The fixed set of algorithms a pipeline can train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "Logistic Regression")]
    LogisticRegression,
    #[serde(rename = "Linear Regression")]
    LinearRegression,
    #[serde(rename = "Decision Tree")]
    DecisionTree,
}

impl Algorithm {
    /// Every registered algorithm, in display order
    pub const ALL: [Algorithm; 3] = [
        Algorithm::LogisticRegression,
        Algorithm::LinearRegression,
        Algorithm::DecisionTree,
    ];

    /// Registry name, matched exactly by [`Algorithm::from_name`]
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::LogisticRegression => "Logistic Regression",
            Algorithm::LinearRegression => "Linear Regression",
            Algorithm::DecisionTree => "Decision Tree",
        }
    }

    pub fn family(&self) -> AlgorithmFamily {
        match self {
            Algorithm::LogisticRegression | Algorithm::DecisionTree => AlgorithmFamily::Classifier,
            Algorithm::LinearRegression => AlgorithmFamily::Regressor,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Algorithm::LogisticRegression => {
                "Probabilistic linear classifier (one-vs-rest for more than two classes)"
            }
            Algorithm::LinearRegression => {
                "Least-squares regressor on class codes, rounded to the nearest class"
            }
            Algorithm::DecisionTree => "CART decision tree classifier with Gini impurity",
        }
    }

    /// Names of all registered algorithms
    pub fn supported_names() -> Vec<String> {
        Self::ALL.iter().map(|a| a.name().to_string()).collect()
    }

    /// Look up an algorithm by its exact, case-sensitive name.
    ///
    /// Never falls back to a default.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.name() == name)
            .ok_or_else(|| PipelineError::UnsupportedAlgorithm {
                name: name.to_string(),
                supported: Self::supported_names(),
            })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}
