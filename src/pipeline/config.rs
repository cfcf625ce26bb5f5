//! Pipeline configuration

use crate::error::{PipelineError, Result};
use crate::training::LearningCurveConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default fraction of rows held out for testing
pub const DEFAULT_TEST_RATIO: f64 = 0.2;

/// Configuration for one train-and-evaluate run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Registry name of the algorithm, matched exactly
    pub algorithm: String,
    /// Name of the label column, matched exactly
    pub target_column: String,
    /// Fraction of rows held out for testing, in (0, 1)
    pub test_ratio: f64,
    /// Seed for the split and the learning-curve folds; random when unset
    pub random_seed: Option<u64>,
    /// Field separator of the input
    pub delimiter: char,
    pub learning_curve: LearningCurveConfig,
    /// Where learning-curve artifacts are written; nothing is written when unset
    pub artifact_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            algorithm: String::new(),
            target_column: String::new(),
            test_ratio: DEFAULT_TEST_RATIO,
            random_seed: None,
            delimiter: ',',
            learning_curve: LearningCurveConfig::default(),
            artifact_dir: None,
        }
    }
}

impl PipelineConfig {
    pub fn new(algorithm: impl Into<String>, target_column: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            target_column: target_column.into(),
            ..Default::default()
        }
    }

    pub fn with_test_ratio(mut self, test_ratio: f64) -> Self {
        self.test_ratio = test_ratio;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_learning_curve(mut self, learning_curve: LearningCurveConfig) -> Self {
        self.learning_curve = learning_curve;
        self
    }

    /// Turn learning-curve generation off
    pub fn without_learning_curve(mut self) -> Self {
        self.learning_curve.enabled = false;
        self
    }

    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }

    /// Delimiter as a single byte
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(PipelineError::invalid_parameter(
                "delimiter",
                self.delimiter,
                "must be a single ASCII character",
            ))
        }
    }

    /// Check the settings a run cannot proceed without. Names are checked
    /// later, against the registry and the loaded columns; learning-curve
    /// settings are checked when the curve is generated.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(PipelineError::invalid_parameter(
                "test_ratio",
                self.test_ratio,
                "must be strictly between 0 and 1",
            ));
        }
        self.delimiter_byte()?;
        Ok(())
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::new("Decision Tree", "label");
        assert_eq!(config.test_ratio, 0.2);
        assert_eq!(config.delimiter, ',');
        assert!(config.random_seed.is_none());
        assert!(config.learning_curve.enabled);
        assert_eq!(config.learning_curve.n_folds, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::new("Logistic Regression", "y")
            .with_test_ratio(0.3)
            .with_random_seed(42)
            .with_delimiter(';')
            .without_learning_curve()
            .with_artifact_dir("/tmp/curves");

        assert_eq!(config.test_ratio, 0.3);
        assert_eq!(config.random_seed, Some(42));
        assert_eq!(config.delimiter_byte().unwrap(), b';');
        assert!(!config.learning_curve.enabled);
        assert_eq!(config.artifact_dir, Some(PathBuf::from("/tmp/curves")));
    }

    #[test]
    fn test_validation() {
        assert!(PipelineConfig::new("a", "b").with_test_ratio(0.0).validate().is_err());
        assert!(PipelineConfig::new("a", "b").with_test_ratio(1.0).validate().is_err());
        assert!(PipelineConfig::new("a", "b").with_delimiter('é').validate().is_err());

        // left to the learning-curve stage
        let bad_curve = LearningCurveConfig::default().with_n_folds(1);
        assert!(PipelineConfig::new("a", "b")
            .with_learning_curve(bad_curve)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");

        let config = PipelineConfig::new("Decision Tree", "species").with_random_seed(7);
        config.to_json_file(&path).unwrap();
        assert_eq!(PipelineConfig::from_json_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"algorithm": "Decision Tree", "target_column": "y"}"#).unwrap();
        assert_eq!(config.test_ratio, DEFAULT_TEST_RATIO);
        assert_eq!(config.learning_curve, LearningCurveConfig::default());
    }
}
