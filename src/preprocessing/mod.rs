//! Data preprocessing module
//!
//! Turns a loaded [`Dataset`] into model inputs:
//! - categorical feature columns become one-hot indicator columns
//! - numeric and boolean columns pass through as `f64`
//! - the target column becomes a [`LabelVector`] of class codes
//!
//! Encoding runs once over the whole dataset, before any train/test split,
//! so every partition shares one column layout.

mod encoder;
mod labels;

pub use encoder::{ColumnEncoding, ColumnType, FeatureMatrix, OneHotEncoder};
pub use labels::{ClassLabel, ClassificationMode, LabelVector};

use crate::error::{PipelineError, Result};
use crate::utils::Dataset;
use polars::prelude::*;
use tracing::info;

/// Encoded features and labels for one dataset
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub features: FeatureMatrix,
    pub labels: LabelVector,
}

impl PreparedData {
    pub fn n_rows(&self) -> usize {
        self.features.n_rows()
    }

    pub fn mode(&self) -> ClassificationMode {
        self.labels.mode()
    }
}

/// Categorical-to-numeric preprocessing
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    encoder: OneHotEncoder,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-hot encode a frame that no longer contains the target
    pub fn encode(&mut self, features: &DataFrame) -> Result<FeatureMatrix> {
        self.encoder.fit_transform(features)
    }

    /// Split off the target column and encode the rest.
    ///
    /// The target must already have been validated against the dataset.
    pub fn prepare(&mut self, dataset: &Dataset, target: &str) -> Result<PreparedData> {
        info!("Pre-processing data to convert string to floats...");

        dataset.validate_target(target)?;

        let frame = dataset.frame();
        let labels = LabelVector::from_column(frame.column(target)?)?;
        let feature_frame = frame.drop(target)?;

        if feature_frame.width() == 0 {
            return Err(PipelineError::invalid_parameter(
                "target_column",
                target,
                "no feature columns remain after removing the target",
            ));
        }

        let features = self.encode(&feature_frame)?;

        info!(
            features = features.n_features(),
            source_columns = feature_frame.width(),
            classes = labels.n_classes(),
            "Encoded feature matrix"
        );

        Ok(PreparedData { features, labels })
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }
}
