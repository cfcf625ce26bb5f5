//! Tabular Pipeline - train and evaluate a classifier on delimited data
//!
//! One call loads a table, encodes categorical columns, holds out a test
//! partition, trains the chosen algorithm once and reports accuracy,
//! precision, F1 and a confusion matrix for both partitions. A learning
//! curve can be generated afterwards and stored as an SVG artifact.
//!
//! # Modules
//!
//! - [`utils`] - Delimited-text loading and table validation
//! - [`preprocessing`] - One-hot encoding and label extraction
//! - [`training`] - Algorithm registry, estimators, split, reports, learning curves
//! - [`export`] - Learning-curve artifact store
//! - [`pipeline`] - End-to-end run with stage hooks
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data
pub mod utils;
pub mod preprocessing;

// Models and evaluation
pub mod training;

// Orchestration
pub mod pipeline;
pub mod export;

// Services
pub mod cli;

pub use error::{PipelineError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{PipelineError, Result};

    // Data
    pub use crate::utils::{Dataset, DatasetLoader};

    // Preprocessing
    pub use crate::preprocessing::{
        ClassLabel, ClassificationMode, FeatureMatrix, LabelVector, OneHotEncoder, PreparedData,
        Preprocessor,
    };

    // Training
    pub use crate::training::{
        Algorithm, AlgorithmFamily, EvaluationResult, LearningCurve, LearningCurveConfig,
        LearningCurveGenerator, Report, ReportBuilder, Splitter, TrainedModel, UntrainedModel,
    };

    // Pipeline
    pub use crate::pipeline::{Pipeline, PipelineConfig, PipelineObserver, PipelineOutcome};

    // Export
    pub use crate::export::{ArtifactId, ArtifactStore};
}
