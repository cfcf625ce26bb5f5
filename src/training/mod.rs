//! Model training module
//!
//! Provides the model side of the pipeline:
//! - An algorithm registry (Logistic Regression, Linear Regression, Decision Tree)
//! - A train-once model lifecycle with a feature-count guard on prediction
//! - Shuffled train/test splitting and repeated k-fold cross-validation
//! - Accuracy, precision, F1 and confusion-matrix reports
//! - Learning curves over increasing training-set sizes

mod config;
mod engine;
mod models;
mod split;
pub mod cross_validation;
pub mod decision_tree;
pub mod learning_curve;
pub mod linear_models;

pub use config::{Algorithm, AlgorithmFamily};
pub use cross_validation::{CVResults, CVSplit, CrossValidator};
pub use engine::{Estimator, TrainedModel, UntrainedModel};
pub use learning_curve::{CurvePoint, LearningCurve, LearningCurveConfig, LearningCurveGenerator};
pub use models::{EvaluationResult, Report, ReportBuilder};
pub use split::{Splitter, TrainTestSplit};
