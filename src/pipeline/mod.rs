//! Train-and-evaluate pipeline
//!
//! A run resolves the algorithm, loads the input, checks the target column,
//! encodes features, splits, trains once, predicts both partitions and
//! builds their reports. Any failure ends the run with an error. The
//! learning curve runs last and is optional.

mod config;
mod observer;
mod runner;

pub use config::{PipelineConfig, DEFAULT_TEST_RATIO};
pub use observer::{LoggingObserver, NoopObserver, PipelineObserver, RecordingObserver, Stage};
pub use runner::{Pipeline, PipelineOutcome};
