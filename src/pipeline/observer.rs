//! Stage hooks for pipeline runs

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, warn};

/// Steps of a pipeline run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ResolveAlgorithm,
    Load,
    ValidateTarget,
    Preprocess,
    Split,
    Train,
    Predict,
    Report,
    LearningCurve,
}

impl Stage {
    /// Whether a failure at this stage fails the whole run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Stage::LearningCurve)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ResolveAlgorithm => "resolve_algorithm",
            Stage::Load => "load",
            Stage::ValidateTarget => "validate_target",
            Stage::Preprocess => "preprocess",
            Stage::Split => "split",
            Stage::Train => "train",
            Stage::Predict => "predict",
            Stage::Report => "report",
            Stage::LearningCurve => "learning_curve",
        };
        f.write_str(name)
    }
}

/// Hooks into a pipeline run.
///
/// All methods have default no-op implementations, so implementors only
/// override the events they care about.
pub trait PipelineObserver {
    /// Called before a stage runs
    fn on_stage_start(&mut self, _stage: Stage) {}

    /// Called after a stage succeeds
    fn on_stage_end(&mut self, _stage: Stage) {}

    /// Called when a stage fails
    fn on_error(&mut self, _stage: Stage, _error: &PipelineError) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Observer that logs stage transitions through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl PipelineObserver for LoggingObserver {
    fn on_stage_start(&mut self, stage: Stage) {
        debug!(%stage, "Stage started");
    }

    fn on_stage_end(&mut self, stage: Stage) {
        debug!(%stage, "Stage finished");
    }

    fn on_error(&mut self, stage: Stage, err: &PipelineError) {
        if stage.is_fatal() {
            error!(%stage, error = %err, "Pipeline stage failed");
        } else {
            warn!(%stage, error = %err, "Optional stage failed, continuing");
        }
    }
}

/// Records every event, for inspecting a run after the fact
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub started: Vec<Stage>,
    pub finished: Vec<Stage>,
    pub failed: Vec<(Stage, String)>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn was_started(&self, stage: Stage) -> bool {
        self.started.contains(&stage)
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_stage_start(&mut self, stage: Stage) {
        self.started.push(stage);
    }

    fn on_stage_end(&mut self, stage: Stage) {
        self.finished.push(stage);
    }

    fn on_error(&mut self, stage: Stage, err: &PipelineError) {
        self.failed.push((stage, err.to_string()));
    }
}
