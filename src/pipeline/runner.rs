//! Pipeline execution

use super::config::PipelineConfig;
use super::observer::{LoggingObserver, PipelineObserver, Stage};
use crate::error::Result;
use crate::export::{ArtifactId, ArtifactStore};
use crate::preprocessing::{ClassificationMode, PreparedData, Preprocessor};
use crate::training::{
    Algorithm, EvaluationResult, LearningCurve, LearningCurveGenerator, ReportBuilder, Splitter,
    UntrainedModel,
};
use crate::utils::{open_csv, DatasetLoader};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Everything a successful run produces
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    /// Train and test reports
    pub result: EvaluationResult,
    pub algorithm: Algorithm,
    pub mode: ClassificationMode,
    /// Encoded feature columns, in model input order
    pub feature_names: Vec<String>,
    /// Learning curve, when enabled and generated
    #[serde(skip)]
    pub learning_curve: Option<LearningCurve>,
    /// Id of the stored learning-curve artifact, when one was written
    pub learning_curve_artifact: Option<ArtifactId>,
}

/// Runs one train-and-evaluate pass per call.
///
/// Runs share nothing: every call builds its own dataset and model.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

fn run_stage<T>(
    observer: &mut dyn PipelineObserver,
    stage: Stage,
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    observer.on_stage_start(stage);
    match f() {
        Ok(value) => {
            observer.on_stage_end(stage);
            Ok(value)
        }
        Err(e) => {
            observer.on_error(stage, &e);
            Err(e)
        }
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run on a `.csv` file
    pub fn run_path(&self, path: impl AsRef<Path>) -> Result<PipelineOutcome> {
        self.run(open_csv(path.as_ref())?)
    }

    /// Run on delimited text, logging stage transitions
    pub fn run<R: Read>(&self, input: R) -> Result<PipelineOutcome> {
        self.run_with_observer(input, &mut LoggingObserver)
    }

    pub fn run_with_observer<R: Read>(
        &self,
        input: R,
        observer: &mut dyn PipelineObserver,
    ) -> Result<PipelineOutcome> {
        let start = Instant::now();
        let config = &self.config;

        // Unknown algorithms stop the run before any input is read
        let algorithm = run_stage(observer, Stage::ResolveAlgorithm, || {
            let algorithm = Algorithm::from_name(&config.algorithm)?;
            config.validate()?;
            Ok(algorithm)
        })?;

        let dataset = run_stage(observer, Stage::Load, || {
            DatasetLoader::new()
                .with_delimiter(config.delimiter_byte()?)
                .load(input)
        })?;

        run_stage(observer, Stage::ValidateTarget, || {
            dataset.validate_target(&config.target_column)
        })?;

        let prepared = run_stage(observer, Stage::Preprocess, || {
            Preprocessor::new().prepare(&dataset, &config.target_column)
        })?;
        drop(dataset);

        let split = run_stage(observer, Stage::Split, || {
            let mut splitter = Splitter::new(config.test_ratio)?;
            if let Some(seed) = config.random_seed {
                splitter = splitter.with_random_state(seed);
            }
            splitter.split(&prepared.features, &prepared.labels)
        })?;

        info!(
            "# Training examples: {}, # Test examples: {}",
            split.train.n_rows(),
            split.test.n_rows()
        );

        let model = run_stage(observer, Stage::Train, || {
            info!(
                "Training the model with {} examples and {} features.",
                split.train.n_rows(),
                split.train.features.n_features()
            );
            UntrainedModel::new(algorithm).fit(&split.train.features, &split.train.labels)
        })?;

        let (train_pred, test_pred) = run_stage(observer, Stage::Predict, || {
            info!("Getting Train Predictions...");
            let train_pred = model.predict(&split.train.features)?;
            info!("Getting Test Predictions...");
            let test_pred = model.predict(&split.test.features)?;
            Ok((train_pred, test_pred))
        })?;

        let builder = ReportBuilder::for_labels(&prepared.labels);
        let result = run_stage(observer, Stage::Report, || {
            Ok(EvaluationResult {
                train: builder.build(split.train.labels.codes(), &train_pred)?,
                test: builder.build(split.test.labels.codes(), &test_pred)?,
            })
        })?;

        info!(
            algorithm = %algorithm,
            train_accuracy = result.train.accuracy,
            test_accuracy = result.test.accuracy,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Evaluation complete"
        );

        let (learning_curve, learning_curve_artifact) = if config.learning_curve.enabled {
            // best effort: a failure here never affects `result`
            match run_stage(observer, Stage::LearningCurve, || {
                self.learning_curve(algorithm, &prepared)
            }) {
                Ok((curve, id)) => (Some(curve), id),
                Err(_) => (None, None),
            }
        } else {
            (None, None)
        };

        Ok(PipelineOutcome {
            result,
            algorithm,
            mode: prepared.mode(),
            feature_names: prepared.features.names().to_vec(),
            learning_curve,
            learning_curve_artifact,
        })
    }

    fn learning_curve(
        &self,
        algorithm: Algorithm,
        prepared: &PreparedData,
    ) -> Result<(LearningCurve, Option<ArtifactId>)> {
        let curve = LearningCurveGenerator::new(self.config.learning_curve.clone())
            .with_random_state(self.config.random_seed)
            .generate(algorithm, prepared)?;

        let id = match &self.config.artifact_dir {
            Some(dir) => Some(ArtifactStore::new(dir)?.write_learning_curve(&curve)?),
            None => None,
        };

        Ok((curve, id))
    }
}
