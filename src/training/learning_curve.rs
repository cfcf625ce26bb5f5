//! Learning curves: accuracy as a function of training-set size

use super::config::Algorithm;
use super::cross_validation::{CVResults, CrossValidator};
use super::engine::UntrainedModel;
use crate::error::{PipelineError, Result};
use crate::preprocessing::PreparedData;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Learning-curve settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningCurveConfig {
    /// Generate the curve after a successful run
    pub enabled: bool,
    /// Cross-validation folds per repetition
    pub n_folds: usize,
    /// Times the k-fold split is reshuffled and repeated
    pub n_repeats: usize,
    /// Checkpoints as fractions of the largest training fold, each in (0, 1]
    pub train_sizes: Vec<f64>,
}

impl Default for LearningCurveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            n_folds: 3,
            n_repeats: 1,
            train_sizes: vec![0.1, 0.325, 0.55, 0.775, 1.0],
        }
    }
}

impl LearningCurveConfig {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }

    pub fn with_n_repeats(mut self, n_repeats: usize) -> Self {
        self.n_repeats = n_repeats;
        self
    }

    pub fn with_train_sizes(mut self, train_sizes: Vec<f64>) -> Self {
        self.train_sizes = train_sizes;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_folds < 2 {
            return Err(PipelineError::invalid_parameter(
                "learning_curve.n_folds",
                self.n_folds,
                "must be at least 2",
            ));
        }
        if self.n_repeats == 0 {
            return Err(PipelineError::invalid_parameter(
                "learning_curve.n_repeats",
                self.n_repeats,
                "must be at least 1",
            ));
        }
        if self.train_sizes.is_empty() {
            return Err(PipelineError::invalid_parameter(
                "learning_curve.train_sizes",
                "[]",
                "needs at least one checkpoint",
            ));
        }
        if let Some(bad) = self.train_sizes.iter().find(|&&f| !(f > 0.0 && f <= 1.0)) {
            return Err(PipelineError::invalid_parameter(
                "learning_curve.train_sizes",
                bad,
                "each fraction must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Scores at one training-set size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Rows used for fitting
    pub train_size: usize,
    pub train: CVResults,
    pub validation: CVResults,
}

impl CurvePoint {
    fn train_scores(&self) -> &CVResults {
        &self.train
    }

    fn validation_scores(&self) -> &CVResults {
        &self.validation
    }
}

/// A generated learning curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningCurve {
    pub algorithm: Algorithm,
    pub n_folds: usize,
    pub n_repeats: usize,
    pub points: Vec<CurvePoint>,
}

fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let correct = y_true.iter().zip(y_pred.iter()).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len().max(1) as f64
}

/// Fits fresh models at increasing training sizes under repeated k-fold
#[derive(Debug, Clone)]
pub struct LearningCurveGenerator {
    config: LearningCurveConfig,
    random_state: Option<u64>,
}

impl LearningCurveGenerator {
    pub fn new(config: LearningCurveConfig) -> Self {
        Self {
            config,
            random_state: None,
        }
    }

    /// Set random state for reproducibility
    pub fn with_random_state(mut self, seed: Option<u64>) -> Self {
        self.random_state = seed;
        self
    }

    /// Absolute checkpoint sizes for a given largest training fold
    fn checkpoints(&self, max_train: usize) -> Vec<usize> {
        let mut sizes: Vec<usize> = self
            .config
            .train_sizes
            .iter()
            .map(|f| ((f * max_train as f64).floor() as usize).clamp(1, max_train))
            .collect();
        sizes.sort_unstable();
        sizes.dedup();
        sizes
    }

    pub fn generate(&self, algorithm: Algorithm, data: &PreparedData) -> Result<LearningCurve> {
        self.config.validate()?;

        let n_samples = data.n_rows();
        let splits = CrossValidator::new(self.config.n_folds, self.config.n_repeats)
            .with_random_state(self.random_state)
            .split(n_samples)?;

        let max_train = splits
            .iter()
            .map(|s| s.train_indices.len())
            .min()
            .unwrap_or(0);
        if max_train == 0 {
            return Err(PipelineError::InsufficientRows {
                rows: n_samples,
                required: self.config.n_folds,
            });
        }

        let mut points = Vec::new();

        for size in self.checkpoints(max_train) {
            let mut train_scores = Vec::with_capacity(splits.len());
            let mut validation_scores = Vec::with_capacity(splits.len());

            for split in &splits {
                let train_idx = &split.train_indices[..size];
                let x_train = data.features.select_rows(train_idx);
                let y_train = data.labels.select_rows(train_idx);
                let x_val = data.features.select_rows(&split.test_indices);
                let y_val = data.labels.select_rows(&split.test_indices);

                let scored = UntrainedModel::new(algorithm)
                    .fit(&x_train, &y_train)
                    .and_then(|model| {
                        let train_pred = model.predict(&x_train)?;
                        let val_pred = model.predict(&x_val)?;
                        Ok((
                            accuracy(y_train.codes(), &train_pred),
                            accuracy(y_val.codes(), &val_pred),
                        ))
                    });

                match scored {
                    Ok((train_acc, val_acc)) => {
                        train_scores.push(train_acc);
                        validation_scores.push(val_acc);
                    }
                    Err(e) => {
                        warn!(
                            train_size = size,
                            fold = split.fold_idx,
                            error = %e,
                            "Skipping learning-curve fit"
                        );
                    }
                }
            }

            if let (Some(train), Some(validation)) = (
                CVResults::from_scores(train_scores),
                CVResults::from_scores(validation_scores),
            ) {
                debug!(
                    train_size = size,
                    train_mean = train.mean_score,
                    validation_mean = validation.mean_score,
                    "Learning-curve checkpoint"
                );
                points.push(CurvePoint {
                    train_size: size,
                    train,
                    validation,
                });
            }
        }

        if points.is_empty() {
            return Err(PipelineError::ComputationError(
                "no learning-curve checkpoint could be fitted".to_string(),
            ));
        }

        Ok(LearningCurve {
            algorithm,
            n_folds: self.config.n_folds,
            n_repeats: self.config.n_repeats,
            points,
        })
    }
}

// ─── Rendering ─────────────────────────────────────────────────────────────────

const SVG_WIDTH: f64 = 640.0;
const SVG_HEIGHT: f64 = 420.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const TRAIN_COLOR: &str = "#1f77b4";
const VALIDATION_COLOR: &str = "#ff7f0e";

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl LearningCurve {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render as a standalone SVG document: mean lines with ±1 std bands
    pub fn render_svg(&self) -> String {
        let plot_w = SVG_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = SVG_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let x_max = self
            .points
            .iter()
            .map(|p| p.train_size)
            .max()
            .unwrap_or(1)
            .max(1) as f64;

        let sx = |size: usize| MARGIN_LEFT + plot_w * size as f64 / x_max;
        let sy = |score: f64| MARGIN_TOP + plot_h * (1.0 - score.clamp(0.0, 1.0));

        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\" font-size=\"12\">\n",
            w = SVG_WIDTH,
            h = SVG_HEIGHT
        ));
        svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"28\" text-anchor=\"middle\" font-size=\"15\">Learning Curve for {}</text>\n",
            SVG_WIDTH / 2.0,
            escape_xml(self.algorithm.name())
        ));

        // grid and y ticks
        for tick in 0..=5 {
            let score = tick as f64 / 5.0;
            let y = sy(score);
            svg.push_str(&format!(
                "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#e0e0e0\"/>\n",
                MARGIN_LEFT,
                y,
                MARGIN_LEFT + plot_w,
                y
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{:.1}</text>\n",
                MARGIN_LEFT - 8.0,
                y + 4.0,
                score
            ));
        }

        for point in &self.points {
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
                sx(point.train_size),
                MARGIN_TOP + plot_h + 18.0,
                point.train_size
            ));
        }

        // axes
        svg.push_str(&format!(
            "<path d=\"M{:.1},{:.1} V{:.1} H{:.1}\" fill=\"none\" stroke=\"black\"/>\n",
            MARGIN_LEFT,
            MARGIN_TOP,
            MARGIN_TOP + plot_h,
            MARGIN_LEFT + plot_w
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">Number of samples in the training set</text>\n",
            MARGIN_LEFT + plot_w / 2.0,
            SVG_HEIGHT - 16.0
        ));
        svg.push_str(&format!(
            "<text x=\"18\" y=\"{:.1}\" text-anchor=\"middle\" transform=\"rotate(-90 18 {:.1})\">Accuracy</text>\n",
            MARGIN_TOP + plot_h / 2.0,
            MARGIN_TOP + plot_h / 2.0
        ));

        let series: [(&str, &str, fn(&CurvePoint) -> &CVResults); 2] = [
            ("Train", TRAIN_COLOR, CurvePoint::train_scores),
            ("Test", VALIDATION_COLOR, CurvePoint::validation_scores),
        ];

        for (idx, (label, color, pick)) in series.iter().enumerate() {
            let upper: Vec<String> = self
                .points
                .iter()
                .map(|p| {
                    let r = pick(p);
                    format!("{:.1},{:.1}", sx(p.train_size), sy(r.mean_score + r.std_score))
                })
                .collect();
            let lower: Vec<String> = self
                .points
                .iter()
                .rev()
                .map(|p| {
                    let r = pick(p);
                    format!("{:.1},{:.1}", sx(p.train_size), sy(r.mean_score - r.std_score))
                })
                .collect();
            svg.push_str(&format!(
                "<polygon points=\"{} {}\" fill=\"{}\" fill-opacity=\"0.2\" stroke=\"none\"/>\n",
                upper.join(" "),
                lower.join(" "),
                color
            ));

            let line: Vec<String> = self
                .points
                .iter()
                .map(|p| format!("{:.1},{:.1}", sx(p.train_size), sy(pick(p).mean_score)))
                .collect();
            svg.push_str(&format!(
                "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>\n",
                line.join(" "),
                color
            ));
            for p in &self.points {
                svg.push_str(&format!(
                    "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"{}\"/>\n",
                    sx(p.train_size),
                    sy(pick(p).mean_score),
                    color
                ));
            }

            let legend_y = MARGIN_TOP + plot_h - 40.0 + idx as f64 * 18.0;
            let legend_x = MARGIN_LEFT + plot_w - 90.0;
            svg.push_str(&format!(
                "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"2\"/>\n",
                legend_x,
                legend_y,
                legend_x + 20.0,
                legend_y,
                color
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\">{}</text>\n",
                legend_x + 26.0,
                legend_y + 4.0,
                label
            ));
        }

        svg.push_str("</svg>\n");
        svg
    }
}
