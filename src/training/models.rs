//! Evaluation reports

use crate::error::{PipelineError, Result};
use crate::preprocessing::{ClassLabel, ClassificationMode, LabelVector};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Scores for one partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Exact-match fraction
    pub accuracy: f64,
    /// Binary precision of the positive class, or micro-averaged
    pub precision: f64,
    /// Binary F1 of the positive class, or micro-averaged
    pub f1: f64,
    /// Rows are true labels, columns predicted labels, both in `labels` order
    pub confusion_matrix: Vec<Vec<usize>>,
    /// Axis labels of the confusion matrix, ascending
    pub labels: Vec<String>,
}

impl Report {
    /// Total number of scored rows
    pub fn n_samples(&self) -> usize {
        self.confusion_matrix.iter().flatten().sum()
    }
}

/// Train and test reports of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub train: Report,
    pub test: Report,
}

/// Builds a [`Report`] from true and predicted class codes
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    classes: Vec<ClassLabel>,
    mode: ClassificationMode,
}

impl ReportBuilder {
    pub fn new(classes: Vec<ClassLabel>, mode: ClassificationMode) -> Self {
        Self { classes, mode }
    }

    /// Builder for the classes and mode of a label vector
    pub fn for_labels(labels: &LabelVector) -> Self {
        Self::new(labels.classes().to_vec(), labels.mode())
    }

    pub fn mode(&self) -> ClassificationMode {
        self.mode
    }

    fn to_class_index(&self, code: f64, name: &str) -> Result<usize> {
        let idx = code.round();
        if !idx.is_finite() || idx < 0.0 || idx as usize >= self.classes.len() {
            return Err(PipelineError::invalid_parameter(
                name,
                code,
                format!("not a class code (have {} classes)", self.classes.len()),
            ));
        }
        Ok(idx as usize)
    }

    pub fn build(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Report> {
        if y_true.len() != y_pred.len() {
            return Err(PipelineError::invalid_parameter(
                "y_pred",
                format!("length {}", y_pred.len()),
                format!("expected {} predictions", y_true.len()),
            ));
        }
        if y_true.is_empty() {
            return Err(PipelineError::invalid_parameter(
                "y_true",
                "length 0",
                "cannot score an empty partition",
            ));
        }

        let truth = y_true
            .iter()
            .map(|&c| self.to_class_index(c, "y_true"))
            .collect::<Result<Vec<_>>>()?;
        let predicted = y_pred
            .iter()
            .map(|&c| self.to_class_index(c, "y_pred"))
            .collect::<Result<Vec<_>>>()?;

        let n = truth.len() as f64;
        let correct = truth.iter().zip(&predicted).filter(|(t, p)| t == p).count();
        let accuracy = correct as f64 / n;

        let (tp, fp, fn_) = match self.mode {
            ClassificationMode::Binary { positive } => {
                let mut counts = (0usize, 0usize, 0usize);
                for (&t, &p) in truth.iter().zip(&predicted) {
                    match (t == positive, p == positive) {
                        (true, true) => counts.0 += 1,
                        (false, true) => counts.1 += 1,
                        (true, false) => counts.2 += 1,
                        (false, false) => {}
                    }
                }
                counts
            }
            // pooled over classes: every miss is one FP and one FN
            ClassificationMode::Multiclass => {
                let misses = truth.len() - correct;
                (correct, misses, misses)
            }
        };

        let precision = ratio(tp, tp + fp);
        let f1 = ratio(2 * tp, 2 * tp + fp + fn_);

        let observed: Vec<usize> = truth
            .iter()
            .chain(&predicted)
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let position = |class: usize| observed.binary_search(&class).unwrap_or(0);

        let mut confusion_matrix = vec![vec![0usize; observed.len()]; observed.len()];
        for (&t, &p) in truth.iter().zip(&predicted) {
            confusion_matrix[position(t)][position(p)] += 1;
        }

        Ok(Report {
            accuracy,
            precision,
            f1,
            confusion_matrix,
            labels: observed.iter().map(|&c| self.classes[c].to_string()).collect(),
        })
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
