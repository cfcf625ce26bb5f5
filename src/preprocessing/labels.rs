//! Target column handling: class labels, codes and classification mode

use crate::error::{PipelineError, Result};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use super::encoder::ColumnType;

/// A distinct value of the target column.
///
/// Numbers order numerically and text orders lexicographically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Number(f64),
    Text(String),
}

impl PartialEq for ClassLabel {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ClassLabel {}

impl PartialOrd for ClassLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ClassLabel::Number(a), ClassLabel::Number(b)) => a.total_cmp(b),
            (ClassLabel::Text(a), ClassLabel::Text(b)) => a.cmp(b),
            (ClassLabel::Number(_), ClassLabel::Text(_)) => Ordering::Less,
            (ClassLabel::Text(_), ClassLabel::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{}", *v as i64)
            }
            ClassLabel::Number(v) => write!(f, "{}", v),
            ClassLabel::Text(s) => f.write_str(s),
        }
    }
}

/// Averaging mode for precision and F1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ClassificationMode {
    /// Two or fewer classes; `positive` is the class code scored as positive
    Binary { positive: usize },
    /// More than two classes, micro-averaged
    Multiclass,
}

impl ClassificationMode {
    pub fn is_binary(&self) -> bool {
        matches!(self, ClassificationMode::Binary { .. })
    }
}

/// Target values as class codes.
///
/// `codes[i]` indexes into `classes`, which is sorted ascending, so code
/// order is label order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelVector {
    classes: Vec<ClassLabel>,
    codes: Array1<f64>,
}

impl LabelVector {
    /// Build from raw labels
    pub fn from_labels(labels: Vec<ClassLabel>) -> Self {
        let classes: Vec<ClassLabel> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let codes = labels
            .iter()
            .map(|label| {
                // every label is in `classes` by construction
                classes.binary_search(label).unwrap_or(0) as f64
            })
            .collect::<Array1<f64>>();

        Self { classes, codes }
    }

    /// Extract labels from a target column
    pub fn from_column(column: &Column) -> Result<Self> {
        let series = column.as_materialized_series();

        let labels: Vec<ClassLabel> = match (ColumnType::of(series.dtype()), series.dtype()) {
            (_, DataType::Boolean) | (ColumnType::Categorical, _) => series
                .cast(&DataType::String)?
                .str()?
                .into_iter()
                .map(|v| v.map(|s| ClassLabel::Text(s.to_string())))
                .collect::<Option<Vec<_>>>(),
            (ColumnType::Numeric, _) => series
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|v| v.map(ClassLabel::Number))
                .collect::<Option<Vec<_>>>(),
        }
        .ok_or_else(|| {
            PipelineError::UnreadableInput(format!(
                "target column '{}' has missing values",
                column.name()
            ))
        })?;

        Ok(Self::from_labels(labels))
    }

    pub fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    pub fn codes(&self) -> &Array1<f64> {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Label for a class code
    pub fn label(&self, code: usize) -> Option<&ClassLabel> {
        self.classes.get(code)
    }

    /// Binary when there are at most two classes. The greater label is positive.
    pub fn mode(&self) -> ClassificationMode {
        if self.classes.len() <= 2 {
            ClassificationMode::Binary {
                positive: self.classes.len().saturating_sub(1),
            }
        } else {
            ClassificationMode::Multiclass
        }
    }

    /// Copy out the given rows; the class list is kept whole
    pub fn select_rows(&self, indices: &[usize]) -> LabelVector {
        LabelVector {
            classes: self.classes.clone(),
            codes: indices.iter().map(|&i| self.codes[i]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_labels_order_numerically() {
        let column = Column::new("y".into(), [10i64, 2, 10, 7]);
        let labels = LabelVector::from_column(&column).unwrap();

        assert_eq!(
            labels.classes(),
            &[ClassLabel::Number(2.0), ClassLabel::Number(7.0), ClassLabel::Number(10.0)]
        );
        assert_eq!(labels.codes().to_vec(), vec![2.0, 0.0, 2.0, 1.0]);
        assert_eq!(labels.mode(), ClassificationMode::Multiclass);
    }

    #[test]
    fn test_text_labels_order_lexicographically() {
        let column = Column::new("y".into(), ["yes", "no", "no"]);
        let labels = LabelVector::from_column(&column).unwrap();

        assert_eq!(labels.label(0), Some(&ClassLabel::Text("no".to_string())));
        assert_eq!(labels.label(1), Some(&ClassLabel::Text("yes".to_string())));
        assert_eq!(labels.mode(), ClassificationMode::Binary { positive: 1 });
    }

    #[test]
    fn test_single_class_is_binary() {
        let labels = LabelVector::from_labels(vec![ClassLabel::Number(1.0); 3]);
        assert_eq!(labels.n_classes(), 1);
        assert_eq!(labels.mode(), ClassificationMode::Binary { positive: 0 });
    }

    #[test]
    fn test_select_rows_keeps_classes() {
        let labels = LabelVector::from_labels(vec![
            ClassLabel::Text("a".into()),
            ClassLabel::Text("b".into()),
            ClassLabel::Text("c".into()),
        ]);
        let subset = labels.select_rows(&[2]);
        assert_eq!(subset.len(), 1);
        assert_eq!(subset.n_classes(), 3);
        assert_eq!(subset.codes()[0], 2.0);
    }

    #[test]
    fn test_label_display() {
        assert_eq!(ClassLabel::Number(3.0).to_string(), "3");
        assert_eq!(ClassLabel::Number(0.5).to_string(), "0.5");
        assert_eq!(ClassLabel::Text("cat".into()).to_string(), "cat");
    }
}
