//! Decision tree classifier (CART)

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with predicted class code
    Leaf { value: f64, n_samples: usize },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Nodes smaller than this become leaves
const MIN_SAMPLES_SPLIT: usize = 2;

type ClassCounts = BTreeMap<i64, usize>;

fn class_counts<'a>(labels: impl Iterator<Item = &'a f64>) -> ClassCounts {
    let mut counts = ClassCounts::new();
    for &val in labels {
        *counts.entry(val.round() as i64).or_insert(0) += 1;
    }
    counts
}

fn gini(counts: &ClassCounts, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts.values().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

/// Unbounded Gini decision tree over class codes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
}

impl DecisionTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(PipelineError::invalid_parameter(
                "y",
                format!("length {}", y.len()),
                format!("expected one label per row ({} rows)", n_samples),
            ));
        }
        if n_samples == 0 {
            return Err(PipelineError::InsufficientRows { rows: 0, required: 1 });
        }

        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(Self::build_tree(x, y, &indices));

        Ok(self)
    }

    fn build_tree(x: &Array2<f64>, y: &Array1<f64>, indices: &[usize]) -> TreeNode {
        let n_samples = indices.len();
        let counts = class_counts(indices.iter().map(|&i| &y[i]));

        if n_samples < MIN_SAMPLES_SPLIT || counts.len() <= 1 {
            return TreeNode::Leaf {
                value: Self::majority_class(&counts),
                n_samples,
            };
        }

        let Some((feature_idx, threshold)) = Self::find_best_split(x, y, indices, &counts) else {
            return TreeNode::Leaf {
                value: Self::majority_class(&counts),
                n_samples,
            };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature_idx]] <= threshold);

        let left = Box::new(Self::build_tree(x, y, &left_indices));
        let right = Box::new(Self::build_tree(x, y, &right_indices));

        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            n_samples,
            impurity: gini(&counts, n_samples),
        }
    }

    /// Best (feature, threshold) over midpoints between distinct values
    fn find_best_split(
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        parent_counts: &ClassCounts,
    ) -> Option<(usize, f64)> {
        let n = indices.len();
        let parent_impurity = gini(parent_counts, n);
        let mut best: Option<(usize, f64, f64)> = None;

        for feature_idx in 0..x.ncols() {
            let mut sorted: Vec<(f64, f64)> =
                indices.iter().map(|&i| (x[[i, feature_idx]], y[i])).collect();
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            // sweep left to right, moving one sample at a time
            let mut left = ClassCounts::new();
            let mut right = parent_counts.clone();

            for pos in 0..n - 1 {
                let class = sorted[pos].1.round() as i64;
                *left.entry(class).or_insert(0) += 1;
                if let Some(c) = right.get_mut(&class) {
                    *c -= 1;
                    if *c == 0 {
                        right.remove(&class);
                    }
                }

                let (value, next) = (sorted[pos].0, sorted[pos + 1].0);
                if value == next {
                    continue;
                }

                let left_count = pos + 1;
                let right_count = n - left_count;
                let weighted = (left_count as f64 * gini(&left, left_count)
                    + right_count as f64 * gini(&right, right_count))
                    / n as f64;
                let gain = parent_impurity - weighted;

                if gain > best.map_or(1e-12, |b| b.2) {
                    best = Some((feature_idx, (value + next) / 2.0, gain));
                }
            }
        }

        best.map(|(feature_idx, threshold, _)| (feature_idx, threshold))
    }

    /// Most frequent class; ties go to the smaller code
    fn majority_class(counts: &ClassCounts) -> f64 {
        counts
            .iter()
            .fold(None::<(i64, usize)>, |best, (&class, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((class, count)),
            })
            .map(|(class, _)| class as f64)
            .unwrap_or(0.0)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or_else(|| {
            PipelineError::ComputationError("decision tree used before fit".to_string())
        })?;

        Ok(x.rows()
            .into_iter()
            .map(|row| Self::predict_sample(root, row))
            .collect())
    }

    fn predict_sample(node: &TreeNode, sample: ArrayView1<f64>) -> f64 {
        match node {
            TreeNode::Leaf { value, .. } => *value,
            TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                if sample[*feature_idx] <= *threshold {
                    Self::predict_sample(left, sample)
                } else {
                    Self::predict_sample(right, sample)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// (depth, leaves) with a lone leaf counting as depth 1
    fn shape(node: &TreeNode) -> (usize, usize) {
        match node {
            TreeNode::Leaf { .. } => (1, 1),
            TreeNode::Split { left, right, .. } => {
                let (ld, ll) = shape(left);
                let (rd, rl) = shape(right);
                (1 + ld.max(rd), ll + rl)
            }
        }
    }

    #[test]
    fn test_classifier_simple() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.predict(&x).unwrap(), y);
        let root = tree.root.as_ref().unwrap();
        assert_eq!(shape(root), (2, 2));
        assert!(matches!(root, TreeNode::Split { feature_idx: 0, threshold, .. } if *threshold == 0.5));
    }

    #[test]
    fn test_multiclass_fits_training_data() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = array![0.0, 0.0, 1.0, 1.0, 2.0, 2.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_grows_until_leaves_are_pure() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![0.0, 1.0, 0.0, 1.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.predict(&x).unwrap(), y);
        // splits at 1.5, then 2.5, then 3.5 down the right branch
        assert_eq!(shape(tree.root.as_ref().unwrap()), (4, 4));
    }

    #[test]
    fn test_single_sample() {
        let x = array![[3.0, 1.0]];
        let y = array![2.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();
        assert_eq!(shape(tree.root.as_ref().unwrap()), (1, 1));
        assert_eq!(tree.predict(&array![[0.0, 0.0]]).unwrap(), array![2.0]);
    }

    #[test]
    fn test_predict_before_fit() {
        let tree = DecisionTree::new();
        assert!(matches!(
            tree.predict(&array![[1.0]]),
            Err(PipelineError::ComputationError(_))
        ));
    }

    #[test]
    fn test_majority_tie_prefers_smaller_class() {
        let counts: ClassCounts = [(1, 2), (0, 2)].into_iter().collect();
        assert_eq!(DecisionTree::majority_class(&counts), 0.0);
    }
}
