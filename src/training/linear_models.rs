//! Linear model implementations

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Pivots smaller than this fraction of the original diagonal count as zero.
const PIVOT_TOLERANCE: f64 = 1e-10;

// Gradient descent settings for logistic regression
const L2_PENALTY: f64 = 0.01;
const MAX_ITER: usize = 1000;
const GRADIENT_TOLERANCE: f64 = 1e-6;
const LEARNING_RATE: f64 = 0.1;

/// Solve symmetric positive-definite system Ax = b using Cholesky decomposition.
/// Retries once with a small ridge if the matrix is near-singular.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    if let Some(x) = cholesky_solve_inner(a, b) {
        return Some(x);
    }

    // Not positive definite: add regularization and retry
    let mut a_reg = a.clone();
    let mean_diag = a.diag().iter().map(|v| v.abs()).sum::<f64>() / n.max(1) as f64;
    let ridge = 1e-6 * mean_diag.max(1e-12);
    for k in 0..n {
        a_reg[[k, k]] += ridge;
    }
    cholesky_solve_inner(&a_reg, b)
}

fn cholesky_solve_inner(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    // A = L * L^T
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= PIVOT_TOLERANCE * a[[i, i]].abs().max(f64::MIN_POSITIVE) {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}

/// Matrix inversion by Gauss-Jordan elimination (fallback)
fn matrix_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    // [M | I]
    let mut aug = Array2::<f64>::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }

        if max_row != col {
            for j in 0..2 * n {
                aug.swap([col, j], [max_row, j]);
            }
        }

        if aug[[col, col]].abs() < 1e-10 {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    Some(aug.slice(ndarray::s![.., n..]).to_owned())
}

/// Solve X^T X w = X^T y, Cholesky first, Gauss-Jordan second
fn solve_normal_equations(x: &Array2<f64>, y: &Array1<f64>) -> Option<Array1<f64>> {
    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);

    if let Some(result) = cholesky_solve(&xtx, &xty) {
        return Some(result);
    }

    matrix_inverse(&xtx).map(|inv| inv.dot(&xty))
}

fn check_lengths(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(PipelineError::invalid_parameter(
            "y",
            format!("length {}", y.len()),
            format!("expected one label per row ({} rows)", x.nrows()),
        ));
    }
    if x.nrows() == 0 {
        return Err(PipelineError::InsufficientRows { rows: 0, required: 1 });
    }
    Ok(())
}

/// Ordinary least squares with an intercept
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients (weights)
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept (bias)
    pub intercept: Option<f64>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_lengths(x, y)?;

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or(PipelineError::InsufficientRows { rows: 0, required: 1 })?;
        let y_mean = y.mean().unwrap_or(0.0);

        let x_centered = x - &x_mean.view().insert_axis(Axis(0));
        let y_centered = y - y_mean;

        let coefficients = solve_normal_equations(&x_centered, &y_centered).ok_or_else(|| {
            PipelineError::ComputationError("Matrix is singular, cannot solve least squares".to_string())
        })?;
        self.intercept = Some(y_mean - coefficients.dot(&x_mean));
        self.coefficients = Some(coefficients);

        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or_else(|| {
            PipelineError::ComputationError("linear regression used before fit".to_string())
        })?;
        Ok(x.dot(coefficients) + self.intercept.unwrap_or(0.0))
    }
}

/// One sigmoid unit
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BinaryLogit {
    weights: Array1<f64>,
    bias: f64,
}

/// Logistic regression trained by gradient descent.
///
/// Features are standardized internally. Two classes train one sigmoid
/// unit; more train one unit per class (one-vs-rest). If the training
/// labels hold a single class, that class is always predicted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogisticRegression {
    means: Option<Array1<f64>>,
    scales: Option<Array1<f64>>,
    /// Class codes seen during fit, ascending
    classes: Vec<f64>,
    units: Vec<BinaryLogit>,
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_fitted(&self) -> bool {
        !self.classes.is_empty()
    }

    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    fn standardize(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match (&self.means, &self.scales) {
            (Some(means), Some(scales)) => {
                Ok((x - &means.view().insert_axis(Axis(0))) / &scales.view().insert_axis(Axis(0)))
            }
            _ => Err(PipelineError::ComputationError(
                "logistic regression used before fit".to_string(),
            )),
        }
    }

    fn fit_unit(x: &Array2<f64>, y: &Array1<f64>) -> BinaryLogit {
        let n_samples = x.nrows() as f64;
        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;

        for _iter in 0..MAX_ITER {
            let predictions = Self::sigmoid(&(x.dot(&weights) + bias));

            let errors = &predictions - y;
            let dw = (x.t().dot(&errors) / n_samples) + (L2_PENALTY * &weights);
            let db = errors.mean().unwrap_or(0.0);

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < GRADIENT_TOLERANCE {
                break;
            }

            weights = weights - LEARNING_RATE * dw;
            bias -= LEARNING_RATE * db;
        }

        BinaryLogit { weights, bias }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_lengths(x, y)?;

        let means = x
            .mean_axis(Axis(0))
            .ok_or(PipelineError::InsufficientRows { rows: 0, required: 1 })?;
        let scales = x.std_axis(Axis(0), 0.0).mapv(|s| if s > 1e-12 { s } else { 1.0 });
        self.means = Some(means);
        self.scales = Some(scales);
        let x_std = self.standardize(x)?;

        let mut classes: Vec<f64> = y.iter().copied().collect();
        classes.sort_by(|a, b| a.total_cmp(b));
        classes.dedup();

        self.units = match classes.len() {
            1 => Vec::new(),
            2 => {
                let target = y.mapv(|v| if v == classes[1] { 1.0 } else { 0.0 });
                vec![Self::fit_unit(&x_std, &target)]
            }
            _ => classes
                .iter()
                .map(|&class| {
                    let target = y.mapv(|v| if v == class { 1.0 } else { 0.0 });
                    Self::fit_unit(&x_std, &target)
                })
                .collect(),
        };
        self.classes = classes;

        Ok(self)
    }

    /// Probability of each fitted class, one column per class code in ascending order
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted() {
            return Err(PipelineError::ComputationError(
                "logistic regression used before fit".to_string(),
            ));
        }
        let x_std = self.standardize(x)?;
        let n = x.nrows();

        let proba = match self.units.as_slice() {
            [] => Array2::ones((n, 1)),
            [unit] => {
                let p = Self::sigmoid(&(x_std.dot(&unit.weights) + unit.bias));
                let mut out = Array2::zeros((n, 2));
                out.column_mut(0).assign(&p.mapv(|v| 1.0 - v));
                out.column_mut(1).assign(&p);
                out
            }
            units => {
                let mut out = Array2::zeros((n, units.len()));
                for (k, unit) in units.iter().enumerate() {
                    let p = Self::sigmoid(&(x_std.dot(&unit.weights) + unit.bias));
                    out.column_mut(k).assign(&p);
                }
                // one-vs-rest scores normalized per row
                for mut row in out.rows_mut() {
                    let total = row.sum();
                    if total > 0.0 {
                        row /= total;
                    }
                }
                out
            }
        };

        Ok(proba)
    }

    /// Predict class codes
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;

        if self.units.len() == 1 {
            return Ok(proba
                .column(1)
                .mapv(|p| if p >= 0.5 { self.classes[1] } else { self.classes[0] }));
        }

        Ok(proba
            .rows()
            .into_iter()
            .map(|row| {
                let best = row
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1))
                    .map(|(k, _)| k)
                    .unwrap_or(0);
                self.classes[best]
            })
            .collect())
    }
}
