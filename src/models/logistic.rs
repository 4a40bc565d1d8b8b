use super::{check_fit_input, check_predict_input, not_fitted, require_both_classes, Classifier};
use crate::error::{Result, SamplerError};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};

/// L2-regularised logistic regression trained by Newton's method.
///
/// Minimises `0.5 * |w|^2 + C * sum(log(1 + exp(-y_i * w.x_i)))` with
/// `y` in {-1, 1} and a constant 1 appended to every row, so the intercept
/// is penalised together with the weights.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    c: f64,
    tol: f64,
    max_iter: usize,
    weights: Option<Array1<f64>>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        LogisticRegression {
            c: 1.0,
            tol: 1e-4,
            max_iter: 100,
            weights: None,
        }
    }
}

/// log(1 + exp(-m)) without overflow
fn log_loss_margin(m: f64) -> f64 {
    if m > 0.0 {
        (-m).exp().ln_1p()
    } else {
        -m + m.exp().ln_1p()
    }
}

fn augment(x: &ArrayView2<f64>) -> Array2<f64> {
    let mut out = Array2::ones((x.nrows(), x.ncols() + 1));
    out.slice_mut(s![.., ..x.ncols()]).assign(x);
    out
}

/// Solves `a * x = b` by Gaussian elimination with partial pivoting
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);
        if a[[pivot, col]].abs() < 1e-300 {
            return Err(SamplerError::model("singular Hessian in logistic regression"));
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }
        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Ok(x)
}

impl LogisticRegression {
    pub fn new(c: f64) -> Self {
        LogisticRegression {
            c,
            ..LogisticRegression::default()
        }
    }

    fn objective(&self, xa: &Array2<f64>, signs: &Array1<f64>, w: &Array1<f64>) -> f64 {
        let margins = xa.dot(w) * signs;
        0.5 * w.dot(w) + self.c * margins.iter().map(|&m| log_loss_margin(m)).sum::<f64>()
    }

    /// Raw score `w.x + b` of every row
    pub fn decision_function(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        let w = self.weights.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        check_predict_input(self.name(), &x, w.len() - 1)?;
        Ok(augment(&x).dot(w))
    }

    /// Fitted weights, intercept last
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &'static str {
        "LogisticRegression"
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        check_fit_input(self.name(), &x, &y)?;
        require_both_classes(self.name(), &y)?;

        let xa = augment(&x);
        let signs = y.mapv(|t| if t == 1.0 { 1.0 } else { -1.0 });
        let dim = xa.ncols();
        let mut w = Array1::<f64>::zeros(dim);
        let mut initial_norm = None;

        for _ in 0..self.max_iter {
            let margins = xa.dot(&w) * &signs;
            // sigma(m) for each sample margin
            let sig = margins.mapv(super::sigmoid);

            let coef = (&sig - 1.0) * &signs * self.c;
            let grad = &w + &xa.t().dot(&coef);
            let grad_norm = grad.dot(&grad).sqrt();
            let reference = *initial_norm.get_or_insert(grad_norm.max(1.0));
            if grad_norm <= self.tol * reference {
                break;
            }

            let curvature = (&sig * &(1.0 - &sig)) * self.c;
            let weighted = &xa * &curvature.view().insert_axis(Axis(1));
            let mut hessian = xa.t().dot(&weighted);
            for i in 0..dim {
                hessian[[i, i]] += 1.0;
            }
            let direction = solve(hessian, grad.clone())?;

            let current = self.objective(&xa, &signs, &w);
            let slope = grad.dot(&direction);
            let mut step = 1.0;
            let mut next = &w - &(&direction * step);
            for _ in 0..30 {
                if self.objective(&xa, &signs, &next) <= current - 1e-4 * step * slope {
                    break;
                }
                step *= 0.5;
                next = &w - &(&direction * step);
            }
            w = next;
        }

        self.weights = Some(w);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .decision_function(x)?
            .mapv(|f| if f > 0.0 { 1.0 } else { 0.0 }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_solve_small_system() {
        let a = array![[0.0, 2.0], [1.0, 1.0]];
        let b = array![4.0, 3.0];
        let x = solve(a, b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_log_loss_margin_is_stable() {
        assert!((log_loss_margin(0.0) - 2f64.ln()).abs() < 1e-12);
        assert!(log_loss_margin(800.0) >= 0.0);
        assert!((log_loss_margin(-800.0) - 800.0).abs() < 1e-9);
    }
}
