use super::{check_fit_input, check_predict_input, not_fitted, Classifier};
use crate::error::Result;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use statrs::statistics::Statistics;
use std::f64::consts::PI;

/// Classes present in `y`, ascending, with the row indices of each
fn class_rows(y: &ArrayView1<f64>) -> Vec<(f64, Vec<usize>)> {
    [0.0, 1.0]
        .iter()
        .map(|&class| {
            let rows: Vec<usize> = y
                .iter()
                .enumerate()
                .filter(|&(_, &t)| t == class)
                .map(|(i, _)| i)
                .collect();
            (class, rows)
        })
        .filter(|(_, rows)| !rows.is_empty())
        .collect()
}

/// Picks the class with the highest joint log-likelihood; the lower class wins ties
fn argmax_classes(classes: &[f64], jll: &Array2<f64>) -> Array1<f64> {
    jll.map_axis(Axis(1), |row| {
        let mut best = 0;
        for (k, &v) in row.iter().enumerate() {
            if v > row[best] {
                best = k;
            }
        }
        classes[best]
    })
}

#[derive(Debug, Clone)]
struct BernoulliFit {
    classes: Vec<f64>,
    log_prior: Vec<f64>,
    /// classes × features, log P(x_j = 1 | class)
    log_prob: Array2<f64>,
    /// classes × features, log P(x_j = 0 | class)
    log_neg_prob: Array2<f64>,
}

/// Naive Bayes over binarised features (`x > threshold`), Laplace smoothed
#[derive(Debug, Clone)]
pub struct BernoulliNb {
    alpha: f64,
    binarize: f64,
    fit: Option<BernoulliFit>,
}

impl Default for BernoulliNb {
    fn default() -> Self {
        BernoulliNb {
            alpha: 1.0,
            binarize: 0.0,
            fit: None,
        }
    }
}

impl Classifier for BernoulliNb {
    fn name(&self) -> &'static str {
        "BernoulliNB"
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        check_fit_input(self.name(), &x, &y)?;
        let binary = x.mapv(|v| if v > self.binarize { 1.0 } else { 0.0 });
        let groups = class_rows(&y);
        let n = y.len() as f64;

        let mut log_prob = Array2::<f64>::zeros((groups.len(), x.ncols()));
        let mut log_prior = Vec::with_capacity(groups.len());
        for (k, (_, rows)) in groups.iter().enumerate() {
            let count = rows.len() as f64;
            let ones = binary.select(Axis(0), rows).sum_axis(Axis(0));
            log_prob
                .row_mut(k)
                .assign(&ones.mapv(|c| ((c + self.alpha) / (count + 2.0 * self.alpha)).ln()));
            log_prior.push((count / n).ln());
        }
        let log_neg_prob = log_prob.mapv(|lp: f64| (-lp.exp()).ln_1p());

        self.fit = Some(BernoulliFit {
            classes: groups.iter().map(|(c, _)| *c).collect(),
            log_prior,
            log_prob,
            log_neg_prob,
        });
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        let fit = self.fit.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        check_predict_input(self.name(), &x, fit.log_prob.ncols())?;
        let binary = x.mapv(|v| if v > self.binarize { 1.0 } else { 0.0 });

        // x.log(p) + (1 - x).log(1 - p) summed over features
        let mut jll = binary.dot(&(&fit.log_prob - &fit.log_neg_prob).t());
        jll += &fit.log_neg_prob.sum_axis(Axis(1));
        jll += &Array1::from(fit.log_prior.clone());
        Ok(argmax_classes(&fit.classes, &jll))
    }
}

#[derive(Debug, Clone)]
struct GaussianFit {
    classes: Vec<f64>,
    log_prior: Vec<f64>,
    /// classes × features
    means: Array2<f64>,
    variances: Array2<f64>,
}

/// Naive Bayes with per-class Gaussian features.
/// Every variance is widened by `var_smoothing` times the largest feature variance.
#[derive(Debug, Clone)]
pub struct GaussianNb {
    var_smoothing: f64,
    fit: Option<GaussianFit>,
}

impl Default for GaussianNb {
    fn default() -> Self {
        GaussianNb {
            var_smoothing: 1e-9,
            fit: None,
        }
    }
}

impl Classifier for GaussianNb {
    fn name(&self) -> &'static str {
        "GaussianNB"
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        check_fit_input(self.name(), &x, &y)?;
        let max_var = x
            .columns()
            .into_iter()
            .map(|c| c.iter().population_variance())
            .fold(0.0, f64::max);
        let epsilon = if max_var > 0.0 {
            self.var_smoothing * max_var
        } else {
            self.var_smoothing
        };

        let groups = class_rows(&y);
        let n = y.len() as f64;
        let mut means = Array2::<f64>::zeros((groups.len(), x.ncols()));
        let mut variances = Array2::<f64>::zeros((groups.len(), x.ncols()));
        let mut log_prior = Vec::with_capacity(groups.len());
        for (k, (_, rows)) in groups.iter().enumerate() {
            let subset = x.select(Axis(0), rows);
            for (j, column) in subset.columns().into_iter().enumerate() {
                means[[k, j]] = column.iter().mean();
                variances[[k, j]] = column.iter().population_variance() + epsilon;
            }
            log_prior.push((rows.len() as f64 / n).ln());
        }

        self.fit = Some(GaussianFit {
            classes: groups.iter().map(|(c, _)| *c).collect(),
            log_prior,
            means,
            variances,
        });
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        let fit = self.fit.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        check_predict_input(self.name(), &x, fit.means.ncols())?;

        let jll = Array2::from_shape_fn((x.nrows(), fit.classes.len()), |(i, k)| {
            let mut ll = fit.log_prior[k];
            for j in 0..x.ncols() {
                let var = fit.variances[[k, j]];
                let diff = x[[i, j]] - fit.means[[k, j]];
                ll -= 0.5 * (2.0 * PI * var).ln() + diff * diff / (2.0 * var);
            }
            ll
        });
        Ok(argmax_classes(&fit.classes, &jll))
    }
}
