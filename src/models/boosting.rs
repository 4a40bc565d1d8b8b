use super::tree::{RegressionTree, TreeParams};
use super::{check_fit_input, check_predict_input, not_fitted, require_both_classes, sigmoid, Classifier};
use crate::error::Result;
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

/// Gradient boosting on binomial deviance with depth-limited regression trees.
///
/// Each stage fits a tree to the residuals `y - p`, then replaces every leaf
/// value with the one-step Newton estimate `sum(r) / sum(p * (1 - p))`.
#[derive(Debug, Clone)]
pub struct GradientBoostingClassifier {
    n_estimators: usize,
    learning_rate: f64,
    max_depth: usize,
    seed: u64,
    init: f64,
    stages: Vec<RegressionTree>,
    n_features: usize,
}

impl GradientBoostingClassifier {
    pub fn new(seed: u64) -> Self {
        GradientBoostingClassifier {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            seed,
            init: 0.0,
            stages: Vec::new(),
            n_features: 0,
        }
    }

    pub fn with_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators.max(1);
        self
    }

    /// Raw additive score (log-odds) of every row
    pub fn decision_function(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        if self.stages.is_empty() {
            return Err(not_fitted(self.name()));
        }
        check_predict_input(self.name(), &x, self.n_features)?;
        let mut raw = Array1::from_elem(x.nrows(), self.init);
        for stage in &self.stages {
            raw.scaled_add(self.learning_rate, &stage.predict(x));
        }
        Ok(raw)
    }
}

impl Classifier for GradientBoostingClassifier {
    fn name(&self) -> &'static str {
        "GradientBoostingClassifier"
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        check_fit_input(self.name(), &x, &y)?;
        require_both_classes(self.name(), &y)?;

        let n = x.nrows();
        let prior = y.sum() / n as f64;
        self.init = (prior / (1.0 - prior)).ln();

        let params = TreeParams {
            max_depth: Some(self.max_depth),
            ..TreeParams::default()
        };
        let samples: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut raw = Array1::from_elem(n, self.init);
        let mut stages = Vec::with_capacity(self.n_estimators);

        for _ in 0..self.n_estimators {
            let proba = raw.mapv(sigmoid);
            let residual = &y - &proba;
            let mut tree = RegressionTree::fit(x, residual.view(), &samples, &params, &mut rng)?;

            let leaves: Vec<usize> = x.rows().into_iter().map(|row| tree.leaf_index(row)).collect();
            let mut sums = HashMap::<usize, (f64, f64)>::new();
            for (i, &leaf) in leaves.iter().enumerate() {
                let entry = sums.entry(leaf).or_insert((0.0, 0.0));
                entry.0 += residual[i];
                entry.1 += proba[i] * (1.0 - proba[i]);
            }
            for (&leaf, &(num, den)) in &sums {
                let value = if den.abs() < 1e-150 { 0.0 } else { num / den };
                tree.set_leaf_value(leaf, value);
            }

            for (i, row) in x.rows().into_iter().enumerate() {
                raw[i] += self.learning_rate * tree.predict_row(row);
            }
            stages.push(tree);
        }

        self.stages = stages;
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .decision_function(x)?
            .mapv(|f| if f > 0.0 { 1.0 } else { 0.0 }))
    }
}
