use super::tree::{RegressionTree, TreeParams};
use super::{check_fit_input, check_predict_input, not_fitted, Classifier};
use crate::error::Result;
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bagged ensemble of fully grown trees, each split drawing `sqrt(n_features)` candidates
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    n_estimators: usize,
    seed: u64,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForestClassifier {
    pub fn new(seed: u64) -> Self {
        RandomForestClassifier {
            n_estimators: 100,
            seed,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn with_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators.max(1);
        self
    }

    /// Mean positive-class probability over the trees
    pub fn predict_proba(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(not_fitted(self.name()));
        }
        check_predict_input(self.name(), &x, self.n_features)?;
        let mut proba = Array1::<f64>::zeros(x.nrows());
        for tree in &self.trees {
            proba += &tree.predict(x);
        }
        Ok(proba / self.trees.len() as f64)
    }
}

impl Classifier for RandomForestClassifier {
    fn name(&self) -> &'static str {
        "RandomForestClassifier"
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        check_fit_input(self.name(), &x, &y)?;
        let n = x.nrows();
        let params = TreeParams {
            max_features: Some(((x.ncols() as f64).sqrt() as usize).max(1)),
            ..TreeParams::default()
        };

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_estimators);
        for _ in 0..self.n_estimators {
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            trees.push(RegressionTree::fit(x, y, &bootstrap, &params, &mut rng)?);
        }
        self.trees = trees;
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .predict_proba(x)?
            .mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }
}
