//! CART trees grown on squared error.
//!
//! On 0/1 targets the squared-error criterion ranks splits exactly like Gini
//! impurity (variance is half the Gini index), and a leaf's mean is the
//! fraction of positives in it. One tree type therefore serves the decision
//! tree, the forest and the boosting stages.

use super::{check_fit_input, check_predict_input, not_fitted, Classifier};
use crate::error::{Result, SamplerError};
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const MIN_IMPURITY: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features drawn per split; all of them when `None`
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    n_features: usize,
}

impl RegressionTree {
    /// Grows a tree on the rows of `x` listed in `samples` (repeats allowed).
    /// `rng` decides the feature order, which breaks ties between equal splits.
    pub fn fit(
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        samples: &[usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Result<Self> {
        if samples.is_empty() {
            return Err(SamplerError::model("cannot grow a tree on zero samples"));
        }
        let mut tree = RegressionTree {
            nodes: Vec::new(),
            n_features: x.ncols(),
        };
        tree.grow(&x, &y, samples.to_vec(), 0, params, rng);
        Ok(tree)
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    fn grow(
        &mut self,
        x: &ArrayView2<f64>,
        y: &ArrayView1<f64>,
        samples: Vec<usize>,
        depth: usize,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> usize {
        let n = samples.len() as f64;
        let sum: f64 = samples.iter().map(|&i| y[i]).sum();
        let sum_sq: f64 = samples.iter().map(|&i| y[i] * y[i]).sum();
        let impurity = sum_sq - sum * sum / n;

        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { value: sum / n });

        let at_max_depth = params.max_depth.map_or(false, |d| depth >= d);
        if at_max_depth
            || samples.len() < params.min_samples_split
            || samples.len() < 2 * params.min_samples_leaf
            || impurity <= MIN_IMPURITY
        {
            return id;
        }

        let split = match best_split(x, y, &samples, (sum, sum_sq, impurity), params, rng) {
            Some(split) => split,
            None => return id,
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| x[[i, split.feature]] <= split.threshold);
        let left = self.grow(x, y, left, depth + 1, params, rng);
        let right = self.grow(x, y, right, depth + 1, params, rng);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    /// Index of the leaf `row` falls into
    pub fn leaf_index(&self, row: ArrayView1<f64>) -> usize {
        let mut id = 0;
        while let Node::Split {
            feature,
            threshold,
            left,
            right,
        } = self.nodes[id]
        {
            id = if row[feature] <= threshold { left } else { right };
        }
        id
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        match self.nodes[self.leaf_index(row)] {
            Node::Leaf { value } => value,
            Node::Split { .. } => unreachable!("leaf_index always stops on a leaf"),
        }
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Array1<f64> {
        x.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }

    /// Overwrites the value of a leaf; split nodes are left untouched
    pub fn set_leaf_value(&mut self, id: usize, value: f64) {
        if let Some(Node::Leaf { value: v }) = self.nodes.get_mut(id) {
            *v = value;
        }
    }
}

fn best_split(
    x: &ArrayView2<f64>,
    y: &ArrayView1<f64>,
    samples: &[usize],
    (total_sum, total_sq, parent_impurity): (f64, f64, f64),
    params: &TreeParams,
    rng: &mut StdRng,
) -> Option<BestSplit> {
    let mut features: Vec<usize> = (0..x.ncols()).collect();
    features.shuffle(rng);
    let k = params
        .max_features
        .map_or(features.len(), |m| m.clamp(1, features.len()));

    let n = samples.len();
    let mut order = samples.to_vec();
    let mut best: Option<BestSplit> = None;

    for &feature in &features[..k] {
        order.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for pos in 0..n - 1 {
            let i = order[pos];
            left_sum += y[i];
            left_sq += y[i] * y[i];

            let left_n = pos + 1;
            let right_n = n - left_n;
            if left_n < params.min_samples_leaf || right_n < params.min_samples_leaf {
                continue;
            }
            let here = x[[i, feature]];
            let next = x[[order[pos + 1], feature]];
            if next <= here {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let impurity = (left_sq - left_sum * left_sum / left_n as f64)
                + (right_sq - right_sum * right_sum / right_n as f64);

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                let mut threshold = here + (next - here) / 2.0;
                if threshold >= next {
                    threshold = here;
                }
                best = Some(BestSplit {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }
    }

    best.filter(|b| parent_impurity - b.impurity > MIN_IMPURITY)
}

/// Fully grown classification tree, seeded like `random_state=0`
#[derive(Debug, Clone)]
pub struct DecisionTreeClassifier {
    seed: u64,
    params: TreeParams,
    tree: Option<RegressionTree>,
}

impl DecisionTreeClassifier {
    pub fn new(seed: u64) -> Self {
        DecisionTreeClassifier {
            seed,
            params: TreeParams::default(),
            tree: None,
        }
    }

    pub fn with_params(mut self, params: TreeParams) -> Self {
        self.params = params;
        self
    }

    /// Fraction of positives in the leaf of every row
    pub fn predict_proba(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        let tree = self.tree.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        check_predict_input(self.name(), &x, tree.n_features())?;
        Ok(tree.predict(x))
    }
}

impl Classifier for DecisionTreeClassifier {
    fn name(&self) -> &'static str {
        "DecisionTreeClassifier"
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        check_fit_input(self.name(), &x, &y)?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let samples: Vec<usize> = (0..x.nrows()).collect();
        self.tree = Some(RegressionTree::fit(x, y, &samples, &self.params, &mut rng)?);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .predict_proba(x)?
            .mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }
}
