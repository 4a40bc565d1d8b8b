//! Binary classifiers compared on DNA shape features.
//!
//! Targets are `1.0` for positive samples and `0.0` for negatives; every
//! model predicts the same encoding.

pub mod boosting;
pub mod forest;
pub mod logistic;
pub mod metrics;
pub mod mlp;
pub mod naive_bayes;
pub mod tree;

use crate::error::{Result, SamplerError};
use ndarray::{Array1, ArrayView1, ArrayView2};

pub use boosting::GradientBoostingClassifier;
pub use forest::RandomForestClassifier;
pub use logistic::LogisticRegression;
pub use metrics::{ConfusionMatrix, Scores};
pub use mlp::MlpClassifier;
pub use naive_bayes::{BernoulliNb, GaussianNb};
pub use tree::DecisionTreeClassifier;

pub trait Classifier: Send {
    fn name(&self) -> &'static str;

    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()>;

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>>;
}

/// Checks shapes and that every target is 0 or 1
pub(crate) fn check_fit_input(name: &str, x: &ArrayView2<f64>, y: &ArrayView1<f64>) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(SamplerError::model(format!("{}: empty training matrix", name)));
    }
    if x.nrows() != y.len() {
        return Err(SamplerError::model(format!(
            "{}: {} samples but {} targets",
            name,
            x.nrows(),
            y.len()
        )));
    }
    if y.iter().any(|&t| t != 0.0 && t != 1.0) {
        return Err(SamplerError::model(format!("{}: targets must be 0 or 1", name)));
    }
    Ok(())
}

/// Fails unless both classes occur in `y`
pub(crate) fn require_both_classes(name: &str, y: &ArrayView1<f64>) -> Result<()> {
    let positives = y.iter().filter(|&&t| t == 1.0).count();
    if positives == 0 || positives == y.len() {
        return Err(SamplerError::model(format!(
            "{}: training targets contain a single class",
            name
        )));
    }
    Ok(())
}

/// Checks a prediction input against the fitted width
pub(crate) fn check_predict_input(name: &str, x: &ArrayView2<f64>, n_features: usize) -> Result<()> {
    if x.ncols() != n_features {
        return Err(SamplerError::model(format!(
            "{}: fitted on {} features, got {}",
            name,
            n_features,
            x.ncols()
        )));
    }
    Ok(())
}

pub(crate) fn not_fitted(name: &str) -> SamplerError {
    SamplerError::model(format!("{} is not fitted", name))
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
