use super::{check_fit_input, check_predict_input, not_fitted, sigmoid, Classifier};
use crate::error::Result;
use ndarray::{Array, Array1, Array2, ArrayView1, ArrayView2, Axis, Dimension, Zip};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const ADAM_EPSILON: f64 = 1e-8;
const PROBA_CLIP: f64 = 1e-15;

#[derive(Debug, Clone)]
struct Adam<D: Dimension> {
    m: Array<f64, D>,
    v: Array<f64, D>,
}

impl<D: Dimension> Adam<D> {
    fn new(shape: D) -> Self {
        Adam {
            m: Array::zeros(shape.clone()),
            v: Array::zeros(shape),
        }
    }

    fn step(&mut self, param: &mut Array<f64, D>, grad: &Array<f64, D>, lr: f64) {
        Zip::from(param)
            .and(&mut self.m)
            .and(&mut self.v)
            .and(grad)
            .for_each(|p, m, v, &g| {
                *m = BETA1 * *m + (1.0 - BETA1) * g;
                *v = BETA2 * *v + (1.0 - BETA2) * g * g;
                *p -= lr * *m / (v.sqrt() + ADAM_EPSILON);
            });
    }
}

#[derive(Debug, Clone)]
struct Network {
    w1: Array2<f64>,
    b1: Array1<f64>,
    w2: Array1<f64>,
    b2: Array1<f64>,
}

impl Network {
    /// Hidden pre-activations and output probabilities
    fn forward(&self, x: &ArrayView2<f64>) -> (Array2<f64>, Array1<f64>) {
        let z1 = x.dot(&self.w1) + &self.b1;
        let a1 = z1.mapv(|v| v.max(0.0));
        let p = (a1.dot(&self.w2) + self.b2[0]).mapv(sigmoid);
        (z1, p)
    }
}

/// One-hidden-layer perceptron (ReLU) with a logistic output, trained by
/// mini-batch Adam on L2-penalised log loss.
///
/// Training stops after `max_iter` epochs or once the epoch loss has failed to
/// improve by `tol` for more than `n_iter_no_change` consecutive epochs.
#[derive(Debug, Clone)]
pub struct MlpClassifier {
    hidden: usize,
    alpha: f64,
    learning_rate: f64,
    max_iter: usize,
    tol: f64,
    n_iter_no_change: usize,
    seed: u64,
    network: Option<Network>,
    loss_curve: Vec<f64>,
}

impl MlpClassifier {
    pub fn new(seed: u64) -> Self {
        MlpClassifier {
            hidden: 100,
            alpha: 1e-4,
            learning_rate: 1e-3,
            max_iter: 200,
            tol: 1e-4,
            n_iter_no_change: 10,
            seed,
            network: None,
            loss_curve: Vec::new(),
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Training loss of every completed epoch
    pub fn loss_curve(&self) -> &[f64] {
        &self.loss_curve
    }

    pub fn predict_proba(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        let net = self.network.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        check_predict_input(self.name(), &x, net.w1.nrows())?;
        Ok(net.forward(&x).1)
    }

    fn init_network(&self, n_features: usize, rng: &mut StdRng) -> Network {
        let bound1 = (6.0 / (n_features + self.hidden) as f64).sqrt();
        let bound2 = (6.0 / (self.hidden + 1) as f64).sqrt();
        let mut uniform = |bound: f64| rng.gen_range(-bound..bound);
        Network {
            w1: Array2::from_shape_simple_fn((n_features, self.hidden), || uniform(bound1)),
            b1: Array1::from_shape_simple_fn(self.hidden, || uniform(bound1)),
            w2: Array1::from_shape_simple_fn(self.hidden, || uniform(bound2)),
            b2: Array1::from_shape_simple_fn(1, || uniform(bound2)),
        }
    }
}

impl Classifier for MlpClassifier {
    fn name(&self) -> &'static str {
        "MLPClassifier"
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        check_fit_input(self.name(), &x, &y)?;
        let n = x.nrows();
        let batch_size = n.min(200);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut net = self.init_network(x.ncols(), &mut rng);

        let mut adam_w1 = Adam::new(net.w1.raw_dim());
        let mut adam_b1 = Adam::new(net.b1.raw_dim());
        let mut adam_w2 = Adam::new(net.w2.raw_dim());
        let mut adam_b2 = Adam::new(net.b2.raw_dim());

        let mut order: Vec<usize> = (0..n).collect();
        let mut best_loss = f64::INFINITY;
        let mut no_improvement = 0;
        let mut t = 0i32;
        self.loss_curve.clear();

        for _ in 0..self.max_iter {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;

            for batch in order.chunks(batch_size) {
                t += 1;
                let xb = x.select(Axis(0), batch);
                let yb = y.select(Axis(0), batch);
                let m = batch.len() as f64;

                let (z1, p) = net.forward(&xb.view());
                let a1 = z1.mapv(|v| v.max(0.0));
                let p = p.mapv(|v| v.clamp(PROBA_CLIP, 1.0 - PROBA_CLIP));

                let data_loss: f64 = p
                    .iter()
                    .zip(yb.iter())
                    .map(|(&pi, &yi)| -(yi * pi.ln() + (1.0 - yi) * (1.0 - pi).ln()))
                    .sum::<f64>()
                    / m;
                let penalty = 0.5 * self.alpha * (net.w1.iter().map(|w| w * w).sum::<f64>()
                    + net.w2.dot(&net.w2))
                    / m;
                epoch_loss += (data_loss + penalty) * m;

                let delta2 = (&p - &yb) / m;
                let grad_w2 = a1.t().dot(&delta2) + &(&net.w2 * (self.alpha / m));
                let grad_b2 = Array1::from_elem(1, delta2.sum());

                let relu_mask = z1.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
                let delta1 = delta2
                    .view()
                    .insert_axis(Axis(1))
                    .dot(&net.w2.view().insert_axis(Axis(0)))
                    * &relu_mask;
                let grad_w1 = xb.t().dot(&delta1) + &(&net.w1 * (self.alpha / m));
                let grad_b1 = delta1.sum_axis(Axis(0));

                let lr = self.learning_rate * (1.0 - BETA2.powi(t)).sqrt() / (1.0 - BETA1.powi(t));
                adam_w1.step(&mut net.w1, &grad_w1, lr);
                adam_b1.step(&mut net.b1, &grad_b1, lr);
                adam_w2.step(&mut net.w2, &grad_w2, lr);
                adam_b2.step(&mut net.b2, &grad_b2, lr);
            }

            let loss = epoch_loss / n as f64;
            self.loss_curve.push(loss);
            if loss > best_loss - self.tol {
                no_improvement += 1;
            } else {
                no_improvement = 0;
            }
            if loss < best_loss {
                best_loss = loss;
            }
            if no_improvement > self.n_iter_no_change {
                break;
            }
        }

        self.network = Some(net);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .predict_proba(x)?
            .mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }
}
