use crate::error::{Result, SamplerError};
use ndarray::{concatenate, Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Feature matrix with positive rows first, then negative rows, and the matching 1/0 targets
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: Array2<f64>,
    pub targets: Array1<f64>,
}

/// Train/test partition of a [`Dataset`]
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

impl Dataset {
    /// Stacks positive above negative samples.
    ///
    /// # Errors
    /// * Returns `SamplerError::DataError` if the two classes have different feature widths
    pub fn from_classes(positive: Array2<f64>, negative: Array2<f64>) -> Result<Self> {
        if positive.ncols() != negative.ncols() {
            return Err(SamplerError::DataError(format!(
                "positive samples have {} features but negative samples have {}",
                positive.ncols(),
                negative.ncols()
            )));
        }
        let targets = Array1::from_iter(
            std::iter::repeat(1.0)
                .take(positive.nrows())
                .chain(std::iter::repeat(0.0).take(negative.nrows())),
        );
        let features = concatenate(Axis(0), &[positive.view(), negative.view()])
            .map_err(|e| SamplerError::DataError(e.to_string()))?;
        Ok(Dataset { features, targets })
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Shuffles the samples with `seed` and holds out `ceil(n * (1 - train_fraction))` for testing.
    ///
    /// # Errors
    /// * Returns `SamplerError::InvalidParameter` if `train_fraction` is outside (0, 1)
    ///   or either side of the split would be empty
    pub fn split(&self, train_fraction: f64, seed: u64) -> Result<Split> {
        if !(train_fraction > 0.0 && train_fraction < 1.0) {
            return Err(SamplerError::invalid_parameter(
                "train_fraction",
                train_fraction,
                "must lie strictly between 0 and 1",
            ));
        }
        let n = self.n_samples();
        let n_test = ((n as f64) * (1.0 - train_fraction) - 1e-9).ceil().max(0.0) as usize;
        if n_test == 0 || n_test >= n {
            return Err(SamplerError::invalid_parameter(
                "train_fraction",
                train_fraction,
                format!("leaves an empty side when splitting {} samples", n),
            ));
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));
        let (test, train) = order.split_at(n_test);

        Ok(Split {
            x_train: self.features.select(Axis(0), train),
            x_test: self.features.select(Axis(0), test),
            y_train: self.targets.select(Axis(0), train),
            y_test: self.targets.select(Axis(0), test),
        })
    }
}
