//! Fits the classifier roster on one split and reports held-out scores.

use crate::config::EvaluateConfig;
use crate::dataset::{Dataset, Split};
use crate::error::Result;
use crate::models::{
    BernoulliNb, Classifier, ConfusionMatrix, DecisionTreeClassifier, GaussianNb,
    GradientBoostingClassifier, LogisticRegression, MlpClassifier, RandomForestClassifier, Scores,
};
use crate::shape::build_features;
use log::{debug, info};
use polars::prelude::*;
use rayon::prelude::*;
use std::fs::File;
use std::path::Path;

/// Held-out result of one model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReport {
    pub model: String,
    pub scores: Scores,
    pub confusion: ConfusionMatrix,
}

/// Outcome of [`run_evaluation`]
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub seed: u64,
    pub n_train: usize,
    pub n_test: usize,
    pub reports: Vec<ModelReport>,
}

/// The seven compared models. The decision tree keeps seed 0; every other
/// randomised model derives its seed from `seed`.
pub fn default_roster(seed: u64) -> Vec<Box<dyn Classifier>> {
    vec![
        Box::new(LogisticRegression::default()),
        Box::new(DecisionTreeClassifier::new(0)),
        Box::new(RandomForestClassifier::new(seed.wrapping_add(1))),
        Box::new(GradientBoostingClassifier::new(seed.wrapping_add(2))),
        Box::new(BernoulliNb::default()),
        Box::new(GaussianNb::default()),
        Box::new(MlpClassifier::new(seed.wrapping_add(3))),
    ]
}

/// Fits every model on the training side and scores it on the test side.
/// Models run in parallel; reports keep roster order.
pub fn evaluate_models(models: Vec<Box<dyn Classifier>>, split: &Split) -> Result<Vec<ModelReport>> {
    models
        .into_par_iter()
        .map(|mut model| -> Result<ModelReport> {
            model.fit(split.x_train.view(), split.y_train.view())?;
            let predicted = model.predict(split.x_test.view())?;
            let confusion = ConfusionMatrix::from_predictions(split.y_test.view(), predicted.view())?;
            Ok(ModelReport {
                model: model.name().to_string(),
                scores: confusion.scores(),
                confusion,
            })
        })
        .collect()
}

/// One row per model: model, accuracy, f1, precision, recall
pub fn reports_to_frame(reports: &[ModelReport]) -> Result<DataFrame> {
    let metric = |get: fn(&Scores) -> f64| -> Vec<f64> { reports.iter().map(|r| get(&r.scores)).collect() };
    let df = DataFrame::new(vec![
        Column::new(
            "model".into(),
            reports.iter().map(|r| r.model.clone()).collect::<Vec<_>>(),
        ),
        Column::new("accuracy".into(), metric(|s| s.accuracy)),
        Column::new("f1".into(), metric(|s| s.f1)),
        Column::new("precision".into(), metric(|s| s.precision)),
        Column::new("recall".into(), metric(|s| s.recall)),
    ])?;
    Ok(df)
}

/// Writes a report frame as CSV
pub fn write_report(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path.as_ref())?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Loads both classes' shape features, splits them, and evaluates the roster.
///
/// # Errors
/// * Returns `SamplerError::InvalidParameter` for an invalid config or split
/// * Propagates shape loading, model and report writing errors
pub fn run_evaluation(config: &EvaluateConfig) -> Result<Evaluation> {
    config.validate()?;

    let positive = build_features(&config.positive, config.aggregation)?;
    let negative = build_features(&config.negative, config.aggregation)?;
    debug!("Pos samples: {:?}", positive.dim());
    debug!("Neg samples: {:?}", negative.dim());

    let dataset = Dataset::from_classes(positive, negative)?;
    info!(
        "{} samples with {} {} features",
        dataset.n_samples(),
        dataset.n_features(),
        config.aggregation
    );

    let seed = config.seed.unwrap_or_else(rand::random);
    info!("Split seed: {}", seed);
    let split = dataset.split(config.train_fraction, seed)?;
    debug!("X_train: {:?}, X_test: {:?}", split.x_train.dim(), split.x_test.dim());

    let reports = evaluate_models(default_roster(seed), &split)?;
    for report in &reports {
        info!(
            "{}: accuracy {:.3}%, F1 {:.3}%, precision {:.3}%, recall {:.3}%",
            report.model,
            report.scores.accuracy * 100.0,
            report.scores.f1 * 100.0,
            report.scores.precision * 100.0,
            report.scores.recall * 100.0
        );
        debug!("{} confusion: {:?}", report.model, report.confusion);
    }

    if let Some(path) = &config.report {
        write_report(&mut reports_to_frame(&reports)?, path)?;
        info!("Wrote report to {}", path.display());
    }

    Ok(Evaluation {
        seed,
        n_train: split.y_train.len(),
        n_test: split.y_test.len(),
        reports,
    })
}
