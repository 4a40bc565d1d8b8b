use std::fs;
use std::path::{Path, PathBuf};
use tfbs_sampler::config::EvaluateConfig;
use tfbs_sampler::harness::{default_roster, run_evaluation};
use tfbs_sampler::shape::{Aggregation, ShapeFiles, ShapeProperty};

/// Writes all four property tables for `n` samples centred on `level`
fn write_class(dir: &Path, name: &str, n: usize, level: f64) -> ShapeFiles {
    let files = ShapeFiles::from_prefix(dir.join(name).to_string_lossy());
    for property in ShapeProperty::ALL {
        let mut text = String::new();
        for i in 0..n {
            let v = level + (i % 5) as f64 * 0.1;
            text.push_str(&format!(">{}\nNA,NA,{:.2},{:.2},{:.2},NA,NA\n", i + 1, v, v + 0.05, v - 0.05));
        }
        fs::write(files.get(property), text).unwrap();
    }
    files
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tfbs_sampler_{}", name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_default_roster() {
    let names: Vec<&str> = default_roster(5).iter().map(|m| m.name()).collect();
    assert_eq!(
        names,
        vec![
            "LogisticRegression",
            "DecisionTreeClassifier",
            "RandomForestClassifier",
            "GradientBoostingClassifier",
            "BernoulliNB",
            "GaussianNB",
            "MLPClassifier",
        ]
    );
}

#[test]
fn test_run_evaluation() {
    let dir = scratch("harness");
    let positive = write_class(&dir, "pos", 20, 6.0);
    let negative = write_class(&dir, "neg", 20, 4.0);

    let mut config = EvaluateConfig::new(positive, negative);
    config.seed = Some(7);
    config.report = Some(dir.join("reports").join("scores.csv"));

    let evaluation = run_evaluation(&config).unwrap();
    assert_eq!(evaluation.seed, 7);
    assert_eq!(evaluation.n_train, 32);
    assert_eq!(evaluation.n_test, 8);
    assert_eq!(evaluation.reports.len(), 7);

    for report in &evaluation.reports {
        assert_eq!(report.confusion.total(), 8);
        for score in [report.scores.accuracy, report.scores.f1, report.scores.precision, report.scores.recall] {
            assert!((0.0..=1.0).contains(&score));
        }
    }
    for name in ["DecisionTreeClassifier", "RandomForestClassifier", "GaussianNB"] {
        let report = evaluation.reports.iter().find(|r| r.model == name).unwrap();
        assert_eq!(report.scores.accuracy, 1.0, "{}", name);
    }

    let csv = fs::read_to_string(dir.join("reports").join("scores.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("model,accuracy,f1,precision,recall"));
    assert_eq!(lines.count(), 7);

    // same seed, same split and scores
    config.report = None;
    let again = run_evaluation(&config).unwrap();
    assert_eq!(again.reports, evaluation.reports);

    // clean up
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_run_evaluation_scaled_features() {
    let dir = scratch("harness_scaled");
    let mut config = EvaluateConfig::new(
        write_class(&dir, "pos", 10, 6.0),
        write_class(&dir, "neg", 10, 4.0),
    );
    config.aggregation = Aggregation::Scaled;
    config.seed = Some(3);

    let evaluation = run_evaluation(&config).unwrap();
    assert_eq!(evaluation.n_test, 4);
    assert_eq!(evaluation.reports.len(), 7);

    config.train_fraction = 1.5;
    assert!(run_evaluation(&config).is_err());

    // clean up
    fs::remove_dir_all(&dir).unwrap();
}
