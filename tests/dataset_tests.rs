use ndarray::{Array2, Axis};
use tfbs_sampler::dataset::Dataset;
use tfbs_sampler::error::SamplerError;

fn dataset(n_pos: usize, n_neg: usize) -> Dataset {
    // the first feature doubles as a row id
    let positive = Array2::from_shape_fn((n_pos, 2), |(i, j)| if j == 0 { i as f64 } else { 1.0 });
    let negative = Array2::from_shape_fn((n_neg, 2), |(i, j)| if j == 0 { (n_pos + i) as f64 } else { -1.0 });
    Dataset::from_classes(positive, negative).unwrap()
}

#[test]
fn test_from_classes() {
    let data = dataset(3, 2);
    assert_eq!(data.n_samples(), 5);
    assert_eq!(data.n_features(), 2);
    assert_eq!(data.targets.to_vec(), vec![1.0, 1.0, 1.0, 0.0, 0.0]);

    let result = Dataset::from_classes(Array2::zeros((2, 3)), Array2::zeros((2, 4)));
    assert!(matches!(result, Err(SamplerError::DataError(_))));
}

#[test]
fn test_split() {
    let data = dataset(10, 10);
    let split = data.split(0.8, 42).unwrap();
    assert_eq!(split.x_train.nrows(), 16);
    assert_eq!(split.x_test.nrows(), 4);
    assert_eq!(split.y_train.len(), 16);
    assert_eq!(split.y_test.len(), 4);

    // every row lands on exactly one side, with its own target
    let mut ids: Vec<usize> = split
        .x_train
        .column(0)
        .iter()
        .chain(split.x_test.column(0).iter())
        .map(|&v| v as usize)
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..20).collect::<Vec<_>>());
    for (row, &target) in split.x_train.axis_iter(Axis(0)).zip(split.y_train.iter()) {
        assert_eq!(row[1] > 0.0, target == 1.0);
    }

    assert_eq!(split, data.split(0.8, 42).unwrap());
    assert_ne!(split.x_test, data.split(0.8, 43).unwrap().x_test);
}

#[test]
fn test_split_rounds_test_side_up() {
    let data = dataset(4, 3);
    let split = data.split(0.8, 1).unwrap();
    // ceil(7 * 0.2) = 2
    assert_eq!(split.x_test.nrows(), 2);
    assert_eq!(split.x_train.nrows(), 5);
}

#[test]
fn test_split_rejects_degenerate_fractions() {
    let data = dataset(2, 2);
    assert!(matches!(data.split(1.0, 0), Err(SamplerError::InvalidParameter { .. })));
    assert!(matches!(data.split(0.0, 0), Err(SamplerError::InvalidParameter { .. })));

    let tiny = dataset(1, 0);
    assert!(matches!(tiny.split(0.5, 0), Err(SamplerError::InvalidParameter { .. })));
}
