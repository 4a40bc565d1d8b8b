use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tfbs_sampler::error::SamplerError;
use tfbs_sampler::labeler::{binding_site_starts, partition_candidates, NegativePolicy, SampleLabeler};
use tfbs_sampler::types::{BindingSiteLocation, Candidate, SampleClass, Strand};
use tfbs_sampler::writer::TextWriter;

fn candidates(positions: &[usize]) -> Vec<Candidate> {
    positions
        .iter()
        .map(|&position| Candidate {
            position,
            score: 5.0,
            strand: Strand::Forward,
        })
        .collect()
}

fn known(starts: &[usize]) -> HashSet<usize> {
    starts.iter().copied().collect()
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tfbs_sampler_{}", name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_binding_site_starts() {
    let sites = [
        BindingSiteLocation { start: 5, end: 9 },
        BindingSiteLocation { start: 1, end: 4 },
        BindingSiteLocation { start: 5, end: 9 },
    ];
    assert_eq!(binding_site_starts(&sites), known(&[1, 5]));
}

#[test]
fn test_partition_first_n() {
    let cands = candidates(&[2, 4, 6, 8, 10, 12]);

    let (pos, neg) = partition_candidates(&cands, &known(&[4, 10]), NegativePolicy::FirstN);
    assert_eq!(pos, vec![4, 10]);
    assert_eq!(neg, vec![2, 6]);

    // fewer unmatched candidates than positives
    let (pos, neg) = partition_candidates(&cands, &known(&[2, 4, 6, 8, 10]), NegativePolicy::FirstN);
    assert_eq!(pos.len(), 5);
    assert_eq!(neg, vec![12]);

    // no positives, no negatives
    let (pos, neg) = partition_candidates(&cands, &known(&[3]), NegativePolicy::FirstN);
    assert!(pos.is_empty());
    assert!(neg.is_empty());
}

#[test]
fn test_partition_random() {
    let cands = candidates(&(0..50).collect::<Vec<_>>());
    let known = known(&[7, 21, 33]);
    let policy = NegativePolicy::Random { seed: 11 };

    let (pos, neg) = partition_candidates(&cands, &known, policy);
    assert_eq!(pos, vec![7, 21, 33]);
    assert_eq!(neg.len(), 3);
    assert!(neg.iter().all(|p| !known.contains(p)));
    assert!(neg.windows(2).all(|w| w[0] < w[1]));

    let (_, again) = partition_candidates(&cands, &known, policy);
    assert_eq!(neg, again);
}

#[test]
fn test_label_writes_samples() {
    let dir = scratch("labeler");
    let positive = TextWriter::new(dir.join("pos.txt")).unwrap();
    let negative = TextWriter::new(dir.join("neg.txt")).unwrap();
    let mut labeler = SampleLabeler::new(&positive, &negative, NegativePolicy::FirstN);

    let summary = labeler
        .label("acgtACGTacgt", 4, &candidates(&[0, 4]), &known(&[0]))
        .unwrap();
    assert_eq!(summary.positives.len(), 1);
    assert_eq!(summary.negatives.len(), 1);
    assert_eq!(summary.positives[0].class, SampleClass::Positive);
    assert_eq!(summary.negatives[0].position, 4);

    assert_eq!(fs::read_to_string(dir.join("pos.txt")).unwrap(), ">1\nACGT\n");
    assert_eq!(fs::read_to_string(dir.join("neg.txt")).unwrap(), ">1\nACGT\n");

    // labels continue on the next chromosome
    let summary = labeler
        .label("TTTTGGGGCCCC", 4, &candidates(&[0, 4, 8]), &known(&[4, 8]))
        .unwrap();
    assert_eq!(summary.positives.iter().map(|s| s.label).collect::<Vec<_>>(), vec![2, 3]);
    assert_eq!(summary.negatives[0].label, 2);
    assert_eq!(summary.negatives[0].sequence, "TTTT");
    assert_eq!(labeler.counters().next_positive, 4);
    assert_eq!(labeler.counters().next_negative, 3);

    assert_eq!(
        fs::read_to_string(dir.join("pos.txt")).unwrap(),
        ">1\nACGT\n>2\nGGGG\n>3\nCCCC\n"
    );

    // clean up
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_label_rejects_out_of_range_window() {
    let dir = scratch("labeler_range");
    let positive = TextWriter::new(dir.join("pos.txt")).unwrap();
    let negative = TextWriter::new(dir.join("neg.txt")).unwrap();
    let mut labeler = SampleLabeler::new(&positive, &negative, NegativePolicy::FirstN);

    let result = labeler.label("ACGTAC", 4, &candidates(&[4]), &known(&[4]));
    assert!(matches!(result, Err(SamplerError::DataError(_))));

    // clean up
    fs::remove_dir_all(&dir).unwrap();
}
